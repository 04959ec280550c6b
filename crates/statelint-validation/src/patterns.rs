//! Semantic rules spanning several nodes
//!
//! The orthogonal-region check compares every pair of sibling regions, so its
//! cost is quadratic in the number of regions of one composite state. That
//! count is small in real models.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::{ErrorKind, ValidationErrors};
use crate::graph::IdentityGraph;
use log::{debug, warn};
use statelint_model::{Pseudostate, PseudostateKind, State, StateMachine};
use std::collections::{BTreeSet, HashSet};
use std::mem;

/// Validator for cross-node pattern rules
///
/// Each public method runs one rule family from a fresh collector and returns
/// every violation it found.
#[derive(Debug, Default)]
pub struct ComplexPatternValidator<'a> {
    context: ValidationContext<'a>,
    errors: ValidationErrors,
}

impl<'a> ComplexPatternValidator<'a> {
    /// Create a validator reporting paths below `ctx`
    pub fn new(ctx: &ValidationContext<'a>) -> Self {
        Self {
            context: ctx.clone(),
            errors: ValidationErrors::new(),
        }
    }

    /// Sibling regions of `state` must not share vertex names
    pub fn validate_orthogonal_regions(&mut self, state: &'a State) -> Result<(), ValidationErrors> {
        orthogonal_regions_into(state, &self.context, &mut self.errors, true);
        self.finish()
    }

    /// Every connection point must be an entry/exit point used in the right role
    pub fn validate_connection_point_references(
        &mut self,
        machine: Option<&'a StateMachine>,
    ) -> Result<(), ValidationErrors> {
        match machine {
            Some(machine) => {
                let ctx = self.context.with_state_machine(machine);
                connection_points_into(machine, &ctx, &mut self.errors, true);
            }
            None => self.machine_missing(),
        }
        self.finish()
    }

    /// Inheritance must be acyclic, redefinitions unique and extensions compatible
    pub fn validate_state_machine_inheritance(
        &mut self,
        machine: Option<&'a StateMachine>,
    ) -> Result<(), ValidationErrors> {
        match machine {
            Some(machine) => {
                let ctx = self.context.with_state_machine(machine);
                inheritance_cycles_into(machine, &ctx, &mut self.errors);
                redefinitions_into(machine, &ctx, &mut self.errors);
                extension_into(machine, &ctx, &mut self.errors);
            }
            None => self.machine_missing(),
        }
        self.finish()
    }

    fn machine_missing(&mut self) {
        self.errors.add_in_context(
            ErrorKind::Required,
            "StateMachine",
            "",
            "state machine cannot be nil",
            &self.context,
        );
    }

    fn finish(&mut self) -> Result<(), ValidationErrors> {
        mem::take(&mut self.errors).into_result()
    }
}

/// Report vertex names shared between sibling regions of `state`
///
/// `report_nil` is off when the caller already reports `null` regions.
pub(crate) fn orthogonal_regions_into(
    state: &State,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
    report_nil: bool,
) {
    if state.regions.len() <= 1 {
        return;
    }

    let names: Vec<Option<BTreeSet<&str>>> = state
        .regions
        .iter()
        .map(|region| region.as_ref().map(|r| r.vertex_names().into_iter().collect()))
        .collect();

    let mut reported = HashSet::new();
    for (index, current) in names.iter().enumerate() {
        let Some(current) = current else {
            if report_nil {
                let child = ctx.with_indexed_path("Regions", index);
                errors.add_in_context(
                    ErrorKind::Constraint,
                    "State",
                    "",
                    "orthogonal region cannot be nil",
                    &child,
                );
            }
            continue;
        };
        for other in names.iter().skip(index + 1).flatten() {
            for &name in current.intersection(other) {
                if reported.insert(name) {
                    errors.add_in_context(
                        ErrorKind::Constraint,
                        "State",
                        "Regions",
                        format!("vertex '{}' appears in multiple orthogonal regions", name),
                        ctx,
                    );
                }
            }
        }
    }
}

/// Check the declared connection points of `machine` against its transitions
///
/// With `report_structure` off, `null` points and wrongly-kinded points are
/// skipped silently because the entity rules already report them.
pub(crate) fn connection_points_into(
    machine: &StateMachine,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
    report_structure: bool,
) {
    let transitions = machine.all_transitions();
    debug!(
        "checking {} connection point(s) against {} transition(s)",
        machine.connection_points.len(),
        transitions.len()
    );

    for (index, point) in machine.connection_points.iter().enumerate() {
        let child = ctx.with_indexed_path("ConnectionPoints", index);
        let Some(point) = point else {
            if report_structure {
                errors.add_in_context(
                    ErrorKind::Reference,
                    "StateMachine",
                    "",
                    "connection point cannot be nil",
                    &child,
                );
            }
            continue;
        };
        if !point.kind.is_connection_point() {
            if report_structure {
                connection_point_kind_violation(point, &child, errors);
            }
            continue;
        }

        let id = point.id.as_str();
        let as_source = !id.is_empty() && transitions.iter().any(|t| t.source_id() == Some(id));
        let as_target = !id.is_empty() && transitions.iter().any(|t| t.target_id() == Some(id));
        let label = point_label(point);

        if !as_source && !as_target {
            errors.add_in_context(
                ErrorKind::Constraint,
                "Pseudostate",
                "",
                format!("connection point '{}' is not referenced by any transitions", label),
                &child,
            );
            continue;
        }
        match point.kind {
            PseudostateKind::EntryPoint if as_source => errors.add_in_context(
                ErrorKind::Constraint,
                "Pseudostate",
                "",
                format!("entry point '{}' can only be transition target", label),
                &child,
            ),
            PseudostateKind::ExitPoint if as_target => errors.add_in_context(
                ErrorKind::Constraint,
                "Pseudostate",
                "",
                format!("exit point '{}' can only be transition source", label),
                &child,
            ),
            _ => {}
        }
    }
}

/// Constraint error for a connection point that is neither entry nor exit point
pub(crate) fn connection_point_kind_violation(
    point: &Pseudostate,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    errors.add_in_context(
        ErrorKind::Constraint,
        "Pseudostate",
        "Kind",
        format!(
            "connection point '{}' must be entry or exit point, found {}",
            point_label(point),
            point.kind
        ),
        ctx,
    );
}

/// Detect a cycle along the `extends` chain of `machine`
pub(crate) fn inheritance_cycles_into(
    machine: &StateMachine,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    let mut graph = IdentityGraph::new();
    let mut current = machine;
    let mut steps = 0;

    while let Some(parent) = current.extends.as_deref() {
        if ctx.max_depth() > 0 && steps >= ctx.max_depth() {
            if ctx.claim_depth_report() {
                warn!(
                    "inheritance chain of '{}' longer than {}",
                    machine_label(machine),
                    ctx.max_depth()
                );
                errors.add_in_context(
                    ErrorKind::Constraint,
                    "StateMachine",
                    "Extends",
                    format!("maximum nesting depth of {} exceeded", ctx.max_depth()),
                    ctx,
                );
            }
            break;
        }
        // Machines without an identity take no part in the graph
        if !current.id.is_empty() && !parent.id.is_empty() {
            let seen = graph.contains(&parent.id);
            graph.add_edge(&current.id, &parent.id);
            if seen {
                break;
            }
        }
        current = parent;
        steps += 1;
    }

    if let Some(cycle) = graph.find_cycle() {
        errors.add_in_context(
            ErrorKind::Constraint,
            "StateMachine",
            "Extends",
            format!("inheritance cycle detected at '{}': {}", cycle.closing, cycle),
            ctx,
        );
    }
}

/// Region names and vertex names must be unique across the regions of `machine`
pub(crate) fn redefinitions_into(
    machine: &StateMachine,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    let mut regions = HashSet::new();
    let mut reported_regions = HashSet::new();
    let mut vertices = HashSet::new();
    let mut reported_vertices = HashSet::new();

    for (index, region) in machine.regions.iter().enumerate() {
        let Some(region) = region else {
            continue;
        };
        let child = ctx.with_indexed_path("Regions", index);

        let name = region.name.as_str();
        if !name.is_empty() && !regions.insert(name) && reported_regions.insert(name) {
            errors.add_in_context(
                ErrorKind::Constraint,
                "Region",
                "Name",
                format!("duplicate region name '{}' in redefinition", name),
                &child,
            );
        }

        for vertex in region.vertex_names() {
            if !vertices.insert(vertex) && reported_vertices.insert(vertex) {
                errors.add_in_context(
                    ErrorKind::Constraint,
                    "Region",
                    "Vertices",
                    format!("duplicate vertex name '{}' in redefinition", vertex),
                    &child,
                );
            }
        }
    }
}

/// An extending machine keeps at least one region and valid connection point kinds
pub(crate) fn extension_into(
    machine: &StateMachine,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    if machine.present_regions().next().is_none() {
        errors.add_in_context(
            ErrorKind::Constraint,
            "StateMachine",
            "Regions",
            "extended state machine must have at least one region",
            ctx,
        );
    }
    for (index, point) in machine.connection_points.iter().enumerate() {
        if let Some(point) = point.as_ref().filter(|p| !p.kind.is_connection_point()) {
            connection_point_kind_violation(
                point,
                &ctx.with_indexed_path("ConnectionPoints", index),
                errors,
            );
        }
    }
}

fn point_label(point: &Pseudostate) -> &str {
    if point.name.is_empty() {
        &point.id
    } else {
        &point.name
    }
}

fn machine_label(machine: &StateMachine) -> &str {
    if machine.id.is_empty() {
        &machine.name
    } else {
        &machine.id
    }
}

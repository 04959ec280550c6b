//! Rules for state machines and regions
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::{ErrorKind, ValidationErrors};
use crate::helpers::{validate_collection, validate_collection_size, validate_required};
use crate::patterns::{
    connection_point_kind_violation, connection_points_into, inheritance_cycles_into,
    redefinitions_into,
};
use crate::validate::Validate;
use log::trace;
use statelint_model::{PseudostateKind, Region, StateMachine, Vertex};
use std::collections::HashMap;

impl Validate for StateMachine {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        let ctx = ctx.with_state_machine(self);
        trace!("validating state machine at {}", ctx.full_path());

        validate_required(&self.id, "ID", "StateMachine", &ctx, errors);
        validate_required(&self.name, "Name", "StateMachine", &ctx, errors);
        validate_collection_size(&self.regions, "Regions", "StateMachine", 1, 0, &ctx, errors);
        validate_collection(&self.regions, "Regions", "StateMachine", &ctx, errors);
        validate_collection(&self.connection_points, "ConnectionPoints", "StateMachine", &ctx, errors);

        for (index, point) in self.connection_points.iter().enumerate() {
            if let Some(point) = point.as_ref().filter(|p| !p.kind.is_connection_point()) {
                let point_ctx = ctx.with_indexed_path("ConnectionPoints", index);
                connection_point_kind_violation(point, &point_ctx, errors);
            }
        }

        if !ctx.mode().checks_patterns() {
            return;
        }
        if !self.connection_points.is_empty() {
            connection_points_into(self, &ctx, errors, false);
        }
        if self.extends.is_some() {
            inheritance_cycles_into(self, &ctx, errors);
            redefinitions_into(self, &ctx, errors);
        }
    }
}

impl Validate for Region {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        let ctx = ctx.with_region(self);

        validate_required(&self.id, "ID", "Region", &ctx, errors);
        validate_collection(&self.states, "States", "Region", &ctx, errors);
        validate_collection(&self.vertices, "Vertices", "Region", &ctx, errors);
        validate_collection(&self.transitions, "Transitions", "Region", &ctx, errors);

        check_pseudostate_multiplicity(self, &ctx, errors);
        check_transition_endpoints(self, &ctx, errors);
    }
}

/// At most one initial, deep-history and shallow-history pseudostate per region
fn check_pseudostate_multiplicity(
    region: &Region,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    const LIMITED: [(PseudostateKind, &str); 3] = [
        (PseudostateKind::Initial, "initial pseudostate"),
        (PseudostateKind::DeepHistory, "deep history pseudostate"),
        (PseudostateKind::ShallowHistory, "shallow history pseudostate"),
    ];

    for (kind, noun) in &LIMITED {
        let count = region
            .vertices
            .iter()
            .flatten()
            .filter(|v| v.pseudostate_kind() == Some(kind))
            .count();
        if count > 1 {
            errors.add_in_context(
                ErrorKind::Multiplicity,
                "Region",
                "Vertices",
                format!("region can have at most one {}, found {}", noun, count),
                ctx,
            );
        }
    }
}

/// Initial pseudostates are never targets and leave once; final states never leave
fn check_transition_endpoints(
    region: &Region,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    let mut initials: HashMap<&str, &str> = HashMap::new();
    let mut finals: HashMap<&str, &str> = HashMap::new();
    for vertex in region.vertices.iter().flatten() {
        if vertex.id().is_empty() {
            continue;
        }
        match vertex {
            Vertex::Pseudostate(p) if p.kind == PseudostateKind::Initial => {
                initials.insert(&p.id, label(&p.name, &p.id));
            }
            Vertex::FinalState(f) => {
                finals.insert(&f.id, label(&f.name, &f.id));
            }
            Vertex::Pseudostate(_) => {}
        }
    }
    if initials.is_empty() && finals.is_empty() {
        return;
    }

    let mut outgoing: Vec<(&str, usize)> = Vec::new();
    for (index, transition) in region.transitions.iter().enumerate() {
        let Some(transition) = transition else {
            continue;
        };
        let transition_ctx = ctx.with_indexed_path("Transitions", index);

        if let Some(name) = transition.target_id().and_then(|id| initials.get(id)) {
            errors.add_in_context(
                ErrorKind::Constraint,
                "Transition",
                "Target",
                format!("initial pseudostate '{}' cannot be a transition target", name),
                &transition_ctx,
            );
        }
        if let Some(source) = transition.source_id() {
            if let Some(name) = finals.get(source) {
                errors.add_in_context(
                    ErrorKind::Constraint,
                    "Transition",
                    "Source",
                    format!("final state '{}' cannot have outgoing transitions", name),
                    &transition_ctx,
                );
            }
            if initials.contains_key(source) {
                match outgoing.iter_mut().find(|(id, _)| *id == source) {
                    Some((_, count)) => *count += 1,
                    None => outgoing.push((source, 1)),
                }
            }
        }
    }

    for (id, count) in outgoing {
        if count > 1 {
            errors.add_in_context(
                ErrorKind::Multiplicity,
                "Pseudostate",
                "Transitions",
                format!(
                    "initial pseudostate '{}' can have at most one outgoing transition, found {}",
                    initials.get(id).copied().unwrap_or(id),
                    count
                ),
                ctx,
            );
        }
    }
}

fn label<'s>(name: &'s str, id: &'s str) -> &'s str {
    if name.is_empty() {
        id
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidationMode;
    use pretty_assertions::assert_eq;
    use statelint_model::{FinalState, Pseudostate, State, Transition};
    use std::sync::Arc;

    fn collect(machine: &StateMachine, mode: ValidationMode) -> ValidationErrors {
        let ctx = ValidationContext::new().with_mode(mode);
        machine.collect_errors(&ctx)
    }

    fn messages(errors: &ValidationErrors) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    fn simple() -> StateMachine {
        StateMachine::new("sm1", "Door").with_region(
            Region::new("r1", "Main")
                .with_vertex(Pseudostate::new("init", "Initial", PseudostateKind::Initial))
                .with_state(State::new("closed", "Closed"))
                .with_vertex(FinalState::new("done", "Done"))
                .with_transition(Transition::new("t1", "init", "closed"))
                .with_transition(Transition::new("t2", "closed", "done")),
        )
    }

    #[test]
    fn test_well_formed_machine() {
        assert!(simple().validate().is_ok());
    }

    #[test]
    fn test_missing_name_reported_once() {
        let mut machine = simple();
        machine.name.clear();
        let errors = collect(&machine, ValidationMode::Strict);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Required);
        assert_eq!(errors.errors[0].field, "Name");
        assert_eq!(errors.errors[0].path, "StateMachine[sm1].Name");
    }

    #[test]
    fn test_empty_regions() {
        let machine = StateMachine::new("sm1", "Empty");
        let errors = collect(&machine, ValidationMode::Basic);
        assert_eq!(messages(&errors), vec!["must have at least one region"]);
        assert_eq!(errors.errors[0].kind, ErrorKind::Multiplicity);
    }

    #[test]
    fn test_nil_region_entry() {
        let mut machine = simple();
        machine.regions.push(None);
        let errors = collect(&machine, ValidationMode::Strict);
        assert_eq!(messages(&errors), vec!["collection contains nil element"]);
        assert_eq!(errors.errors[0].path, "StateMachine[sm1].Regions[1]");
    }

    #[test]
    fn test_connection_point_kind_in_every_mode() {
        let machine = simple().with_connection_point(Pseudostate::new(
            "cp1",
            "Start",
            PseudostateKind::Initial,
        ));
        for mode in [ValidationMode::Basic, ValidationMode::Strict] {
            let errors = collect(&machine, mode);
            assert_eq!(
                messages(&errors),
                vec!["connection point 'Start' must be entry or exit point, found initial"]
            );
        }
    }

    #[test]
    fn test_unreferenced_connection_point_only_outside_basic_mode() {
        let machine = simple().with_connection_point(Pseudostate::new(
            "cp1",
            "In",
            PseudostateKind::EntryPoint,
        ));
        assert!(collect(&machine, ValidationMode::Basic).is_empty());
        assert_eq!(
            messages(&collect(&machine, ValidationMode::Partial)),
            vec!["connection point 'In' is not referenced by any transitions"]
        );
    }

    #[test]
    fn test_redefinition_checked_when_extending() {
        let base = Arc::new(simple());
        let machine = StateMachine::new("sm2", "Derived")
            .with_region(Region::new("r2", "Main").with_state(State::new("a", "A")))
            .with_region(Region::new("r3", "Main").with_state(State::new("b", "B")))
            .extending(base);
        assert_eq!(
            messages(&collect(&machine, ValidationMode::Partial)),
            vec!["duplicate region name 'Main' in redefinition"]
        );
        assert!(collect(&machine, ValidationMode::Basic).is_empty());
    }

    #[test]
    fn test_region_pseudostate_multiplicity_uses_kind() {
        let region = Region::new("r1", "Main")
            .with_vertex(Pseudostate::new("p1", "start", PseudostateKind::Initial))
            .with_vertex(Pseudostate::new("p2", "Init", PseudostateKind::Initial))
            .with_vertex(Pseudostate::new("p3", "initial", PseudostateKind::Choice))
            .with_vertex(Pseudostate::new("h1", "H", PseudostateKind::ShallowHistory));
        let errors = region.collect_errors(&ValidationContext::new());
        assert_eq!(
            messages(&errors),
            vec!["region can have at most one initial pseudostate, found 2"]
        );
        assert_eq!(errors.errors[0].path, "Region[r1].Vertices");
    }

    #[test]
    fn test_initial_and_final_transition_rules() {
        let region = Region::new("r1", "Main")
            .with_vertex(Pseudostate::new("init", "Start", PseudostateKind::Initial))
            .with_state(State::new("a", "A"))
            .with_state(State::new("b", "B"))
            .with_vertex(FinalState::new("end", "End"))
            .with_transition(Transition::new("t1", "init", "a"))
            .with_transition(Transition::new("t2", "init", "b"))
            .with_transition(Transition::new("t3", "a", "init"))
            .with_transition(Transition::new("t4", "end", "a"));
        let errors = region.collect_errors(&ValidationContext::new());
        assert_eq!(
            messages(&errors),
            vec![
                "initial pseudostate 'Start' cannot be a transition target",
                "final state 'End' cannot have outgoing transitions",
                "initial pseudostate 'Start' can have at most one outgoing transition, found 2",
            ]
        );
        assert_eq!(errors.errors[0].path, "Region[r1].Transitions[2].Target");
    }

    #[test]
    fn test_nested_errors_carry_full_path() {
        let mut machine = simple();
        if let Some(Some(region)) = machine.regions.first_mut() {
            region.states.push(Some(State::new("", "Unnamed")));
        }
        let errors = collect(&machine, ValidationMode::Strict);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].path, "StateMachine[sm1].Region[r1].Regions[0].States[1].ID");
    }
}

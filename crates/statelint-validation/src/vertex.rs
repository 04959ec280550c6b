//! Rules for states, pseudostates, final states and their parts
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::{ErrorKind, ValidationErrors};
use crate::helpers::{
    validate_collection, validate_conditional_required, validate_enum,
    validate_optional_reference, validate_required, validate_unique_ids,
};
use crate::patterns::orthogonal_regions_into;
use crate::validate::Validate;
use statelint_model::{
    Behavior, ConnectionPointReference, FinalState, Pseudostate, PseudostateKind, State,
    StateMachine, Vertex,
};

impl Validate for State {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        validate_required(&self.id, "ID", "State", ctx, errors);
        validate_required(&self.name, "Name", "State", ctx, errors);

        if self.is_composite() && self.is_submachine_state() {
            errors.add_in_context(
                ErrorKind::Constraint,
                "State",
                "",
                "state cannot be both composite and a submachine state",
                ctx,
            );
        }

        validate_collection(&self.regions, "Regions", "State", ctx, errors);
        validate_optional_reference(self.entry.as_ref(), "Entry", "State", ctx, errors, false);
        validate_optional_reference(self.exit.as_ref(), "Exit", "State", ctx, errors, false);
        validate_optional_reference(self.do_activity.as_ref(), "DoActivity", "State", ctx, errors, false);
        validate_collection(&self.connections, "Connections", "State", ctx, errors);
        validate_conditional_required(
            &self.submachine,
            "Submachine",
            "State",
            !self.connections.is_empty(),
            "connection point references are present",
            ctx,
            errors,
        );
        validate_optional_reference(self.submachine.as_deref(), "Submachine", "State", ctx, errors, false);

        if !ctx.mode().checks_patterns() {
            return;
        }
        orthogonal_regions_into(self, ctx, errors, false);
        if let Some(submachine) = self.submachine.as_deref() {
            check_connection_bindings(self, submachine, ctx, errors);
        }
    }
}

/// Entry/exit identities of each connection must name points of the submachine
fn check_connection_bindings(
    state: &State,
    submachine: &StateMachine,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    let declares = |id: &str, kind: PseudostateKind| {
        submachine
            .connection_points
            .iter()
            .flatten()
            .any(|p| p.id == id && p.kind == kind)
    };

    for (index, connection) in state.connections.iter().enumerate() {
        let Some(connection) = connection else {
            continue;
        };
        let connection_ctx = ctx.with_indexed_path("Connections", index);
        let bindings = [
            ("Entry", "entry", PseudostateKind::EntryPoint, &connection.entry),
            ("Exit", "exit", PseudostateKind::ExitPoint, &connection.exit),
        ];
        for (field, noun, kind, ids) in bindings {
            for id in ids.iter().filter(|id| !id.is_empty()) {
                if !declares(id.as_str(), kind.clone()) {
                    errors.add_in_context(
                        ErrorKind::Reference,
                        "ConnectionPointReference",
                        field,
                        format!(
                            "'{}' is not an {} point of submachine '{}'",
                            id,
                            noun,
                            if submachine.id.is_empty() { &submachine.name } else { &submachine.id }
                        ),
                        &connection_ctx,
                    );
                }
            }
        }
    }
}

impl Validate for Pseudostate {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        validate_required(&self.id, "ID", "Pseudostate", ctx, errors);
        validate_enum(self.kind.as_str(), "Kind", "Pseudostate", PseudostateKind::ALL, ctx, errors);
        validate_conditional_required(
            self.name.as_str(),
            "Name",
            "Pseudostate",
            self.kind.is_connection_point(),
            "kind is entryPoint or exitPoint",
            ctx,
            errors,
        );
    }
}

impl Validate for FinalState {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        validate_required(&self.id, "ID", "FinalState", ctx, errors);
    }
}

impl Validate for Vertex {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        match self {
            Vertex::Pseudostate(pseudostate) => pseudostate.validate_with_errors(ctx, errors),
            Vertex::FinalState(final_state) => final_state.validate_with_errors(ctx, errors),
        }
    }
}

impl Validate for Behavior {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        validate_required(&self.id, "ID", "Behavior", ctx, errors);
    }
}

impl Validate for ConnectionPointReference {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        const TYPE: &str = "ConnectionPointReference";

        validate_required(&self.id, "ID", TYPE, ctx, errors);
        if self.entry.is_empty() && self.exit.is_empty() {
            errors.add_in_context(
                ErrorKind::Multiplicity,
                TYPE,
                "",
                "must reference at least one entry or exit point",
                ctx,
            );
        }
        validate_unique_ids(&self.entry, "Entry", TYPE, ctx, errors, |id| Some(id.as_str()));
        validate_unique_ids(&self.exit, "Exit", TYPE, ctx, errors, |id| Some(id.as_str()));
    }
}

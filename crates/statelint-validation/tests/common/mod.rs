//! Shared fixtures for integration tests

#![allow(dead_code)]

use statelint_model::{
    Behavior, ConnectionPointReference, FinalState, Pseudostate, PseudostateKind, Region, State,
    StateMachine, Transition, TransitionKind,
};
use statelint_validation::ValidationErrors;
use std::sync::Arc;

/// A submachine exposing one entry and one exit point
pub fn submachine() -> Arc<StateMachine> {
    Arc::new(
        StateMachine::new("sub", "Sub")
            .with_region(
                Region::new("sub-r", "SubMain")
                    .with_state(State::new("sub-work", "Working"))
                    .with_transition(Transition::new("sub-t1", "sub-work", "sub-in"))
                    .with_transition(Transition::new("sub-t2", "sub-out", "sub-work")),
            )
            .with_connection_point(Pseudostate::new("sub-in", "SubIn", PseudostateKind::EntryPoint))
            .with_connection_point(Pseudostate::new("sub-out", "SubOut", PseudostateKind::ExitPoint)),
    )
}

/// A fully populated, referentially consistent machine
pub fn well_formed() -> StateMachine {
    let open = State::new("open", "Open")
        .with_region(Region::new("open-light", "Light").with_state(State::new("light-on", "LightOn")))
        .with_region(Region::new("open-sound", "Sound").with_state(State::new("chime", "Chime")));

    let nested = State::new("nested", "Nested")
        .with_submachine(submachine())
        .with_connection(
            ConnectionPointReference::new("cpr", "Bind")
                .with_entry("sub-in")
                .with_exit("sub-out"),
        );

    StateMachine::new("door", "Door")
        .with_region(
            Region::new("main", "Main")
                .with_vertex(Pseudostate::new("init", "Initial", PseudostateKind::Initial))
                .with_state(State::new("closed", "Closed").with_entry(Behavior::new("lock", "lock")))
                .with_state(open)
                .with_state(nested)
                .with_vertex(FinalState::new("done", "Done"))
                .with_transition(Transition::new("t1", "init", "closed"))
                .with_transition(
                    Transition::new("t2", "closed", "open").with_effect(Behavior::new("beep", "beep")),
                )
                .with_transition(Transition::new("t3", "open", "nested"))
                .with_transition(Transition::new("t4", "nested", "done"))
                .with_transition(Transition::new("t5", "closed", "closed").with_kind(TransitionKind::Internal))
                .with_transition(Transition::new("t6", "closed", "door-in")),
        )
        .with_connection_point(Pseudostate::new("door-in", "DoorIn", PseudostateKind::EntryPoint))
}

/// The same document as JSON
pub const WELL_FORMED_JSON: &str = r#"{
    "id": "door",
    "name": "Door",
    "regions": [{
        "id": "main",
        "name": "Main",
        "states": [
            {"id": "closed", "name": "Closed", "entry": {"id": "lock", "name": "lock"}},
            {"id": "open", "name": "Open"}
        ],
        "vertices": [
            {"type": "Pseudostate", "id": "init", "name": "Initial", "kind": "initial"},
            {"type": "FinalState", "id": "done", "name": "Done"}
        ],
        "transitions": [
            {"id": "t1", "source": "init", "target": "closed"},
            {"id": "t2", "source": "closed", "target": "open", "kind": "local"},
            {"id": "t3", "source": "open", "target": "done"}
        ]
    }]
}"#;

/// Messages in insertion order
pub fn messages(errors: &ValidationErrors) -> Vec<&str> {
    errors.iter().map(|e| e.message.as_str()).collect()
}

/// Errors of a result, empty when it is `Ok`
pub fn errors_of(result: Result<(), ValidationErrors>) -> ValidationErrors {
    result.err().unwrap_or_default()
}

/// Mutable access to the first region of a machine
pub fn first_region(machine: &mut StateMachine) -> &mut Region {
    machine
        .regions
        .iter_mut()
        .flatten()
        .next()
        .expect("fixture has a region")
}

//! End-to-end validation scenarios
//!
//! These tests run whole machines through the validators and assert on the
//! exact violations reported, their kinds and their positions.

mod common;

use common::{errors_of, first_region, messages, submachine, well_formed, WELL_FORMED_JSON};
use pretty_assertions::assert_eq;
use statelint_model::{
    ModelNode, Pseudostate, PseudostateKind, Region, State, StateMachine, Transition,
};
use statelint_validation::{
    ComplexPatternValidator, ErrorKind, IdentityGraph, ModelValidator, ReferenceValidator,
    Validate, ValidationConfig, ValidationContext,
};
use std::sync::Arc;

mod well_formed_models {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_formed_machine_has_no_violations() {
        let machine = well_formed();
        for config in [
            ValidationConfig::basic(),
            ValidationConfig::partial(),
            ValidationConfig::strict(),
        ] {
            let result = ModelValidator::new(config).validate(&machine);
            assert!(result.is_ok(), "unexpected violations: {:?}", result);
        }
    }

    #[test]
    fn test_well_formed_reference_graph() {
        let machine = well_formed();
        let mut validator = ReferenceValidator::default();
        assert!(validator.validate_references(Some(&machine)).is_ok());
        assert!(validator.containment_graph().find_cycle().is_none());
        assert_eq!(validator.containment_graph().neighbors("nested"), vec!["cpr", "sub"]);
    }

    #[test]
    fn test_document_loaded_from_json() {
        let machine: StateMachine = serde_json::from_str(WELL_FORMED_JSON).unwrap();
        assert!(machine.validate().is_ok());
        assert!(ModelValidator::default().validate(&machine).is_ok());
    }

    #[test]
    fn test_unknown_kind_in_document_is_reported() {
        let json = WELL_FORMED_JSON.replace(r#""kind": "local""#, r#""kind": "sideways""#);
        let machine: StateMachine = serde_json::from_str(&json).unwrap();
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Invalid);
        assert_eq!(
            errors.errors[0].path,
            "StateMachine[door].Region[main].Regions[0].Transitions[1].Kind"
        );
    }

    #[test]
    fn test_null_entries_in_document() {
        let json = WELL_FORMED_JSON.replace(r#""transitions": ["#, r#""transitions": [null, "#);
        let machine: StateMachine = serde_json::from_str(&json).unwrap();
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(messages(&errors), vec!["collection contains nil element"]);
        assert_eq!(errors.errors[0].kind, ErrorKind::Reference);
    }
}

mod required_fields {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_state_name_yields_exactly_one_required() {
        let mut machine = well_formed();
        if let Some(Some(state)) = first_region(&mut machine).states.get_mut(0) {
            state.name.clear();
        }
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(errors.len(), 1);
        let error = &errors.errors[0];
        assert_eq!(error.kind, ErrorKind::Required);
        assert_eq!(error.field, "Name");
        assert_eq!(error.object_type, "State");
        assert_eq!(error.path, "StateMachine[door].Region[main].Regions[0].States[0].Name");
    }

    #[test]
    fn test_missing_transition_target() {
        let mut machine = well_formed();
        if let Some(Some(transition)) = first_region(&mut machine).transitions.get_mut(2) {
            transition.target = None;
        }
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].field, "Target");
        assert!(errors.errors[0].path.ends_with("Transitions[2].Target"));
    }

    #[test]
    fn test_all_violations_reported_up_front() {
        let mut machine = well_formed();
        machine.name.clear();
        let region = first_region(&mut machine);
        region.id.clear();
        if let Some(Some(state)) = region.states.get_mut(0) {
            state.id.clear();
        }
        let errors = ModelValidator::new(ValidationConfig::partial()).collect_errors(&machine);
        let fields: Vec<_> = errors.iter().map(|e| (e.object_type.as_str(), e.field.as_str())).collect();
        assert_eq!(
            fields,
            vec![("StateMachine", "Name"), ("Region", "ID"), ("State", "ID")]
        );
    }
}

mod determinism {
    use super::*;
    use pretty_assertions::assert_eq;

    fn broken() -> StateMachine {
        let mut machine = well_formed();
        machine.id.clear();
        let region = first_region(&mut machine);
        region.transitions.push(Some(Transition::new("t9", "closed", "ghost")));
        region.states.push(None);
        machine
    }

    #[test]
    fn test_validation_is_idempotent() {
        let machine = broken();
        let validator = ModelValidator::default();
        let first = validator.collect_errors(&machine);
        let second = validator.collect_errors(&machine);
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_order_follows_traversal() {
        let errors = ModelValidator::default().collect_errors(&broken());
        assert_eq!(
            messages(&errors),
            vec![
                "ID is required",
                "collection contains nil element",
                "dangling reference to 'ghost'",
            ]
        );
    }
}

mod orthogonal_regions {
    use super::*;
    use pretty_assertions::assert_eq;

    fn composite(left: &str, right: &str) -> State {
        State::new("par", "Parallel")
            .with_region(Region::new("left", "Left").with_state(State::new("l1", left)))
            .with_region(Region::new("right", "Right").with_state(State::new("r1", right)))
    }

    #[test]
    fn test_shared_state_is_reported() {
        let state = composite("SharedState", "SharedState");
        let ctx = ValidationContext::new();
        let errors = errors_of(ComplexPatternValidator::new(&ctx).validate_orthogonal_regions(&state));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Constraint);
        assert!(errors.errors[0]
            .message
            .contains("vertex 'SharedState' appears in multiple orthogonal regions"));
    }

    #[test]
    fn test_disjoint_regions_pass() {
        let state = composite("Left", "Right");
        let ctx = ValidationContext::new();
        assert!(ComplexPatternValidator::new(&ctx)
            .validate_orthogonal_regions(&state)
            .is_ok());
    }

    #[test]
    fn test_shared_state_inside_machine() {
        let mut machine = well_formed();
        first_region(&mut machine).states.push(Some(composite("SharedState", "SharedState")));
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(
            messages(&errors),
            vec!["vertex 'SharedState' appears in multiple orthogonal regions"]
        );
        assert_eq!(
            errors.errors[0].path,
            "StateMachine[door].Region[main].Regions[0].States[3].Regions"
        );
    }
}

mod connection_points {
    use super::*;
    use pretty_assertions::assert_eq;

    fn machine_with(point: Pseudostate, transitions: Vec<Transition>) -> StateMachine {
        let mut region = Region::new("r1", "Main").with_state(State::new("s1", "Idle"));
        for transition in transitions {
            region = region.with_transition(transition);
        }
        StateMachine::new("sm1", "Machine")
            .with_region(region)
            .with_connection_point(point)
    }

    #[test]
    fn test_entry_point_used_as_target() {
        let machine = machine_with(
            Pseudostate::new("x", "X", PseudostateKind::EntryPoint),
            vec![Transition::new("t1", "s1", "x")],
        );
        let ctx = ValidationContext::new();
        assert!(ComplexPatternValidator::new(&ctx)
            .validate_connection_point_references(Some(&machine))
            .is_ok());
    }

    #[test]
    fn test_unreferenced_entry_point() {
        let machine = machine_with(Pseudostate::new("x", "X", PseudostateKind::EntryPoint), vec![]);
        let ctx = ValidationContext::new();
        let errors = errors_of(
            ComplexPatternValidator::new(&ctx).validate_connection_point_references(Some(&machine)),
        );
        assert_eq!(
            messages(&errors),
            vec!["connection point 'X' is not referenced by any transitions"]
        );
    }

    #[test]
    fn test_initial_connection_point() {
        let machine = machine_with(Pseudostate::new("x", "X", PseudostateKind::Initial), vec![]);
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Constraint);
        assert!(errors.errors[0].message.contains("must be entry or exit point"));
    }

    #[test]
    fn test_submachine_binding_to_missing_point() {
        let mut machine = well_formed();
        if let Some(Some(state)) = first_region(&mut machine).states.get_mut(2) {
            state.connections[0] = Some(
                statelint_model::ConnectionPointReference::new("cpr", "Bind").with_entry("sub-out"),
            );
        }
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(messages(&errors), vec!["'sub-out' is not an entry point of submachine 'sub'"]);
    }
}

mod cycles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_containment_adjacency_cycle() {
        let graph = IdentityGraph::from_adjacency([("A", ["B"]), ("B", ["C"]), ("C", ["A"])]);
        let cycle = graph.find_cycle().unwrap();
        assert_eq!(cycle.closing, "A");
        assert_eq!(cycle.to_string(), "A -> B -> C -> A");
    }

    #[test]
    fn test_submachine_reusing_owner_identity() {
        let inner = Arc::new(
            StateMachine::new("door", "Inner").with_region(Region::new("inner-r", "Inner")),
        );
        let mut machine = well_formed();
        first_region(&mut machine)
            .states
            .push(Some(State::new("loop", "Loop").with_submachine(inner)));

        let errors = ModelValidator::default().collect_errors(&machine);
        let constraint = errors.by_kind(ErrorKind::Constraint);
        assert_eq!(
            messages(&constraint),
            vec![
                "duplicate ID 'door' (already used by StateMachine at StateMachine[door])",
                "containment cycle detected at 'door': door -> main -> loop -> door",
            ]
        );
    }

    #[test]
    fn test_inheritance_cycle_through_repeated_identity() {
        let looped = Arc::new(StateMachine::new("child", "Again").with_region(Region::new("ra", "A")));
        let parent = Arc::new(
            StateMachine::new("parent", "Parent")
                .with_region(Region::new("rp", "P"))
                .extending(looped),
        );
        let child = StateMachine::new("child", "Child")
            .with_region(Region::new("rc", "C"))
            .extending(parent);

        let errors = ModelValidator::default().collect_errors(&child);
        let cycles: Vec<_> = messages(&errors)
            .into_iter()
            .filter(|m| m.contains("inheritance cycle detected"))
            .collect();
        assert_eq!(cycles, vec!["inheritance cycle detected at 'child': child -> parent -> child"]);
        assert!(errors.iter().any(|e| e.message.starts_with("duplicate ID 'child'")));

        let basic = ModelValidator::new(ValidationConfig::basic()).collect_errors(&child);
        assert!(basic.is_empty());
    }

    #[test]
    fn test_reference_graph_children_are_declared_in_order() {
        let machine = well_formed();
        let segments: Vec<String> = machine
            .children()
            .iter()
            .map(|child| child.segment())
            .collect();
        assert_eq!(segments, vec!["Regions[0]", "ConnectionPoints[0]"]);
    }
}

mod multiplicity {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_machine_without_regions() {
        let machine = StateMachine::new("sm1", "Empty");
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(messages(&errors), vec!["must have at least one region"]);
        assert_eq!(errors.errors[0].kind, ErrorKind::Multiplicity);
    }

    #[test]
    fn test_duplicate_region_name_in_redefinition() {
        let machine = StateMachine::new("sm1", "Child")
            .with_region(Region::new("r1", "R1"))
            .with_region(Region::new("r2", "R1"));
        let ctx = ValidationContext::new();
        let errors = errors_of(
            ComplexPatternValidator::new(&ctx).validate_state_machine_inheritance(Some(&machine)),
        );
        assert_eq!(messages(&errors), vec!["duplicate region name 'R1' in redefinition"]);
    }

    #[test]
    fn test_redefinition_inside_extending_machine() {
        let base = Arc::new(well_formed());
        let machine = StateMachine::new("derived", "Derived")
            .with_region(Region::new("d1", "R1").with_state(State::new("a", "Same")))
            .with_region(Region::new("d2", "R1").with_state(State::new("b", "Same")))
            .extending(base);
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(
            messages(&errors),
            vec![
                "duplicate region name 'R1' in redefinition",
                "duplicate vertex name 'Same' in redefinition",
            ]
        );
    }

    #[test]
    fn test_nested_submachine_is_validated() {
        let mut sub = (*submachine()).clone();
        sub.regions.clear();
        let state = State::new("s", "S").with_submachine(Arc::new(sub));
        let errors = state.collect_errors(&ValidationContext::new());
        assert!(messages(&errors).contains(&"must have at least one region"));
    }
}

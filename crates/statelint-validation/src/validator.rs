//! Whole-model validation
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::config::ValidationConfig;
use crate::context::ValidationContext;
use crate::error::ValidationErrors;
use crate::reference::ReferenceValidator;
use crate::validate::Validate;
use log::debug;
use statelint_model::StateMachine;

/// Runs every rule family the configured mode enables
#[derive(Debug, Clone, Default)]
pub struct ModelValidator {
    config: ValidationConfig,
}

impl ModelValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Root context carrying the configured mode and depth ceiling
    pub fn context<'a>(&self) -> ValidationContext<'a> {
        ValidationContext::new()
            .with_mode(self.config.mode)
            .with_max_depth(self.config.max_depth)
    }

    /// Validate one state machine
    pub fn validate(&self, machine: &StateMachine) -> Result<(), ValidationErrors> {
        self.collect_errors(machine).into_result()
    }

    /// Collect all validation errors (non-failing)
    pub fn collect_errors(&self, machine: &StateMachine) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.validate_into(machine, &self.context(), &mut errors);
        errors
    }

    /// Validate one state machine below `ctx`, appending to `errors`
    ///
    /// Entity rules always run. In strict mode the reference graph is checked
    /// too. Missing references and inheritance cycles are left to the entity
    /// rules, and the depth ceiling is reported by whichever walk reaches it
    /// first.
    pub fn validate_into<'a>(
        &self,
        machine: &'a StateMachine,
        ctx: &ValidationContext<'a>,
        errors: &mut ValidationErrors,
    ) {
        debug!(
            "validating state machine '{}' in {:?} mode",
            machine.id,
            ctx.mode()
        );
        machine.validate_with_errors(ctx, errors);

        if ctx.mode().checks_references() {
            ReferenceValidator::new(&self.config)
                .with_required_references(false)
                .with_inheritance_cycles(false)
                .with_depth_report(!ctx.depth_reported())
                .validate_references_into(machine, ctx, errors);
        }
    }
}

/// Batch validation for multiple state machines
///
/// Each violation carries the index of its machine under the `machine_index`
/// context key. With `fail_fast` the batch stops after the first failing
/// machine; with `max_errors` it stops once that many violations are
/// collected. Violations already collected are always kept whole.
pub fn validate_batch(
    machines: &[StateMachine],
    config: &ValidationConfig,
) -> Result<(), ValidationErrors> {
    let validator = ModelValidator::new(config.clone());
    let mut errors = ValidationErrors::new();

    for (i, machine) in machines.iter().enumerate() {
        let mut found = ValidationErrors::new();
        validator.validate_into(machine, &validator.context(), &mut found);
        if found.is_empty() {
            continue;
        }

        for error in &mut found.errors {
            error.context.insert("machine_index".to_string(), i.into());
        }
        errors.merge(found);

        if config.fail_fast {
            break;
        }

        if config.max_errors > 0 && errors.len() >= config.max_errors {
            break;
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use statelint_model::{Region, State, Transition};
    use std::sync::Arc;

    fn valid(id: &str) -> StateMachine {
        StateMachine::new(id, "Machine").with_region(
            Region::new(format!("{}-r", id), "Main")
                .with_state(State::new(format!("{}-a", id), "A"))
                .with_state(State::new(format!("{}-b", id), "B"))
                .with_transition(Transition::new(format!("{}-t", id), format!("{}-a", id), format!("{}-b", id))),
        )
    }

    fn broken(id: &str) -> StateMachine {
        StateMachine::new(id, "")
    }

    #[test]
    fn test_modes_enable_rule_families() {
        let machine = valid("sm1").with_region(
            Region::new("r2", "Other").with_transition(Transition::new("t9", "sm1-a", "ghost")),
        );
        let strict = ModelValidator::new(ValidationConfig::strict()).collect_errors(&machine);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict.errors[0].kind, ErrorKind::Reference);
        assert_eq!(strict.errors[0].message, "dangling reference to 'ghost'");

        let partial = ModelValidator::new(ValidationConfig::partial()).collect_errors(&machine);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_missing_reference_reported_once_in_strict_mode() {
        let mut machine = valid("sm1");
        if let Some(Some(region)) = machine.regions.first_mut() {
            if let Some(Some(transition)) = region.transitions.first_mut() {
                transition.target = None;
            }
        }
        let errors = ModelValidator::default().collect_errors(&machine);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].field, "Target");
    }

    fn deep(id: &str) -> StateMachine {
        let composite = |name: &str| {
            State::new(format!("{}-{}", id, name), name).with_region(
                Region::new(format!("{}-{}-r", id, name), "Inner")
                    .with_state(State::new(format!("{}-{}-leaf", id, name), "Leaf")),
            )
        };
        StateMachine::new(id, "Deep").with_region(
            Region::new(format!("{}-r", id), "Main")
                .with_state(composite("a"))
                .with_state(composite("b")),
        )
    }

    #[test]
    fn test_depth_ceiling_reported_once_per_machine() {
        let config = ValidationConfig::strict().with_max_depth(3);
        let errors = ModelValidator::new(config.clone()).collect_errors(&deep("sm1"));
        assert_eq!(
            errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["maximum nesting depth of 3 exceeded"]
        );
        assert_eq!(errors.errors[0].path, "StateMachine[sm1].Region[sm1-a-r].Regions[0].States[0].Regions[0]");

        let basic = ModelValidator::new(ValidationConfig::basic().with_max_depth(3)).collect_errors(&deep("sm1"));
        assert_eq!(basic.len(), 1);

        let batch = validate_batch(&[deep("a"), deep("b")], &config).unwrap_err();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.errors[1].context.get("machine_index"), Some(&json!(1)));
    }

    #[test]
    fn test_inheritance_cycle_reported_once_in_strict_mode() {
        let looped = Arc::new(valid("child"));
        let parent = Arc::new(valid("parent").extending(looped));
        let machine = StateMachine::new("child", "Child")
            .with_region(Region::new("own", "Own"))
            .extending(parent);

        let errors = ModelValidator::default().collect_errors(&machine);
        let cycles = errors
            .iter()
            .filter(|e| e.message.contains("inheritance cycle detected"))
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(cycles, vec!["inheritance cycle detected at 'child': child -> parent -> child"]);
    }

    #[test]
    fn test_batch_collects_all() {
        let machines = vec![valid("a"), broken("b"), broken("c")];
        let errors = validate_batch(&machines, &ValidationConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.errors[0].context.get("machine_index"), Some(&json!(1)));
        assert_eq!(errors.errors[3].context.get("machine_index"), Some(&json!(2)));
    }

    #[test]
    fn test_batch_fail_fast() {
        let machines = vec![broken("a"), broken("b")];
        let config = ValidationConfig::default().with_fail_fast();
        let errors = validate_batch(&machines, &config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.path.starts_with("StateMachine[a]")));
    }

    #[test]
    fn test_batch_max_errors_keeps_machines_whole() {
        let machines = vec![broken("a"), broken("b"), broken("c")];
        let config = ValidationConfig::default().with_max_errors(3);
        let errors = validate_batch(&machines, &config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_batch_all_valid() {
        let machines = vec![valid("a"), valid("b")];
        assert!(validate_batch(&machines, &ValidationConfig::default()).is_ok());
        assert!(validate_batch(&[], &ValidationConfig::default()).is_ok());
    }
}

//! Rules for transitions
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::{ErrorKind, ValidationErrors};
use crate::helpers::{
    validate_enum, validate_optional_reference, validate_required, validate_required_reference,
};
use crate::validate::Validate;
use statelint_model::{Transition, TransitionKind};

impl Validate for Transition {
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors) {
        validate_required(&self.id, "ID", "Transition", ctx, errors);
        validate_required_reference(self.source_id(), "Source", "Transition", ctx, errors);
        validate_required_reference(self.target_id(), "Target", "Transition", ctx, errors);
        validate_enum(self.kind.as_str(), "Kind", "Transition", TransitionKind::ALL, ctx, errors);

        if self.kind == TransitionKind::Internal {
            if let (Some(source), Some(target)) = (self.source_id(), self.target_id()) {
                if source != target {
                    errors.add_in_context(
                        ErrorKind::Constraint,
                        "Transition",
                        "Target",
                        format!(
                            "internal transition must have the same source and target, found '{}' and '{}'",
                            source, target
                        ),
                        ctx,
                    );
                }
            }
        }

        validate_optional_reference(self.effect.as_ref(), "Effect", "Transition", ctx, errors, false);
    }
}

//! The entity validation capability
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::ValidationErrors;

/// Validation surface shared by every model record
///
/// Only [`validate_with_errors`] must be implemented; it appends every
/// violation it finds and never stops at the first. The two other entry points
/// are derived from it.
///
/// [`validate_with_errors`]: Validate::validate_with_errors
pub trait Validate {
    /// Collect all violations of `self` (and its descendants) positioned below `ctx`
    fn validate_with_errors<'a>(&'a self, ctx: &ValidationContext<'a>, errors: &mut ValidationErrors);

    /// Validate with a specific context
    fn validate_in_context<'a>(&'a self, ctx: &ValidationContext<'a>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_with_errors(ctx, &mut errors);
        errors.into_result()
    }

    /// Validate from an empty strict-mode context
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_in_context(&ValidationContext::new())
    }

    /// Collect all violations without failing
    fn collect_errors<'a>(&'a self, ctx: &ValidationContext<'a>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.validate_with_errors(ctx, &mut errors);
        errors
    }
}

//! Validation primitives shared by the entity rules
//!
//! Every helper appends zero or more violations to the supplied collector and
//! never returns an error itself.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use crate::error::{ErrorKind, ValidationErrors};
use crate::validate::Validate;
use log::warn;
use std::collections::HashSet;

/// Whether a field value counts as present
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// Required error if `value` is empty
pub fn validate_required(
    value: &str,
    field: &str,
    object_type: &str,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    if value.is_empty() {
        errors.add_in_context(
            ErrorKind::Required,
            object_type,
            field,
            format!("{} is required", field),
            ctx,
        );
    }
}

/// Required error if the reference is absent
pub fn validate_required_reference<T: ?Sized>(
    reference: Option<&T>,
    field: &str,
    object_type: &str,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    if reference.is_none() {
        errors.add_in_context(
            ErrorKind::Required,
            object_type,
            field,
            format!("{} reference is required", field),
            ctx,
        );
    }
}

/// Invalid error listing the allowed set if `value` is not a member
pub fn validate_enum(
    value: &str,
    field: &str,
    object_type: &str,
    allowed: &[&str],
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    if !allowed.contains(&value) {
        errors.add_in_context(
            ErrorKind::Invalid,
            object_type,
            field,
            format!(
                "invalid value '{}' for {}, must be one of: [{}]",
                value,
                field,
                allowed.join(", ")
            ),
            ctx,
        );
    }
}

/// Validate every element of a collection at its indexed path
///
/// A `None` element is reported as a Reference error and skipped; the
/// remaining elements are still validated.
pub fn validate_collection<'a, T: Validate>(
    items: &'a [Option<T>],
    collection: &str,
    object_type: &str,
    ctx: &ValidationContext<'a>,
    errors: &mut ValidationErrors,
) {
    for (index, item) in items.iter().enumerate() {
        let child = ctx.with_indexed_path(collection, index);
        if !within_depth(&child, object_type, ctx, errors) {
            return;
        }
        match item {
            Some(item) => item.validate_with_errors(&child, errors),
            None => errors.add_with_context(
                ErrorKind::Reference,
                object_type,
                collection,
                "collection contains nil element",
                child.full_path(),
                child.metadata_map().clone(),
            ),
        }
    }
}

/// Validate a reference if present, reporting its absence when `required`
pub fn validate_optional_reference<'a, T: Validate + ?Sized>(
    reference: Option<&'a T>,
    field: &str,
    object_type: &str,
    ctx: &ValidationContext<'a>,
    errors: &mut ValidationErrors,
    required: bool,
) {
    match reference {
        Some(target) => {
            let child = ctx.with_path(field);
            if within_depth(&child, object_type, ctx, errors) {
                target.validate_with_errors(&child, errors);
            }
        }
        None if required => validate_required_reference::<T>(None, field, object_type, ctx, errors),
        None => {}
    }
}

/// Constraint error for the second and later occurrences of any identity
pub fn validate_unique_ids<T, F>(
    items: &[T],
    collection: &str,
    object_type: &str,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
    id_of: F,
) where
    F: for<'x> Fn(&'x T) -> Option<&'x str>,
{
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let Some(id) = id_of(item).filter(|id| !id.is_empty()) else {
            continue;
        };
        if !seen.insert(id) {
            let child = ctx.with_indexed_path(collection, index);
            errors.add_with_context(
                ErrorKind::Constraint,
                object_type,
                collection,
                format!("duplicate ID '{}' in {}", id, collection),
                child.full_path(),
                child.metadata_map().clone(),
            );
        }
    }
}

/// Required error only when `condition` holds
pub fn validate_conditional_required<V: Presence + ?Sized>(
    value: &V,
    field: &str,
    object_type: &str,
    condition: bool,
    description: &str,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    if condition && !value.is_present() {
        errors.add_in_context(
            ErrorKind::Required,
            object_type,
            field,
            format!("{} is required when {}", field, description),
            ctx,
        );
    }
}

/// Multiplicity error when the length is outside `[min, max]` (`max == 0` is unbounded)
pub fn validate_collection_size<T>(
    items: &[T],
    field: &str,
    object_type: &str,
    min: usize,
    max: usize,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) {
    let len = items.len();
    let noun = spaced_lowercase(field);
    let message = if len < min {
        if min == 1 {
            let singular = noun.strip_suffix('s').unwrap_or(&noun);
            format!("must have at least one {}", singular)
        } else {
            format!("must have at least {} {}, found {}", min, noun, len)
        }
    } else if max > 0 && len > max {
        format!("must have at most {} {}, found {}", max, noun, len)
    } else {
        return;
    };
    errors.add_in_context(ErrorKind::Multiplicity, object_type, field, message, ctx);
}

/// Return false when `child` lies beyond the nesting ceiling
///
/// The first crossing of a pass is reported at `parent`; later crossings only
/// stop the walk.
pub(crate) fn within_depth(
    child: &ValidationContext<'_>,
    object_type: &str,
    parent: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) -> bool {
    if !child.depth_exceeded() {
        return true;
    }
    if !parent.claim_depth_report() {
        return false;
    }
    warn!(
        "nesting depth ceiling {} reached at {}",
        child.max_depth(),
        parent.full_path()
    );
    errors.add_in_context(
        ErrorKind::Constraint,
        object_type,
        "",
        format!("maximum nesting depth of {} exceeded", child.max_depth()),
        parent,
    );
    false
}

/// `ConnectionPoints` -> `connection points`
fn spaced_lowercase(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (index, ch) in field.chars().enumerate() {
        if ch.is_uppercase() && index > 0 {
            out.push(' ');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

//! Violation records and the aggregate error returned by every entry point
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::ValidationContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Category of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A mandatory field or reference is missing
    Required,
    /// A value lies outside a closed enumeration
    Invalid,
    /// A UML semantic rule is violated
    Constraint,
    /// A reference is dangling, type-incompatible or structurally absent
    Reference,
    /// A cardinality rule ("at most one", "at least one") is violated
    Multiplicity,
}

impl ErrorKind {
    /// Every kind, in taxonomy order
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Required,
        ErrorKind::Invalid,
        ErrorKind::Constraint,
        ErrorKind::Reference,
        ErrorKind::Multiplicity,
    ];

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "Required",
            ErrorKind::Invalid => "Invalid",
            ErrorKind::Constraint => "Constraint",
            ErrorKind::Reference => "Reference",
            ErrorKind::Multiplicity => "Multiplicity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Category of the violation
    pub kind: ErrorKind,
    /// Logical type name of the violating object
    pub object_type: String,
    /// Field that violates the rule (may be empty for object-level rules)
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Path at the point of violation
    pub path: String,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl ValidationError {
    /// Create a new violation
    pub fn new<T, F, M, P>(kind: ErrorKind, object_type: T, field: F, message: M, path: P) -> Self
    where
        T: Into<String>,
        F: Into<String>,
        M: Into<String>,
        P: Into<String>,
    {
        Self {
            kind,
            object_type: object_type.into(),
            field: field.into(),
            message: message.into(),
            path: path.into(),
            context: BTreeMap::new(),
        }
    }

    /// Attach one metadata entry
    pub fn with_context<K: Into<String>>(mut self, key: K, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.object_type)?;
        if !self.field.is_empty() {
            write!(f, ".{}", self.field)?;
        }
        write!(f, ": {}", self.message)?;
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path)?;
        }
        Ok(())
    }
}

/// Insertion-ordered collection of violations
///
/// This is the aggregate error value of every validation entry point. It grows
/// monotonically during one pass and is converted with [`into_result`] at the
/// end; it never drops or reorders a violation.
///
/// [`into_result`]: ValidationErrors::into_result
#[derive(Debug, Clone, Default, PartialEq, Error, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    /// List of violations, in the order they were found
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no validation errors"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "multiple validation errors:")?;
                for error in many {
                    write!(f, "\n{}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Append a violation
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append a violation built from its parts
    pub fn add<T, F, M, P>(&mut self, kind: ErrorKind, object_type: T, field: F, message: M, path: P)
    where
        T: Into<String>,
        F: Into<String>,
        M: Into<String>,
        P: Into<String>,
    {
        self.push(ValidationError::new(kind, object_type, field, message, path));
    }

    /// Append a violation carrying metadata
    pub fn add_with_context<T, F, M, P>(
        &mut self,
        kind: ErrorKind,
        object_type: T,
        field: F,
        message: M,
        path: P,
        context: BTreeMap<String, Value>,
    ) where
        T: Into<String>,
        F: Into<String>,
        M: Into<String>,
        P: Into<String>,
    {
        let mut error = ValidationError::new(kind, object_type, field, message, path);
        error.context = context;
        self.push(error);
    }

    /// Append a violation positioned at `field` below `ctx`
    ///
    /// The path is `ctx.with_path(field).full_path()` (or the context's own
    /// path for an empty field) and the context metadata is copied onto the
    /// violation.
    pub fn add_in_context<M: Into<String>>(
        &mut self,
        kind: ErrorKind,
        object_type: &str,
        field: &str,
        message: M,
        ctx: &ValidationContext<'_>,
    ) {
        let path = if field.is_empty() {
            ctx.full_path()
        } else {
            ctx.with_path(field).full_path()
        };
        let metadata = ctx.metadata_map().clone();
        self.add_with_context(kind, object_type, field, message, path, metadata);
    }

    /// Append every violation of `other`, preserving order
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Remove every violation
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if at least one violation was recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Alias of [`len`](Self::len)
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the violations in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Violations of one kind
    pub fn by_kind(&self, kind: ErrorKind) -> ValidationErrors {
        self.filtered(|e| e.kind == kind)
    }

    /// Violations raised by one object type
    pub fn by_object_type(&self, object_type: &str) -> ValidationErrors {
        self.filtered(|e| e.object_type == object_type)
    }

    /// Violations whose path starts with `prefix`
    pub fn by_path_prefix(&self, prefix: &str) -> ValidationErrors {
        self.filtered(|e| e.path.starts_with(prefix))
    }

    fn filtered(&self, keep: impl Fn(&ValidationError) -> bool) -> ValidationErrors {
        ValidationErrors {
            errors: self.errors.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }

    /// Number of violations per kind, in taxonomy order
    pub fn counts_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            *counts.entry(error.kind).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary, e.g. `3 validation error(s): Required=2, Constraint=1`
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no validation errors".to_string();
        }
        let counts: Vec<String> = self
            .counts_by_kind()
            .iter()
            .map(|(kind, count)| format!("{}={}", kind, count))
            .collect();
        format!("{} validation error(s): {}", self.len(), counts.join(", "))
    }

    /// Multi-line report grouped by kind, then by object type
    pub fn detailed_report(&self) -> String {
        if self.is_empty() {
            return "no validation errors".to_string();
        }

        let mut report = self.summary();
        for kind in ErrorKind::ALL {
            let mut by_object: BTreeMap<&str, Vec<&ValidationError>> = BTreeMap::new();
            for error in self.errors.iter().filter(|e| e.kind == kind) {
                by_object.entry(error.object_type.as_str()).or_default().push(error);
            }
            if by_object.is_empty() {
                continue;
            }

            report.push_str(&format!("\n\n{} errors:", kind));
            for (object_type, errors) in by_object {
                report.push_str(&format!("\n  {}:", object_type));
                for error in errors {
                    let field = if error.field.is_empty() { "-" } else { &error.field };
                    report.push_str(&format!("\n    - {}: {}", field, error.message));
                    if !error.path.is_empty() {
                        report.push_str(&format!(" (at {})", error.path));
                    }
                }
            }
        }
        report
    }

    /// Render the violations as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }

    /// `Ok` when empty, otherwise a copy of the collection as the error
    pub fn to_error(&self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.clone())
        }
    }

    /// Convert to result - Ok if no errors, Err if any errors exist
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push(error);
        errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'e> IntoIterator for &'e ValidationErrors {
    type Item = &'e ValidationError;
    type IntoIter = std::slice::Iter<'e, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

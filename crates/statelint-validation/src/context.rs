//! Positional and ancestry context threaded through recursive validation
//!
//! A context is an immutable snapshot. Every `with_*` method returns a new
//! context that shares the unchanged parts with its origin: path segments form
//! a persistent list with shared tails, and metadata is copy-on-write.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use statelint_model::{Region, StateMachine};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default ceiling on nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Validation mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Entity rules, cross-node patterns and the reference graph
    #[default]
    Strict,
    /// Entity rules and cross-node patterns
    Partial,
    /// Per-entity field checks only
    Basic,
}

impl ValidationMode {
    /// Whether cross-node pattern rules run in this mode
    pub fn checks_patterns(self) -> bool {
        matches!(self, ValidationMode::Strict | ValidationMode::Partial)
    }

    /// Whether the reference graph is built and checked in this mode
    pub fn checks_references(self) -> bool {
        matches!(self, ValidationMode::Strict)
    }

    /// Parse a mode name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(ValidationMode::Strict),
            "partial" => Some(ValidationMode::Partial),
            "basic" => Some(ValidationMode::Basic),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct PathNode {
    segment: String,
    parent: Option<Arc<PathNode>>,
}

/// Validation context for passing positional information down the model
#[derive(Clone)]
pub struct ValidationContext<'a> {
    path: Option<Arc<PathNode>>,
    depth: usize,
    state_machine: Option<&'a StateMachine>,
    region: Option<&'a Region>,
    metadata: Arc<BTreeMap<String, Value>>,
    mode: ValidationMode,
    max_depth: usize,
    /// Shared by every context derived from the same root
    depth_reported: Arc<AtomicBool>,
}

impl<'a> ValidationContext<'a> {
    /// Create an empty context in strict mode
    pub fn new() -> Self {
        Self {
            path: None,
            depth: 0,
            state_machine: None,
            region: None,
            metadata: Arc::new(BTreeMap::new()),
            mode: ValidationMode::Strict,
            max_depth: DEFAULT_MAX_DEPTH,
            depth_reported: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use `ctx`, or an empty context when there is none
    pub fn or_empty(ctx: Option<&Self>) -> Self {
        ctx.cloned().unwrap_or_default()
    }

    /// Create a child context with one more path segment
    pub fn with_path<S: Into<String>>(&self, segment: S) -> Self {
        Self {
            path: Some(Arc::new(PathNode {
                segment: segment.into(),
                parent: self.path.clone(),
            })),
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Create a child context for an element of a collection, e.g. `Regions[0]`
    pub fn with_indexed_path(&self, collection: &str, index: usize) -> Self {
        self.with_path(format!("{}[{}]", collection, index))
    }

    /// Enter a state machine; the enclosing region is cleared
    pub fn with_state_machine(&self, machine: &'a StateMachine) -> Self {
        Self {
            state_machine: Some(machine),
            region: None,
            ..self.clone()
        }
    }

    /// Replace the enclosing region
    pub fn with_region(&self, region: &'a Region) -> Self {
        Self {
            region: Some(region),
            ..self.clone()
        }
    }

    /// Add context data
    pub fn with_metadata<K: Into<String>>(&self, key: K, value: impl Into<Value>) -> Self {
        let mut metadata = Arc::clone(&self.metadata);
        Arc::make_mut(&mut metadata).insert(key.into(), value.into());
        Self {
            metadata,
            ..self.clone()
        }
    }

    /// Switch the validation mode
    pub fn with_mode(&self, mode: ValidationMode) -> Self {
        Self { mode, ..self.clone() }
    }

    /// Set the nesting ceiling (0 = unbounded)
    pub fn with_max_depth(&self, max_depth: usize) -> Self {
        Self {
            max_depth,
            ..self.clone()
        }
    }

    /// Enclosing state machine, if any
    pub fn state_machine(&self) -> Option<&'a StateMachine> {
        self.state_machine
    }

    /// Enclosing region, if any
    pub fn region(&self) -> Option<&'a Region> {
        self.region
    }

    /// Get context data
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// All context data
    pub fn metadata_map(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Validation mode
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Nesting ceiling (0 = unbounded)
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of path segments
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this context lies deeper than the nesting ceiling
    pub fn depth_exceeded(&self) -> bool {
        self.max_depth > 0 && self.depth > self.max_depth
    }

    /// Whether the nesting ceiling was already reported in this pass
    pub fn depth_reported(&self) -> bool {
        self.depth_reported.load(Ordering::Relaxed)
    }

    /// Mark the nesting ceiling as reported; true for the first caller of the pass
    pub(crate) fn claim_depth_report(&self) -> bool {
        !self.depth_reported.swap(true, Ordering::Relaxed)
    }

    /// Path segments, outermost first
    pub fn path_segments(&self) -> Vec<&str> {
        let mut segments = Vec::with_capacity(self.depth);
        let mut node = self.path.as_deref();
        while let Some(current) = node {
            segments.push(current.segment.as_str());
            node = current.parent.as_deref();
        }
        segments.reverse();
        segments
    }

    /// Path segments joined with `.`
    pub fn path(&self) -> String {
        self.path_segments().join(".")
    }

    /// Ancestry plus path, e.g. `StateMachine[sm1].Region[r1].States[0].Name`
    pub fn full_path(&self) -> String {
        let machine = self
            .state_machine
            .map(|m| ancestor("StateMachine", &m.id, &m.name));
        let region = self.region.map(|r| ancestor("Region", &r.id, &r.name));
        render_path(machine.as_deref(), region.as_deref(), &self.path())
    }
}

/// Join ancestry labels and dotted segments, skipping the empty parts
pub(crate) fn render_path(machine: Option<&str>, region: Option<&str>, segments: &str) -> String {
    [machine, region, Some(segments)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// `Kind[id]`, `Kind[name]` when the id is empty, or a bare `Kind`
pub(crate) fn ancestor(kind: &str, id: &str, name: &str) -> String {
    let label = if id.is_empty() { name } else { id };
    if label.is_empty() {
        kind.to_string()
    } else {
        format!("{}[{}]", kind, label)
    }
}

impl Default for ValidationContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("path", &self.full_path())
            .field("mode", &self.mode)
            .field("max_depth", &self.max_depth)
            .field("metadata", &self.metadata)
            .finish()
    }
}

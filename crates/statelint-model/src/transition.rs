//! Transitions between vertices
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::kinds::TransitionKind;
use crate::node::{non_empty, Child, Identifiable, ModelNode, Reference, VERTEX_TYPES};
use crate::vertex::Behavior;
use serde::{Deserialize, Serialize};

/// A transition from a source vertex to a target vertex
///
/// Endpoints are held by identity; `None` (or an empty string) means the
/// endpoint is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transition {
    /// Identity
    pub id: String,

    /// Display name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Identity of the source vertex
    pub source: Option<String>,

    /// Identity of the target vertex
    pub target: Option<String>,

    /// Transition kind
    pub kind: TransitionKind,

    /// Guard expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,

    /// Effect behavior
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Behavior>,
}

impl Transition {
    /// Create an external transition between two vertices
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: Some(source.into()),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Set the transition kind
    pub fn with_kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the effect behavior
    pub fn with_effect(mut self, effect: Behavior) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Source identity, `None` when absent or empty
    pub fn source_id(&self) -> Option<&str> {
        self.source.as_deref().and_then(non_empty)
    }

    /// Target identity, `None` when absent or empty
    pub fn target_id(&self) -> Option<&str> {
        self.target.as_deref().and_then(non_empty)
    }
}

impl Identifiable for Transition {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "Transition"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for Transition {
    fn children(&self) -> Vec<Child<'_>> {
        match &self.effect {
            Some(effect) => vec![Child::field(effect, "Effect")],
            None => Vec::new(),
        }
    }

    fn references(&self) -> Vec<Reference<'_>> {
        vec![
            Reference::required("Source", self.source_id(), VERTEX_TYPES),
            Reference::required("Target", self.target_id(), VERTEX_TYPES),
        ]
    }
}

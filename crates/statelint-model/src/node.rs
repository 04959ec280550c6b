//! Identity and structure capabilities shared by every model record
//!
//! The validation engine never inspects concrete record types to find an
//! identity or walk the graph. Every record implements [`Identifiable`] and
//! [`ModelNode`], and the engine works through `&dyn ModelNode`.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

/// Identity and logical type name of a model node
pub trait Identifiable {
    /// Identity of the node, `None` when the node carries no (or an empty) ID
    fn id(&self) -> Option<&str>;

    /// Logical type name used in violation reports (e.g. `"StateMachine"`)
    fn type_name(&self) -> &'static str;

    /// Human readable name, if the node has one
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// How a child hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The parent owns the child (region in a machine, state in a region, ...)
    Owns,
    /// The child is a state machine referenced as a submachine
    Submachine,
}

/// A structural child of a node together with its position
#[derive(Clone, Copy)]
pub struct Child<'a> {
    /// The child node
    pub node: &'a dyn ModelNode,
    /// Name of the collection or field holding the child (e.g. `"Regions"`)
    pub field: &'static str,
    /// Index inside the collection, `None` for single-valued fields
    pub index: Option<usize>,
    /// Relation between parent and child
    pub relation: Relation,
}

impl<'a> Child<'a> {
    /// A child held in an indexed collection
    pub fn indexed(node: &'a dyn ModelNode, field: &'static str, index: usize) -> Self {
        Self {
            node,
            field,
            index: Some(index),
            relation: Relation::Owns,
        }
    }

    /// A child held in a single-valued field
    pub fn field(node: &'a dyn ModelNode, field: &'static str) -> Self {
        Self {
            node,
            field,
            index: None,
            relation: Relation::Owns,
        }
    }

    /// Replace the relation of this child
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    /// Path segment for this child, e.g. `Regions[0]` or `Entry`
    pub fn segment(&self) -> String {
        match self.index {
            Some(index) => format!("{}[{}]", self.field, index),
            None => self.field.to_string(),
        }
    }
}

impl std::fmt::Debug for Child<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Child")
            .field("type", &self.node.type_name())
            .field("id", &self.node.id())
            .field("field", &self.field)
            .field("index", &self.index)
            .field("relation", &self.relation)
            .finish()
    }
}

/// An outgoing reference from one node to another by identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Field holding the reference (e.g. `"Source"`)
    pub field: &'static str,
    /// Identity of the referenced node, `None` when absent
    pub target: Option<&'a str>,
    /// Whether an absent target is a violation
    pub required: bool,
    /// Type names the referenced node may have
    pub accepts: &'static [&'static str],
}

impl<'a> Reference<'a> {
    /// A mandatory reference
    pub fn required(
        field: &'static str,
        target: Option<&'a str>,
        accepts: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            target: target.filter(|t| !t.is_empty()),
            required: true,
            accepts,
        }
    }

    /// An optional reference
    pub fn optional(
        field: &'static str,
        target: Option<&'a str>,
        accepts: &'static [&'static str],
    ) -> Self {
        Self {
            required: false,
            ..Self::required(field, target, accepts)
        }
    }
}

/// A node of the model graph
///
/// Implementors expose their structural children in declaration order, the
/// references they hold to other nodes, and the node they extend (state
/// machines only). All methods default to "nothing", so leaf records only need
/// an empty impl.
pub trait ModelNode: Identifiable {
    /// Structural children in declaration order
    fn children(&self) -> Vec<Child<'_>> {
        Vec::new()
    }

    /// References to other nodes by identity
    fn references(&self) -> Vec<Reference<'_>> {
        Vec::new()
    }

    /// The node this one extends (redefines), if any
    fn extends(&self) -> Option<&dyn ModelNode> {
        None
    }
}

/// Type names a transition endpoint may resolve to
pub const VERTEX_TYPES: &[&str] = &["State", "Pseudostate", "FinalState"];

/// Type names a connection point reference may resolve to
pub const CONNECTION_POINT_TYPES: &[&str] = &["Pseudostate"];

/// Treat an empty string as an absent identity
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

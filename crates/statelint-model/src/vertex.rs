//! States, pseudostates, final states and the records they own
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::kinds::PseudostateKind;
use crate::machine::{submachine_child, Region, StateMachine};
use crate::node::{non_empty, Child, Identifiable, ModelNode, Reference, CONNECTION_POINT_TYPES};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A state, possibly composite (nested regions) or a submachine state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Nested regions; more than one makes them orthogonal
    pub regions: Vec<Option<Region>>,

    /// Machine referenced by a submachine state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submachine: Option<Arc<StateMachine>>,

    /// Behavior run on entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Behavior>,

    /// Behavior run on exit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<Behavior>,

    /// Behavior run while the state is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_activity: Option<Behavior>,

    /// Connection point references into the submachine
    pub connections: Vec<Option<ConnectionPointReference>>,
}

impl State {
    /// Create a simple state
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a nested region
    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(Some(region));
        self
    }

    /// Make this a submachine state
    pub fn with_submachine(mut self, machine: Arc<StateMachine>) -> Self {
        self.submachine = Some(machine);
        self
    }

    /// Append a connection point reference
    pub fn with_connection(mut self, connection: ConnectionPointReference) -> Self {
        self.connections.push(Some(connection));
        self
    }

    /// Set the entry behavior
    pub fn with_entry(mut self, behavior: Behavior) -> Self {
        self.entry = Some(behavior);
        self
    }

    /// Set the exit behavior
    pub fn with_exit(mut self, behavior: Behavior) -> Self {
        self.exit = Some(behavior);
        self
    }

    /// Set the do-activity behavior
    pub fn with_do_activity(mut self, behavior: Behavior) -> Self {
        self.do_activity = Some(behavior);
        self
    }

    /// A state with at least one region
    pub fn is_composite(&self) -> bool {
        !self.regions.is_empty()
    }

    /// A composite state with more than one region
    pub fn is_orthogonal(&self) -> bool {
        self.regions.len() > 1
    }

    /// A state that references a submachine
    pub fn is_submachine_state(&self) -> bool {
        self.submachine.is_some()
    }
}

impl Identifiable for State {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "State"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for State {
    fn children(&self) -> Vec<Child<'_>> {
        let mut children = Vec::new();
        for (index, region) in self.regions.iter().enumerate() {
            if let Some(region) = region {
                children.push(Child::indexed(region, "Regions", index));
            }
        }
        if let Some(entry) = &self.entry {
            children.push(Child::field(entry, "Entry"));
        }
        if let Some(exit) = &self.exit {
            children.push(Child::field(exit, "Exit"));
        }
        if let Some(activity) = &self.do_activity {
            children.push(Child::field(activity, "DoActivity"));
        }
        for (index, connection) in self.connections.iter().enumerate() {
            if let Some(connection) = connection {
                children.push(Child::indexed(connection, "Connections", index));
            }
        }
        if let Some(machine) = &self.submachine {
            children.push(submachine_child(machine));
        }
        children
    }
}

/// A pseudostate (initial, choice, fork, entry point, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pseudostate {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Role of the pseudostate
    pub kind: PseudostateKind,
}

impl Pseudostate {
    /// Create a pseudostate
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PseudostateKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

impl Identifiable for Pseudostate {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "Pseudostate"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for Pseudostate {}

/// A final state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinalState {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,
}

impl FinalState {
    /// Create a final state
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Identifiable for FinalState {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "FinalState"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for FinalState {}

/// A non-state vertex owned by a region; always carries its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Vertex {
    Pseudostate(Pseudostate),
    FinalState(FinalState),
}

impl Vertex {
    /// Identity of the wrapped vertex
    pub fn id(&self) -> &str {
        match self {
            Self::Pseudostate(p) => &p.id,
            Self::FinalState(f) => &f.id,
        }
    }

    /// Name of the wrapped vertex
    pub fn name(&self) -> &str {
        match self {
            Self::Pseudostate(p) => &p.name,
            Self::FinalState(f) => &f.name,
        }
    }

    /// Pseudostate kind, `None` for final states
    pub fn pseudostate_kind(&self) -> Option<&PseudostateKind> {
        match self {
            Self::Pseudostate(p) => Some(&p.kind),
            Self::FinalState(_) => None,
        }
    }

    /// The wrapped vertex as a graph node
    pub fn as_node(&self) -> &dyn ModelNode {
        match self {
            Self::Pseudostate(p) => p,
            Self::FinalState(f) => f,
        }
    }
}

impl From<Pseudostate> for Vertex {
    fn from(value: Pseudostate) -> Self {
        Self::Pseudostate(value)
    }
}

impl From<FinalState> for Vertex {
    fn from(value: FinalState) -> Self {
        Self::FinalState(value)
    }
}

/// An entry, exit or do-activity behavior, or a transition effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Behavior {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Language of the body (free form)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,

    /// Behavior body
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl Behavior {
    /// Create a behavior
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Identifiable for Behavior {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "Behavior"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for Behavior {}

/// A submachine state's binding to the submachine's entry/exit points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionPointReference {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Identities of referenced entry points
    pub entry: Vec<String>,

    /// Identities of referenced exit points
    pub exit: Vec<String>,
}

impl ConnectionPointReference {
    /// Create an empty connection point reference
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reference an entry point
    pub fn with_entry(mut self, point: impl Into<String>) -> Self {
        self.entry.push(point.into());
        self
    }

    /// Reference an exit point
    pub fn with_exit(mut self, point: impl Into<String>) -> Self {
        self.exit.push(point.into());
        self
    }
}

impl Identifiable for ConnectionPointReference {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "ConnectionPointReference"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for ConnectionPointReference {
    fn references(&self) -> Vec<Reference<'_>> {
        let entries = self
            .entry
            .iter()
            .map(|id| Reference::optional("Entry", Some(id.as_str()), CONNECTION_POINT_TYPES));
        let exits = self
            .exit
            .iter()
            .map(|id| Reference::optional("Exit", Some(id.as_str()), CONNECTION_POINT_TYPES));
        entries.chain(exits).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_shape_predicates() {
        let simple = State::new("s", "S");
        assert!(!simple.is_composite());
        assert!(!simple.is_orthogonal());

        let orthogonal = State::new("c", "C")
            .with_region(Region::new("a", "A"))
            .with_region(Region::new("b", "B"));
        assert!(orthogonal.is_composite());
        assert!(orthogonal.is_orthogonal());

        let sub = State::new("x", "X").with_submachine(Arc::new(StateMachine::new("m", "M")));
        assert!(sub.is_submachine_state());
    }

    #[test]
    fn test_submachine_child_is_last_and_marked() {
        let state = State::new("x", "X")
            .with_entry(Behavior::new("b", "enter"))
            .with_submachine(Arc::new(StateMachine::new("m", "M")));
        let children = state.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].segment(), "Entry");
        assert_eq!(children[1].relation, crate::node::Relation::Submachine);
        assert_eq!(children[1].node.type_name(), "StateMachine");
    }

    #[test]
    fn test_vertex_accessors() {
        let vertex: Vertex = Pseudostate::new("p", "Start", PseudostateKind::Initial).into();
        assert_eq!(vertex.id(), "p");
        assert_eq!(vertex.name(), "Start");
        assert_eq!(vertex.pseudostate_kind(), Some(&PseudostateKind::Initial));
        assert_eq!(vertex.as_node().type_name(), "Pseudostate");

        let done: Vertex = FinalState::new("f", "Done").into();
        assert!(done.pseudostate_kind().is_none());
    }

    #[test]
    fn test_connection_point_reference_references() {
        let cpr = ConnectionPointReference::new("c", "C").with_entry("in").with_exit("out");
        let refs = cpr.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].field, "Entry");
        assert_eq!(refs[0].target, Some("in"));
        assert_eq!(refs[1].field, "Exit");
    }
}

//! State machines and regions
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::node::{non_empty, Child, Identifiable, ModelNode, Relation};
use crate::transition::Transition;
use crate::vertex::{Pseudostate, State, Vertex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A UML state machine
///
/// Collections hold `Option`s because documents may carry `null` entries;
/// the validator reports those instead of rejecting the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateMachine {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Top-level regions
    pub regions: Vec<Option<Region>>,

    /// Entry and exit points exposed when the machine is used as a submachine
    pub connection_points: Vec<Option<Pseudostate>>,

    /// The machine this one extends (redefines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Arc<StateMachine>>,
}

impl StateMachine {
    /// Create an empty machine
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a region
    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(Some(region));
        self
    }

    /// Append a connection point
    pub fn with_connection_point(mut self, point: Pseudostate) -> Self {
        self.connection_points.push(Some(point));
        self
    }

    /// Extend another machine
    pub fn extending(mut self, parent: Arc<StateMachine>) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Present regions, skipping `null` entries
    pub fn present_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().flatten()
    }

    /// Every transition in every region, nested regions included, in
    /// declaration order
    pub fn all_transitions(&self) -> Vec<&Transition> {
        let mut transitions = Vec::new();
        for region in self.present_regions() {
            region.collect_transitions(&mut transitions);
        }
        transitions
    }
}

impl Identifiable for StateMachine {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "StateMachine"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for StateMachine {
    fn children(&self) -> Vec<Child<'_>> {
        let mut children = Vec::new();
        for (index, region) in self.regions.iter().enumerate() {
            if let Some(region) = region {
                children.push(Child::indexed(region, "Regions", index));
            }
        }
        for (index, point) in self.connection_points.iter().enumerate() {
            if let Some(point) = point {
                children.push(Child::indexed(point, "ConnectionPoints", index));
            }
        }
        children
    }

    fn extends(&self) -> Option<&dyn ModelNode> {
        self.extends.as_deref().map(|parent| parent as &dyn ModelNode)
    }
}

/// A region: a container of states, other vertices and transitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Region {
    /// Identity
    pub id: String,

    /// Display name
    pub name: String,

    /// States owned by the region
    pub states: Vec<Option<State>>,

    /// Pseudostates and final states owned by the region
    pub vertices: Vec<Option<Vertex>>,

    /// Transitions owned by the region
    pub transitions: Vec<Option<Transition>>,
}

impl Region {
    /// Create an empty region
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a state
    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(Some(state));
        self
    }

    /// Append a pseudostate or final state
    pub fn with_vertex(mut self, vertex: impl Into<Vertex>) -> Self {
        self.vertices.push(Some(vertex.into()));
        self
    }

    /// Append a transition
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(Some(transition));
        self
    }

    /// Names of every vertex directly owned by the region (states first, then
    /// the other vertices), in declaration order. Unnamed vertices are skipped.
    pub fn vertex_names(&self) -> Vec<&str> {
        let states = self.states.iter().flatten().map(|s| s.name.as_str());
        let others = self.vertices.iter().flatten().map(Vertex::name);
        states.chain(others).filter(|name| !name.is_empty()).collect()
    }

    fn collect_transitions<'a>(&'a self, out: &mut Vec<&'a Transition>) {
        out.extend(self.transitions.iter().flatten());
        for state in self.states.iter().flatten() {
            for nested in state.regions.iter().flatten() {
                nested.collect_transitions(out);
            }
        }
    }
}

impl Identifiable for Region {
    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn type_name(&self) -> &'static str {
        "Region"
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl ModelNode for Region {
    fn children(&self) -> Vec<Child<'_>> {
        let mut children = Vec::new();
        for (index, state) in self.states.iter().enumerate() {
            if let Some(state) = state {
                children.push(Child::indexed(state, "States", index));
            }
        }
        for (index, vertex) in self.vertices.iter().enumerate() {
            if let Some(vertex) = vertex {
                children.push(Child::indexed(vertex.as_node(), "Vertices", index));
            }
        }
        for (index, transition) in self.transitions.iter().enumerate() {
            if let Some(transition) = transition {
                children.push(Child::indexed(transition, "Transitions", index));
            }
        }
        children
    }
}

/// Make a submachine child for a state
pub(crate) fn submachine_child(machine: &StateMachine) -> Child<'_> {
    Child::field(machine, "Submachine").with_relation(Relation::Submachine)
}

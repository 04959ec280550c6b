//! Reference graph validation
//!
//! [`ReferenceValidator`] walks a model once, keyed by object identity so
//! shared (diamond) references are visited a single time, and builds:
//!
//! - a registry of identities, flagging the same identity on two distinct objects
//! - a containment graph from each node's nearest identified owner to the node
//! - an inheritance graph from each state machine to the machine it extends
//! - the list of outgoing references by identity
//!
//! It then runs the checks in a fixed order: containment cycles, inheritance
//! cycles, required references, reference resolution and target types, and
//! containment compatibility. No check short-circuits another.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::config::ValidationConfig;
use crate::context::{ancestor, render_path, ValidationContext};
use crate::error::{ErrorKind, ValidationErrors};
use crate::graph::IdentityGraph;
use log::{debug, trace, warn};
use statelint_model::{Identifiable, ModelNode, Reference, Relation};
use std::collections::HashMap;
use std::sync::Arc;

/// Parent/child type pairs a containment relationship may take
pub const ALLOWED_CONTAINMENT: &[(&str, &str)] = &[
    ("StateMachine", "Region"),
    ("StateMachine", "Pseudostate"),
    ("Region", "State"),
    ("Region", "Pseudostate"),
    ("Region", "FinalState"),
    ("Region", "Transition"),
    ("State", "Region"),
    ("State", "Behavior"),
    ("State", "ConnectionPointReference"),
    ("Transition", "Behavior"),
];

/// Whether `parent` may contain `child`
pub fn is_containment_allowed(parent: &str, child: &str) -> bool {
    ALLOWED_CONTAINMENT
        .iter()
        .any(|&(p, c)| p == parent && c == child)
}

/// Where an identity was first registered
#[derive(Debug, Clone)]
struct Registered {
    type_name: &'static str,
    path: String,
}

/// Ancestry labels and segments of a node, rendered like
/// [`ValidationContext::full_path`]
#[derive(Clone)]
struct Position {
    machine: Option<Arc<str>>,
    region: Option<Arc<str>>,
    segments: String,
}

impl Position {
    fn from_context(ctx: &ValidationContext<'_>) -> Self {
        Self {
            machine: ctx
                .state_machine()
                .map(|m| ancestor("StateMachine", &m.id, &m.name).into()),
            region: ctx.region().map(|r| ancestor("Region", &r.id, &r.name).into()),
            segments: ctx.path(),
        }
    }

    fn child(&self, segment: &str) -> Self {
        let segments = if self.segments.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", self.segments, segment)
        };
        Self {
            machine: self.machine.clone(),
            region: self.region.clone(),
            segments,
        }
    }

    /// Machines and regions become the new ancestry, as they do in entity validation
    fn entering(mut self, node: &dyn ModelNode) -> Self {
        let label = || {
            ancestor(
                node.type_name(),
                node.id().unwrap_or_default(),
                node.display_name().unwrap_or_default(),
            )
        };
        match node.type_name() {
            "StateMachine" => {
                self.machine = Some(label().into());
                self.region = None;
            }
            "Region" => self.region = Some(label().into()),
            _ => {}
        }
        self
    }

    fn render(&self) -> String {
        render_path(self.machine.as_deref(), self.region.as_deref(), &self.segments)
    }
}

/// One node waiting to be walked
struct WorkItem<'a> {
    node: &'a dyn ModelNode,
    position: Position,
    path: String,
    depth: usize,
    /// Nearest identified ancestor
    anchor: Option<&'a str>,
    /// Type of the structural parent and how it holds this node
    parent: Option<(&'static str, Relation)>,
    /// Extended machines are registered but their contents are not walked
    descend: bool,
}

struct PendingReference<'a> {
    owner_type: &'static str,
    reference: Reference<'a>,
    path: String,
}

struct ContainmentPair {
    parent_type: &'static str,
    child_type: &'static str,
    path: String,
}

/// Cross-reference and cycle validator
///
/// An instance is reset at the start of every run; it must not be shared
/// between concurrent runs.
pub struct ReferenceValidator<'a> {
    max_depth: usize,
    max_nodes: usize,
    check_required: bool,
    check_inheritance: bool,
    report_depth: bool,
    /// (type name, address) -> whether the node's contents were walked
    visited: HashMap<(&'static str, usize), bool>,
    nodes: HashMap<&'a str, Registered>,
    parents: HashMap<&'a str, &'a str>,
    containment: IdentityGraph,
    inheritance: IdentityGraph,
    references: Vec<PendingReference<'a>>,
    pairs: Vec<ContainmentPair>,
    depth_reported: bool,
    nodes_reported: bool,
    /// Set when a ceiling cut the walk short; nodes below the cut are unknown
    truncated: bool,
}

impl Default for ReferenceValidator<'_> {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl<'a> ReferenceValidator<'a> {
    /// Create a validator using the ceilings of `config`
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_nodes: config.max_nodes,
            check_required: true,
            check_inheritance: true,
            report_depth: true,
            visited: HashMap::new(),
            nodes: HashMap::new(),
            parents: HashMap::new(),
            containment: IdentityGraph::new(),
            inheritance: IdentityGraph::new(),
            references: Vec::new(),
            pairs: Vec::new(),
            depth_reported: false,
            nodes_reported: false,
            truncated: false,
        }
    }

    /// Enable or disable the required-reference phase
    pub fn with_required_references(mut self, enabled: bool) -> Self {
        self.check_required = enabled;
        self
    }

    /// Enable or disable the inheritance-cycle report
    ///
    /// The inheritance graph is still built and exposed.
    pub fn with_inheritance_cycles(mut self, enabled: bool) -> Self {
        self.check_inheritance = enabled;
        self
    }

    /// Enable or disable the depth-ceiling report
    ///
    /// The walk still stops at the ceiling.
    pub fn with_depth_report(mut self, enabled: bool) -> Self {
        self.report_depth = enabled;
        self
    }

    /// Validate every reference reachable from `root`
    pub fn validate_references(
        &mut self,
        root: Option<&'a dyn ModelNode>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match root {
            Some(root) => self.validate_references_into(root, &ValidationContext::new(), &mut errors),
            None => errors.add(
                ErrorKind::Required,
                "ReferenceValidator",
                "Root",
                "root object cannot be nil",
                "",
            ),
        }
        errors.into_result()
    }

    /// Validate every reference reachable from `root`, appending to `errors`
    ///
    /// Paths continue from `ctx` and are rendered the way entity validation
    /// renders them.
    pub fn validate_references_into(
        &mut self,
        root: &'a dyn ModelNode,
        ctx: &ValidationContext<'_>,
        errors: &mut ValidationErrors,
    ) {
        self.reset();
        let found_before = errors.len();

        self.build(root, Position::from_context(ctx), errors);
        debug!(
            "reference graph built: {} identities, {} containment edges, {} inheritance edges, {} references",
            self.nodes.len(),
            self.containment.edge_count(),
            self.inheritance.edge_count(),
            self.references.len()
        );

        self.check_cycles(errors);
        if self.check_required {
            self.check_required_references(errors);
        }
        self.check_reference_targets(errors);
        self.check_containment_pairs(errors);

        debug!(
            "reference validation found {} violation(s)",
            errors.len() - found_before
        );
    }

    /// Check that `parent` may contain `child`
    pub fn validate_containment(
        &self,
        parent: &dyn Identifiable,
        child: &dyn Identifiable,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        containment_violation(parent.type_name(), child.type_name(), "", &mut errors);
        errors.into_result()
    }

    /// Containment graph of the last run
    pub fn containment_graph(&self) -> &IdentityGraph {
        &self.containment
    }

    /// Inheritance graph of the last run
    pub fn inheritance_graph(&self) -> &IdentityGraph {
        &self.inheritance
    }

    /// Number of distinct identities registered in the last run
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.nodes.clear();
        self.parents.clear();
        self.containment = IdentityGraph::new();
        self.inheritance = IdentityGraph::new();
        self.references.clear();
        self.pairs.clear();
        self.depth_reported = false;
        self.nodes_reported = false;
        self.truncated = false;
    }

    fn build(&mut self, root: &'a dyn ModelNode, origin: Position, errors: &mut ValidationErrors) {
        let position = origin.entering(root);
        let mut stack = vec![WorkItem {
            node: root,
            path: position.render(),
            position,
            depth: 0,
            anchor: None,
            parent: None,
            descend: true,
        }];

        while let Some(item) = stack.pop() {
            let node = item.node;
            if self.max_depth > 0 && item.depth > self.max_depth {
                self.report_depth(&item, errors);
                continue;
            }

            if let (Some(owner), Some(id)) = (item.anchor, node.id()) {
                self.containment.add_edge(owner, id);
            }
            if let Some((parent_type, Relation::Owns)) = item.parent {
                self.pairs.push(ContainmentPair {
                    parent_type,
                    child_type: node.type_name(),
                    path: item.path.clone(),
                });
            }

            let key = identity_key(node);
            match self.visited.get(&key).copied() {
                Some(true) => continue,
                Some(false) if !item.descend => continue,
                Some(false) => {
                    self.visited.insert(key, true);
                }
                None => {
                    if self.max_nodes > 0 && self.visited.len() >= self.max_nodes {
                        self.report_nodes(&item, errors);
                        break;
                    }
                    self.visited.insert(key, item.descend);
                    self.register(&item, errors);
                    if let Some(parent) = node.extends() {
                        self.link_inheritance(&item, parent, errors);
                        let position = item.position.child("Extends").entering(parent);
                        stack.push(WorkItem {
                            node: parent,
                            path: position.render(),
                            position,
                            depth: item.depth + 1,
                            anchor: None,
                            parent: None,
                            descend: false,
                        });
                    }
                }
            }

            if !item.descend {
                continue;
            }

            for reference in node.references() {
                self.references.push(PendingReference {
                    owner_type: node.type_name(),
                    reference,
                    path: item.path.clone(),
                });
            }

            let anchor = node.id().or(item.anchor);
            for child in node.children().into_iter().rev() {
                let position = item.position.child(&child.segment()).entering(child.node);
                stack.push(WorkItem {
                    node: child.node,
                    path: position.render(),
                    position,
                    depth: item.depth + 1,
                    anchor,
                    parent: Some((node.type_name(), child.relation)),
                    descend: true,
                });
            }
        }
    }

    fn register(&mut self, item: &WorkItem<'a>, errors: &mut ValidationErrors) {
        let node = item.node;
        let Some(id) = node.id() else {
            return;
        };
        trace!("registering {} '{}' at {}", node.type_name(), id, item.path);

        self.containment.node(id);
        match self.nodes.get(id) {
            Some(existing) => errors.add(
                ErrorKind::Constraint,
                node.type_name(),
                "ID",
                format!(
                    "duplicate ID '{}' (already used by {} at {})",
                    id, existing.type_name, existing.path
                ),
                item.path.as_str(),
            ),
            None => {
                self.nodes.insert(
                    id,
                    Registered {
                        type_name: node.type_name(),
                        path: item.path.clone(),
                    },
                );
            }
        }
    }

    fn link_inheritance(
        &mut self,
        item: &WorkItem<'a>,
        parent: &'a dyn ModelNode,
        errors: &mut ValidationErrors,
    ) {
        let (Some(child_id), Some(parent_id)) = (item.node.id(), parent.id()) else {
            return;
        };
        match self.parents.get(child_id) {
            Some(&existing) if existing != parent_id => errors.add(
                ErrorKind::Multiplicity,
                item.node.type_name(),
                "Extends",
                format!(
                    "'{}' can extend at most one parent, found '{}' and '{}'",
                    child_id, existing, parent_id
                ),
                item.path.as_str(),
            ),
            Some(_) => {}
            None => {
                self.parents.insert(child_id, parent_id);
                self.inheritance.add_edge(child_id, parent_id);
            }
        }
    }

    fn report_depth(&mut self, item: &WorkItem<'a>, errors: &mut ValidationErrors) {
        self.truncated = true;
        if self.depth_reported || !self.report_depth {
            return;
        }
        self.depth_reported = true;
        warn!(
            "reference traversal stopped at depth {} ({})",
            self.max_depth, item.path
        );
        errors.add(
            ErrorKind::Constraint,
            item.node.type_name(),
            "",
            format!("maximum nesting depth of {} exceeded", self.max_depth),
            item.path.as_str(),
        );
    }

    fn report_nodes(&mut self, item: &WorkItem<'a>, errors: &mut ValidationErrors) {
        self.truncated = true;
        if self.nodes_reported {
            return;
        }
        self.nodes_reported = true;
        warn!(
            "reference traversal stopped after {} nodes ({})",
            self.max_nodes, item.path
        );
        errors.add(
            ErrorKind::Constraint,
            item.node.type_name(),
            "",
            format!("maximum node count of {} exceeded", self.max_nodes),
            item.path.as_str(),
        );
    }

    fn check_cycles(&self, errors: &mut ValidationErrors) {
        if let Some(cycle) = self.containment.find_cycle() {
            let (type_name, path) = self.located(&cycle.closing);
            errors.add(
                ErrorKind::Constraint,
                type_name,
                "",
                format!("containment cycle detected at '{}': {}", cycle.closing, cycle),
                path,
            );
        }
        if !self.check_inheritance {
            return;
        }
        if let Some(cycle) = self.inheritance.find_cycle() {
            let (type_name, path) = self.located(&cycle.closing);
            errors.add(
                ErrorKind::Constraint,
                type_name,
                "Extends",
                format!("inheritance cycle detected at '{}': {}", cycle.closing, cycle),
                path,
            );
        }
    }

    fn check_required_references(&self, errors: &mut ValidationErrors) {
        for pending in &self.references {
            let reference = &pending.reference;
            if reference.required && reference.target.is_none() {
                errors.add(
                    ErrorKind::Required,
                    pending.owner_type,
                    reference.field,
                    format!("{} reference is required", reference.field),
                    join_path(&pending.path, reference.field),
                );
            }
        }
    }

    fn check_reference_targets(&self, errors: &mut ValidationErrors) {
        for pending in &self.references {
            let reference = &pending.reference;
            let Some(target) = reference.target else {
                continue;
            };
            let path = join_path(&pending.path, reference.field);
            match self.nodes.get(target) {
                None if self.truncated => {
                    trace!("'{}' not resolved, it may lie below the traversal ceiling", target);
                }
                None => errors.add(
                    ErrorKind::Reference,
                    pending.owner_type,
                    reference.field,
                    format!("dangling reference to '{}'", target),
                    path,
                ),
                Some(found) if !reference.accepts.contains(&found.type_name) => errors.add(
                    ErrorKind::Reference,
                    pending.owner_type,
                    reference.field,
                    format!(
                        "{} must reference one of [{}], found {}",
                        reference.field,
                        reference.accepts.join(", "),
                        found.type_name
                    ),
                    path,
                ),
                Some(_) => {}
            }
        }
    }

    fn check_containment_pairs(&self, errors: &mut ValidationErrors) {
        for pair in &self.pairs {
            containment_violation(pair.parent_type, pair.child_type, &pair.path, errors);
        }
    }

    fn located(&self, id: &str) -> (&'static str, String) {
        self.nodes
            .get(id)
            .map(|n| (n.type_name, n.path.clone()))
            .unwrap_or(("ModelNode", String::new()))
    }
}

fn containment_violation(parent: &str, child: &str, path: &str, errors: &mut ValidationErrors) {
    if !is_containment_allowed(parent, child) {
        errors.add(
            ErrorKind::Reference,
            parent,
            "",
            format!("{} cannot contain {}", parent, child),
            path,
        );
    }
}

fn identity_key(node: &dyn ModelNode) -> (&'static str, usize) {
    (
        node.type_name(),
        node as *const dyn ModelNode as *const () as usize,
    )
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

//! Statelint Model - UML state machine records
//!
//! This crate holds the plain records of a UML state machine model (state
//! machines, regions, states, pseudostates, final states, transitions,
//! behaviors and connection point references) together with the two
//! capabilities the validation engine consumes:
//!
//! - [`Identifiable`]: an identity accessor and a logical type name
//! - [`ModelNode`]: structural children, references by identity, and the
//!   extended (redefined) node
//!
//! Records derive `serde` so they can be loaded from JSON documents. Collection
//! entries are `Option`s because such documents may contain `null` entries.
//!
//! ```rust
//! use statelint_model::{Identifiable, ModelNode, Region, State, StateMachine};
//!
//! let machine = StateMachine::new("sm1", "Door")
//!     .with_region(Region::new("r1", "Main").with_state(State::new("s1", "Closed")));
//!
//! assert_eq!(machine.type_name(), "StateMachine");
//! assert_eq!(machine.children().len(), 1);
//! ```
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

pub mod kinds;
pub mod machine;
pub mod node;
pub mod transition;
pub mod vertex;

pub use kinds::{PseudostateKind, TransitionKind};
pub use machine::{Region, StateMachine};
pub use node::{
    Child, Identifiable, ModelNode, Reference, Relation, CONNECTION_POINT_TYPES, VERTEX_TYPES,
};
pub use transition::Transition;
pub use vertex::{Behavior, ConnectionPointReference, FinalState, Pseudostate, State, Vertex};

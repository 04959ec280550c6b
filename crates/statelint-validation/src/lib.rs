//! Statelint Validation - structural and semantic checks for UML state machines
//!
//! This crate validates the records of `statelint-model` and reports *every*
//! violation it finds in one pass. Rule families are enabled by the
//! validation mode:
//!
//! - **Basic**: per-entity field checks (required fields, enumerations, multiplicities)
//! - **Partial**: Basic + cross-node patterns (orthogonal regions, connection
//!   points, inheritance and redefinition)
//! - **Strict**: Partial + the reference graph (duplicate identities,
//!   containment and inheritance cycles, dangling and mistyped references)
//!
//! ## Quick Start
//!
//! ```rust
//! use statelint_model::{Region, State, StateMachine, Transition};
//! use statelint_validation::{ModelValidator, ValidationConfig};
//!
//! let machine = StateMachine::new("sm1", "Door").with_region(
//!     Region::new("r1", "Main")
//!         .with_state(State::new("open", "Open"))
//!         .with_state(State::new("closed", "Closed"))
//!         .with_transition(Transition::new("t1", "open", "closed")),
//! );
//!
//! let validator = ModelValidator::new(ValidationConfig::strict());
//! assert!(validator.validate(&machine).is_ok());
//!
//! let broken = StateMachine::new("sm2", "Empty");
//! let errors = validator.validate(&broken).unwrap_err();
//! assert_eq!(errors.to_string(), "[Multiplicity] StateMachine.Regions: must have at least one region (at StateMachine[sm2].Regions)");
//! ```
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod helpers;
pub mod machine;
pub mod patterns;
pub mod reference;
pub mod transition;
pub mod validate;
pub mod validator;
pub mod vertex;

// Re-export commonly used types
pub use config::{ConfigError, ValidationConfig, DEFAULT_MAX_NODES};
pub use context::{ValidationContext, ValidationMode, DEFAULT_MAX_DEPTH};
pub use error::{ErrorKind, ValidationError, ValidationErrors};
pub use graph::{Cycle, IdentityGraph};
pub use patterns::ComplexPatternValidator;
pub use reference::{is_containment_allowed, ReferenceValidator, ALLOWED_CONTAINMENT};
pub use validate::Validate;
pub use validator::{validate_batch, ModelValidator};

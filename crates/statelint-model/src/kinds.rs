//! Closed enumerations used by model records
//!
//! Kinds are parsed leniently: an unrecognised spelling is kept as
//! `Unknown(..)` instead of failing deserialization, so the validator can
//! report it as an `Invalid` violation alongside everything else.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a pseudostate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PseudostateKind {
    Initial,
    DeepHistory,
    ShallowHistory,
    Join,
    Fork,
    Junction,
    Choice,
    EntryPoint,
    ExitPoint,
    Terminate,
    /// A spelling that is not part of the enumeration
    Unknown(String),
}

impl PseudostateKind {
    /// Every valid spelling, in declaration order
    pub const ALL: &'static [&'static str] = &[
        "initial",
        "deepHistory",
        "shallowHistory",
        "join",
        "fork",
        "junction",
        "choice",
        "entryPoint",
        "exitPoint",
        "terminate",
    ];

    /// Canonical spelling of this kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initial => "initial",
            Self::DeepHistory => "deepHistory",
            Self::ShallowHistory => "shallowHistory",
            Self::Join => "join",
            Self::Fork => "fork",
            Self::Junction => "junction",
            Self::Choice => "choice",
            Self::EntryPoint => "entryPoint",
            Self::ExitPoint => "exitPoint",
            Self::Terminate => "terminate",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parse a spelling, keeping unknown values
    pub fn parse(value: &str) -> Self {
        match value {
            "initial" => Self::Initial,
            "deepHistory" => Self::DeepHistory,
            "shallowHistory" => Self::ShallowHistory,
            "join" => Self::Join,
            "fork" => Self::Fork,
            "junction" => Self::Junction,
            "choice" => Self::Choice,
            "entryPoint" => Self::EntryPoint,
            "exitPoint" => Self::ExitPoint,
            "terminate" => Self::Terminate,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Entry and exit points are the only kinds usable as connection points
    pub fn is_connection_point(&self) -> bool {
        matches!(self, Self::EntryPoint | Self::ExitPoint)
    }
}

impl Default for PseudostateKind {
    fn default() -> Self {
        Self::Initial
    }
}

impl From<String> for PseudostateKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PseudostateKind> for String {
    fn from(kind: PseudostateKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PseudostateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransitionKind {
    Internal,
    Local,
    External,
    /// A spelling that is not part of the enumeration
    Unknown(String),
}

impl TransitionKind {
    /// Every valid spelling, in declaration order
    pub const ALL: &'static [&'static str] = &["internal", "local", "external"];

    /// Canonical spelling of this kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal => "internal",
            Self::Local => "local",
            Self::External => "external",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parse a spelling, keeping unknown values
    pub fn parse(value: &str) -> Self {
        match value {
            "internal" => Self::Internal,
            "local" => Self::Local,
            "external" => Self::External,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl Default for TransitionKind {
    fn default() -> Self {
        Self::External
    }
}

impl From<String> for TransitionKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TransitionKind> for String {
    fn from(kind: TransitionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

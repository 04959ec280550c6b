//! Validation configuration
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use crate::context::{ValidationMode, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling on the number of nodes registered in the reference graph
pub const DEFAULT_MAX_NODES: usize = 100_000;

/// Errors raised while loading a [`ValidationConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse validation config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: String, value: String },
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validation mode to use
    pub mode: ValidationMode,
    /// Whether to stop on first error or collect all errors
    pub fail_fast: bool,
    /// Maximum number of errors to collect (0 = unlimited)
    pub max_errors: usize,
    /// Maximum nesting depth (0 = unlimited)
    pub max_depth: usize,
    /// Maximum number of nodes in the reference graph (0 = unlimited)
    pub max_nodes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ValidationConfig {
    /// Create a configuration for strict validation
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            fail_fast: false,
            max_errors: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Create a configuration for partial validation (entity and pattern rules)
    pub fn partial() -> Self {
        Self {
            mode: ValidationMode::Partial,
            ..Self::strict()
        }
    }

    /// Create a configuration for basic validation
    pub fn basic() -> Self {
        Self {
            mode: ValidationMode::Basic,
            ..Self::strict()
        }
    }

    /// Enable fail-fast mode
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Set maximum number of errors to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Set the nesting ceiling
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the node-count ceiling
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `STATELINT_*` overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env_vars(std::env::vars())
    }

    /// Apply `STATELINT_*` overrides from the given variables
    ///
    /// Recognised variables: `STATELINT_MODE` (strict, partial or basic),
    /// `STATELINT_FAIL_FAST` (true/false/1/0), `STATELINT_MAX_ERRORS`,
    /// `STATELINT_MAX_DEPTH` and `STATELINT_MAX_NODES`. Other variables are
    /// ignored.
    pub fn merge_env_vars<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "STATELINT_MODE" => {
                    self.mode = ValidationMode::parse(value).ok_or_else(|| invalid(key, value))?;
                }
                "STATELINT_FAIL_FAST" => {
                    self.fail_fast = match value.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        _ => return Err(invalid(key, value)),
                    };
                }
                "STATELINT_MAX_ERRORS" => self.max_errors = parse_count(key, value)?,
                "STATELINT_MAX_DEPTH" => self.max_depth = parse_count(key, value)?,
                "STATELINT_MAX_NODES" => self.max_nodes = parse_count(key, value)?,
                _ => {}
            }
        }
        Ok(self)
    }
}

fn parse_count(var: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    }
}

//! Delegate Configuration
//!
//! Policies for how a delegate behaves when a mutation fails partway or a
//! receiver disappears. Loaded from TOML:
//!
//! ```toml
//! mutation_policy = "atomic"
//! dead_receivers = "skip"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DelegateError, DelegateResult};

/// Configuration for a delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateConfig {
    /// What a failed `merge` or `replace` leaves behind.
    pub mutation_policy: MutationPolicy,

    /// What invocation does with a binding whose receiver was dropped.
    pub dead_receivers: DeadReceiverPolicy,
}

/// Failure semantics for multi-step mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPolicy {
    /// Keep whatever was applied before the failing step.
    #[default]
    Partial,
    /// Stage the mutation and commit it only if every step succeeds.
    Atomic,
}

/// Handling of bindings whose receiver no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadReceiverPolicy {
    /// Stop invocation with [`DelegateError::DeadReceiver`].
    #[default]
    Error,
    /// Skip the binding and keep going.
    Skip,
}

impl DelegateConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> DelegateResult<Self> {
        toml::from_str(source).map_err(|e| DelegateError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DelegateResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> DelegateResult<String> {
        toml::to_string_pretty(self).map_err(|e| DelegateError::Config(e.to_string()))
    }
}

//! Errors raised by delegate construction, mutation and invocation.

use std::fmt;

use thiserror::Error;

use crate::signature::{Signature, TypeTag};

/// Which half of a signature failed the homogeneity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// The return types differ.
    ReturnType,
    /// The parameter type sequences differ.
    Parameters,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::ReturnType => write!(f, "return type"),
            MismatchKind::Parameters => write!(f, "parameter signature"),
        }
    }
}

/// Errors that can occur while working with a [`Delegate`](crate::Delegate).
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("operation name must not be empty")]
    EmptyName,

    #[error("type `{receiver}` declares no operations")]
    NoOperations { receiver: &'static str },

    #[error("operation `{name}` not found on type `{receiver}`")]
    OperationNotFound { receiver: &'static str, name: String },

    #[error("{kind} mismatch for `{operation}`: delegate is bound to `{expected}`, found `{found}`")]
    SignatureMismatch {
        operation: String,
        kind: MismatchKind,
        expected: Signature,
        found: Signature,
    },

    #[error("no bound operation named `{name}`")]
    NotFound { name: String },

    #[error("source delegate has no bindings")]
    EmptySource,

    #[error("argument mismatch: expected ({expected}), found ({found})")]
    ArgumentMismatch { expected: String, found: String },

    #[error("result type mismatch: bound operations return `{expected}`, caller asked for `{found}`")]
    ResultTypeMismatch { expected: TypeTag, found: TypeTag },

    #[error("binding index {index} out of range for delegate of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("receiver of `{operation}` has been dropped")]
    DeadReceiver { operation: String },

    #[error("receiver of `{operation}` is not a `{expected}`")]
    ReceiverType { operation: String, expected: TypeTag },

    #[error("receiver of `{operation}` is already borrowed")]
    ReceiverBusy { operation: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A failure raised by the bound operation itself.
    #[error(transparent)]
    Operation(Box<dyn std::error::Error + Send + Sync>),
}

impl DelegateError {
    /// Whether this error came from name-based resolution on a receiver type.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            DelegateError::NoOperations { .. } | DelegateError::OperationNotFound { .. }
        )
    }
}

/// Result type for delegate operations.
pub type DelegateResult<T> = Result<T, DelegateError>;

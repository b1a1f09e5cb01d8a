//! Error types for path resolution, typed access and document codecs.

use crate::node::NodeKind;
use thiserror::Error;

/// Errors that can occur while reading, mutating or (de)serializing a tree.
#[derive(Error, Debug)]
pub enum KeyValError {
    /// A traversal step expected a mapping, or a typed accessor expected a
    /// specific kind, and found something else.
    #[error("value at `{path}` was not a {expected} (found {found})")]
    TypeMismatch {
        path: String,
        expected: NodeKind,
        found: NodeKind,
    },

    /// A required key does not exist.
    #[error("could not resolve `{path}`: key `{key}` is missing")]
    KeyMissing { path: String, key: String },

    /// An intermediate segment exists but holds a non-mapping value.
    #[error("key `{key}` at `{path}` is not reachable: it holds a {found}, not a mapping")]
    KeyUnreachable {
        path: String,
        key: String,
        found: NodeKind,
    },

    /// `value` was called without any keys.
    #[error("path is empty; nothing to resolve")]
    EmptyPath,

    /// A decoded document was neither a mapping nor `null`.
    #[error("document root was a {found}, expected a mapping")]
    RootNotMapping { found: NodeKind },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Coarse classification of a [`KeyValError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    KeyMissing,
    KeyUnreachable,
    /// Bad input: an empty path, a non-mapping document, or a codec failure.
    InvalidInput,
}

impl KeyValError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeyValError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            KeyValError::KeyMissing { .. } => ErrorKind::KeyMissing,
            KeyValError::KeyUnreachable { .. } => ErrorKind::KeyUnreachable,
            KeyValError::EmptyPath
            | KeyValError::RootNotMapping { .. }
            | KeyValError::Json(_)
            | KeyValError::Yaml(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Convenience alias used throughout keyval.
pub type Result<T> = std::result::Result<T, KeyValError>;

//! Unified error types for the stackweave workspace.
//!
//! Every failure in graph construction, resolution, and emission is a
//! configuration or structural error. None of them are transient, so
//! nothing in the workspace retries or downgrades them.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StackweaveError {
    /// A required configuration value is absent or malformed.
    #[error("validation failed for {subject}: `{field}` {reason}")]
    Validation {
        /// Stack, resource, or configuration source being validated.
        subject: String,
        /// Name of the offending field.
        field: String,
        /// What is wrong with the field.
        reason: String,
    },

    /// A dependency graph contains a cycle.
    #[error("cyclic dependency detected in {scope}: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Graph in which the cycle was found (`app` or a stack name).
        scope: String,
        /// Minimal loop in "depends on" order, closed by its first node.
        cycle: Vec<String>,
    },

    /// An output value was read before its producing stack was provisioned.
    #[error("unresolved reference to output `{key}` of stack {stack}: stack is not provisioned")]
    UnresolvedReference {
        /// Producing stack.
        stack: String,
        /// Output key.
        key: String,
    },

    /// A required entity was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing entity.
        kind: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// The provisioning engine rejected a stack.
    #[error("provisioning failed for stack {stack}: {message}")]
    Provisioning {
        /// Stack being provisioned.
        stack: String,
        /// Engine-provided description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An environment file could not be read or parsed.
    #[error("cannot read environment file {path}: {source}")]
    EnvFile {
        /// Path of the environment file.
        path: PathBuf,
        /// Underlying parse or I/O error.
        source: dotenv::Error,
    },

    /// JSON serialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization failed.
    #[error("YAML serialization error: {source}")]
    Yaml {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl StackweaveError {
    /// Shorthand for a [`StackweaveError::Validation`].
    pub fn validation(
        subject: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            subject: subject.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing required field.
    pub fn missing(subject: impl Into<String>, field: impl Into<String>) -> Self {
        Self::validation(subject, field, "is required but missing")
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StackweaveError>;

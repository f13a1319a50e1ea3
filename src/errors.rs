//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`RigError`] covers all failure modes including:
//! - Unresolved pointers and bone hashes in the decoded asset graph
//! - Cycles in bone hierarchies
//! - Malformed audio and texture containers
//! - Rejected scene-host mutations
//!
//! Every variant maps onto an [`ErrorKind`], which is what batch reports
//! aggregate on. No error is retryable: inputs are static asset bytes.
//!
//! ```rust,ignore
//! use rigport::errors::{RigError, Result};
//!
//! fn import_one() -> Result<()> {
//!     Err(RigError::unresolved("root bone", "SkinnedMeshRenderer #42"))
//! }
//! ```

use thiserror::Error;

/// The main error type for rigport.
#[derive(Error, Debug)]
pub enum RigError {
    // ========================================================================
    // Asset Graph Errors
    // ========================================================================
    /// A pointer, bone hash or slot target could not be resolved.
    #[error("Unresolved {what}: {context}")]
    UnresolvedReference {
        /// What kind of reference was being resolved (e.g. "root bone")
        what: &'static str,
        /// Where it was referenced from
        context: String,
    },

    /// A bone hierarchy walk revisited a node.
    #[error("Cycle detected in bone hierarchy at '{node}'")]
    CycleDetected {
        /// Name (or identity) of the revisited node
        node: String,
    },

    /// Flat buffers handed over by the provider are inconsistent.
    #[error("Invalid mesh buffers: {0}")]
    InvalidBuffers(String),

    /// A provider record did not match the expected schema.
    #[error("Record schema mismatch for {class}: {source}")]
    RecordSchema {
        /// Record class being decoded
        class: &'static str,
        /// Underlying serde error
        source: serde_json::Error,
    },

    // ========================================================================
    // Container Errors
    // ========================================================================
    /// Audio or texture container header is malformed.
    #[error("Container parse error: {0}")]
    ContainerParse(String),

    /// The container codec cannot be rebuilt into a standalone file.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(String),

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// A scene mutation was rejected by the host.
    #[error("Scene host rejected call: {0}")]
    HostAdapter(String),

    // ========================================================================
    // I/O & Configuration Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error classes used for batch aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum ErrorKind {
    UnresolvedReference,
    CycleDetected,
    ContainerParseFailure,
    HostAdapterFailure,
    Io,
}

impl RigError {
    /// Shorthand for [`RigError::UnresolvedReference`].
    pub fn unresolved(what: &'static str, context: impl Into<String>) -> Self {
        RigError::UnresolvedReference {
            what,
            context: context.into(),
        }
    }

    /// Classifies this error into the batch-level taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RigError::UnresolvedReference { .. } | RigError::RecordSchema { .. } => {
                ErrorKind::UnresolvedReference
            }
            RigError::CycleDetected { .. } => ErrorKind::CycleDetected,
            RigError::InvalidBuffers(_)
            | RigError::ContainerParse(_)
            | RigError::UnsupportedCodec(_)
            | RigError::Image(_)
            | RigError::Json(_)
            | RigError::Base64(_) => ErrorKind::ContainerParseFailure,
            RigError::HostAdapter(_) => ErrorKind::HostAdapterFailure,
            RigError::Io(_) | RigError::Config(_) => ErrorKind::Io,
        }
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for RigError {
    fn from(err: image::ImageError) -> Self {
        RigError::Image(err.to_string())
    }
}

/// Alias for `Result<T, RigError>`.
pub type Result<T> = std::result::Result<T, RigError>;

//! Error types for editing operations.

use std::fmt;

use thiserror::Error;

/// Result type alias for editing operations.
pub type EditResult<T = crate::EditOutcome> = Result<T, EditError>;

/// Category of an editing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditErrorKind {
    /// A target id does not name a live entity.
    InvalidIndex,
    /// The target geometry cannot support the operation.
    DegenerateGeometry,
    /// Bridge targets already share a vertex.
    AlreadyConnected,
    /// Bridge source and target are the same entity.
    SelfBridge,
    /// The mesh has no live vertices.
    EmptyMesh,
    /// A parameter is outside its accepted range.
    InvalidParameter,
    /// The operation failed unexpectedly; the mesh was restored.
    Internal,
}

impl fmt::Display for EditErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidIndex => "invalid index",
            Self::DegenerateGeometry => "degenerate geometry",
            Self::AlreadyConnected => "already connected",
            Self::SelfBridge => "self bridge",
            Self::EmptyMesh => "empty mesh",
            Self::InvalidParameter => "invalid parameter",
            Self::Internal => "internal error",
        };
        f.write_str(s)
    }
}

/// An editing operation failed. The mesh is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EditError {
    /// Failure category.
    pub kind: EditErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl EditError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: EditErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid index error.
    #[must_use]
    pub fn invalid_index(what: impl fmt::Display) -> Self {
        Self::new(EditErrorKind::InvalidIndex, format!("{what} does not exist"))
    }

    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(details: impl Into<String>) -> Self {
        Self::new(EditErrorKind::DegenerateGeometry, details)
    }

    /// Create an already connected error.
    #[must_use]
    pub fn already_connected(details: impl Into<String>) -> Self {
        Self::new(EditErrorKind::AlreadyConnected, details)
    }

    /// Create a self bridge error.
    #[must_use]
    pub fn self_bridge(details: impl Into<String>) -> Self {
        Self::new(EditErrorKind::SelfBridge, details)
    }

    /// Create an empty mesh error.
    #[must_use]
    pub fn empty_mesh() -> Self {
        Self::new(EditErrorKind::EmptyMesh, "mesh has no vertices")
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::new(EditErrorKind::InvalidParameter, details)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(EditErrorKind::Internal, details)
    }
}

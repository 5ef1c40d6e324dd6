//! Error types for the bake/export pipeline.

use serde::{Deserialize, Serialize};

/// Failure reported by a host binding (timeline, action slot, pose readback).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{reason}")]
pub struct HostError {
    pub reason: String,
}

impl HostError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Every way an export run can fail. Any of these aborts the whole run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ExportError {
    /// No skeletal object was handed to the exporter.
    #[error("Please select an armature object first")]
    MissingArmature,

    /// A clip (or transition) window whose start lies after its end.
    #[error("Start frame cannot be after end frame for animation: {clip} ({start} > {end})")]
    InvalidRange { clip: String, start: u32, end: u32 },

    /// Sampling step of zero.
    #[error("Frame step must be at least 1 for animation: {clip}")]
    InvalidStep { clip: String },

    /// Multi export with nothing included.
    #[error("No animations selected for export")]
    NoClipsSelected,

    /// Binary export without an established destination.
    #[error("Please save your document first to use binary export")]
    UnsavedDocument,

    /// Single export with no usable name.
    #[error("Please provide an animation name or ensure the armature has an action")]
    AmbiguousName,

    /// Full-range single export with no active action to take the range from.
    #[error("No animation found for full range export")]
    NoActiveAction,

    /// A selected clip names an action the host does not know.
    #[error("Unknown action: {name}")]
    UnknownAction { name: String },

    /// The host returned a pose with a different bone count mid-run.
    #[error("Bone count changed during export: expected {expected}, got {actual}")]
    BoneCountMismatch { expected: usize, actual: usize },

    #[error("Host error: {reason}")]
    Host { reason: String },

    #[error("IO error: {reason}")]
    Io { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl ExportError {
    pub fn invalid_range(clip: impl Into<String>, start: u32, end: u32) -> Self {
        Self::InvalidRange {
            clip: clip.into(),
            start,
            end,
        }
    }

    /// Get error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingArmature
            | Self::NoClipsSelected
            | Self::AmbiguousName
            | Self::NoActiveAction
            | Self::UnknownAction { .. } => "selection",
            Self::InvalidRange { .. }
            | Self::InvalidStep { .. }
            | Self::BoneCountMismatch { .. } => "validation",
            Self::UnsavedDocument | Self::Io { .. } => "io",
            Self::Host { .. } => "host",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<HostError> for ExportError {
    fn from(err: HostError) -> Self {
        Self::Host { reason: err.reason }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

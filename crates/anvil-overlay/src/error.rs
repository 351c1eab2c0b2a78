//! Overlay and transformation error types
//!
//! Both enums describe illegal-state conditions: they signal a programming
//! error in the pipeline, never a recoverable condition.

use anvil_model::DeclarationKey;

/// Overlay lifecycle violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    /// Read after [`crate::AnnotationOverlay::invalidate`]
    #[error("annotations overlay no longer valid")]
    Invalidated,
}

/// Transformation registry failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Write after [`crate::TransformationRegistry::freeze`]
    #[error("annotation transformations are frozen")]
    Frozen,

    /// Underlying overlay rejected the access
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// A recorded transformation has no matching overlay entry
    #[error("transformation recorded for {key} has no overlay entry")]
    KeyMismatch {
        /// Logged identity
        key: DeclarationKey,
    },

    /// Replaying the log does not reproduce the overlay contents
    #[error("replaying transformations of {key} diverges from the overlay")]
    ReplayDivergence {
        /// Diverging identity
        key: DeclarationKey,
    },
}

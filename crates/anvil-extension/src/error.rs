//! Callback configuration errors
//!
//! Raised while validating callback descriptors, before any callback runs.

use crate::phase::Phase;
use crate::role::ParameterRole;

/// Invalid callback declaration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Phase marker count other than one
    #[error("{extension}::{method} declares {count} phase markers; exactly one is required")]
    PhaseMarkers {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Markers found
        count: usize,
    },

    /// Callback is not public or is static
    #[error("{extension}::{method} must be public and non-static")]
    Modifiers {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
    },

    /// No invoker was attached
    #[error("{extension}::{method} has no invoker")]
    MissingInvoker {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
    },

    /// Parameter type not understood
    #[error("{extension}::{method} has parameter of unknown type {name}")]
    UnknownRole {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Declared parameter type
        name: String,
    },

    /// Parameter role not available in the callback's phase
    #[error("{extension}::{method} may not declare {role} in {phase}")]
    IllegalRole {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Offending role
        role: ParameterRole,
        /// Declared phase
        phase: Phase,
    },

    /// More than one query role
    #[error("{extension}::{method} declares {count} query parameters; at most one is allowed")]
    MultipleQueryRoles {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Query roles found
        count: usize,
    },

    /// Query role without constraints
    #[error("{extension}::{method} declares query parameter {role} without constraints")]
    MissingConstraint {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Query role
        role: ParameterRole,
    },

    /// Constraints without a query role
    #[error("{extension}::{method} declares constraints but no query parameter")]
    UnexpectedConstraint {
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
    },
}

impl ConfigurationError {
    /// Declaring extension
    #[must_use]
    pub fn extension(&self) -> &str {
        match self {
            Self::PhaseMarkers { extension, .. }
            | Self::Modifiers { extension, .. }
            | Self::MissingInvoker { extension, .. }
            | Self::UnknownRole { extension, .. }
            | Self::IllegalRole { extension, .. }
            | Self::MultipleQueryRoles { extension, .. }
            | Self::MissingConstraint { extension, .. }
            | Self::UnexpectedConstraint { extension, .. } => extension,
        }
    }

    /// Offending callback method
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::PhaseMarkers { method, .. }
            | Self::Modifiers { method, .. }
            | Self::MissingInvoker { method, .. }
            | Self::UnknownRole { method, .. }
            | Self::IllegalRole { method, .. }
            | Self::MultipleQueryRoles { method, .. }
            | Self::MissingConstraint { method, .. }
            | Self::UnexpectedConstraint { method, .. } => method,
        }
    }
}

//! Build error taxonomy
//!
//! [`BuildError`] composes the error enums of every pipeline crate:
//! - configuration errors abort before any callback runs
//! - metadata and lifecycle errors abort immediately
//! - reported messages fail the build once, at the end of their phase

use anvil_extension::api::Message;
use anvil_extension::{ConfigurationError, Phase};
use anvil_index::IndexError;
use anvil_literal::LiteralError;
use anvil_overlay::{OverlayError, TransformError};

/// Pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Phase requested out of order or twice
    #[error("phase {requested} cannot run now (expected {})", expected.map_or("none", Phase::label))]
    PhaseOrder {
        /// Phase that was requested
        requested: Phase,
        /// Phase that may run next, if any
        expected: Option<Phase>,
    },

    /// Invalid callback declaration
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Errors reported through messages during a phase
    #[error("{phase} reported {} problem(s): {}", messages.len(), join(messages))]
    Validation {
        /// Phase that reported them
        phase: Phase,
        /// Every failing message of the phase, in report order
        messages: Vec<Message>,
    },

    /// A callback body failed
    #[error("{extension}::{method} failed during {phase}: {source}")]
    Callback {
        /// Running phase
        phase: Phase,
        /// Declaring extension
        extension: String,
        /// Callback method
        method: String,
        /// Failure returned by the body
        source: anyhow::Error,
    },

    /// Synthetic components registered without required parts
    #[error("incomplete synthetic components: {}", problems.join("; "))]
    Synthetic {
        /// One line per incomplete registration
        problems: Vec<String>,
    },

    /// Transformation registry failure
    #[error("transformation error: {0}")]
    Transform(#[from] TransformError),

    /// Overlay lifecycle violation
    #[error("overlay error: {0}")]
    Overlay(#[from] OverlayError),

    /// Literal compilation failure
    #[error("literal error: {0}")]
    Literal(#[from] LiteralError),

    /// Index construction failure
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Deployment resolver failure
    #[error("deployment resolution failed after {phase}: {source}")]
    Deployment {
        /// Phase after which resolution ran
        phase: Phase,
        /// Resolver failure
        source: anyhow::Error,
    },

    /// Output sink or class generator failure
    #[error("cannot write {name}: {source}")]
    Output {
        /// Class or service entry being written
        name: String,
        /// Underlying failure
        source: anyhow::Error,
    },

    /// Malformed pipeline configuration
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] toml::de::Error),
}

fn join(messages: &[Message]) -> String {
    messages.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl BuildError {
    /// Check if the build was rejected before running any callback
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if the build failed on reported messages
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Phase the failure is attributed to, when there is one
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::PhaseOrder { requested, .. } => Some(*requested),
            Self::Validation { phase, .. } | Self::Callback { phase, .. } | Self::Deployment { phase, .. } => {
                Some(*phase)
            }
            Self::Synthetic { .. } => Some(Phase::Synthesis),
            Self::Configuration(error) => match error {
                ConfigurationError::IllegalRole { phase, .. } => Some(*phase),
                _ => None,
            },
            _ => None,
        }
    }

    /// Messages carried by a validation failure
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Validation { messages, .. } => messages,
            _ => &[],
        }
    }
}

//! Model error types

/// Errors raised while constructing model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Name is empty or has empty segments
    #[error("invalid type name: {name:?}")]
    InvalidTypeName {
        /// The rejected input
        name: String,
    },

    /// Primitive keyword not recognised
    #[error("unknown primitive type: {name}")]
    UnknownPrimitive {
        /// The rejected keyword
        name: String,
    },

    /// Array value mixes component kinds
    #[error("array of {expected} contains a {actual} element")]
    HeterogeneousArray {
        /// Declared component kind
        expected: String,
        /// Offending element kind
        actual: String,
    },
}

//! Index error types

use anvil_model::{FieldKey, MethodKey, TypeName};

/// Errors raised while building a [`crate::DeclarationIndex`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// Class indexed twice
    #[error("duplicate class: {name}")]
    DuplicateClass {
        /// Class name
        name: TypeName,
    },

    /// Method identity declared twice in one class
    #[error("duplicate method: {key}")]
    DuplicateMethod {
        /// Method identity
        key: MethodKey,
    },

    /// Field declared twice in one class
    #[error("duplicate field: {key}")]
    DuplicateField {
        /// Field identity
        key: FieldKey,
    },

    /// Name is empty or has empty segments
    #[error("invalid class name: {name:?}")]
    InvalidName {
        /// Offending name
        name: String,
    },
}

//! Literal compilation errors
//!
//! Every variant is fatal for the build: it indicates annotation metadata
//! that is inconsistent with the declaration index.

use anvil_model::TypeName;

/// Literal compiler failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    /// No explicit value and no declared default
    #[error("value is not set for {annotation}.{member}(); the annotation metadata is stale or inconsistent")]
    MissingValue {
        /// Annotation type
        annotation: TypeName,
        /// Member name
        member: String,
    },

    /// A nested annotation's type is not in the index
    #[error("class of nested annotation {annotation} missing")]
    MissingNestedAnnotationClass {
        /// Nested instance, rendered
        annotation: String,
    },

    /// The annotation type itself is not in the index
    #[error("annotation class not available: {annotation}")]
    MissingAnnotationClass {
        /// Annotation type
        annotation: TypeName,
    },

    /// Instance and class disagree on the annotation type
    #[error("annotation instance of {instance} does not match annotation class {class}")]
    AnnotationMismatch {
        /// Class passed in
        class: TypeName,
        /// Instance type
        instance: TypeName,
    },

    /// Value shape incompatible with the member's declared type
    #[error("unsupported value for {annotation}.{member}(): {value}")]
    UnsupportedValue {
        /// Annotation type
        annotation: TypeName,
        /// Member name
        member: String,
        /// Offending value, rendered
        value: String,
    },
}

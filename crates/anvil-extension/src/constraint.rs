//! Query constraints attached to callbacks

use anvil_model::TypeName;

/// Which declarations a query-role parameter matches
///
/// Several constraints on one callback union their matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The type itself
    ExactType {
        /// Matched type
        ty: TypeName,
        /// Required annotations, any of; empty means no requirement
        annotated_with: Vec<TypeName>,
    },
    /// Proper subtypes of the type
    SubtypesOf {
        /// Supertype
        ty: TypeName,
        /// Required annotations, any of; empty means no requirement
        annotated_with: Vec<TypeName>,
    },
}

impl Constraint {
    /// Match `ty` exactly
    #[must_use]
    pub fn exact(ty: impl Into<TypeName>) -> Self {
        Self::ExactType {
            ty: ty.into(),
            annotated_with: Vec::new(),
        }
    }

    /// Match proper subtypes of `ty`
    #[must_use]
    pub fn subtypes_of(ty: impl Into<TypeName>) -> Self {
        Self::SubtypesOf {
            ty: ty.into(),
            annotated_with: Vec::new(),
        }
    }

    /// Additionally require `annotation` (or any other listed one)
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Into<TypeName>) -> Self {
        match &mut self {
            Self::ExactType { annotated_with, .. } | Self::SubtypesOf { annotated_with, .. } => {
                annotated_with.push(annotation.into());
            }
        }
        self
    }

    /// Constrained type
    #[must_use]
    pub fn ty(&self) -> &TypeName {
        match self {
            Self::ExactType { ty, .. } | Self::SubtypesOf { ty, .. } => ty,
        }
    }

    /// Required annotations
    #[must_use]
    pub fn required_annotations(&self) -> &[TypeName] {
        match self {
            Self::ExactType { annotated_with, .. } | Self::SubtypesOf { annotated_with, .. } => annotated_with,
        }
    }
}

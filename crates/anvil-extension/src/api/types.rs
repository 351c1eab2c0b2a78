//! Type factory

use anvil_index::DeclarationIndex;
use anvil_model::{PrimitiveKind, Type, TypeName};
use std::sync::Arc;

/// Builds [`Type`]s for callbacks
#[derive(Debug, Clone)]
pub struct Types {
    index: Arc<DeclarationIndex>,
}

impl Types {
    /// Create factory over `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>) -> Self {
        Self { index }
    }

    /// Class type; the class need not be indexed
    #[must_use]
    pub fn of_class(&self, name: impl Into<TypeName>) -> Type {
        let name = name.into();
        if !self.index.contains_class(&name) {
            tracing::debug!(class = %name, "Type of unindexed class");
        }
        Type::class(name)
    }

    /// Primitive type
    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> Type {
        Type::primitive(kind)
    }

    /// Array of `component`
    #[must_use]
    pub fn array_of(&self, component: Type) -> Type {
        Type::array_of(component)
    }

    /// Generic type
    #[must_use]
    pub fn parameterized(&self, raw: impl Into<TypeName>, arguments: Vec<Type>) -> Type {
        Type::parameterized(raw, arguments)
    }

    /// `void`
    #[must_use]
    pub fn void(&self) -> Type {
        Type::Void
    }

    /// Whether `name` is in the index
    #[must_use]
    pub fn is_indexed(&self, name: &TypeName) -> bool {
        self.index.contains_class(name)
    }
}

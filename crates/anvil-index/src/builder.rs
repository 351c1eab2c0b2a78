//! Index construction and validation

use crate::error::IndexError;
use crate::index::DeclarationIndex;
use anvil_model::ClassInfo;
use std::collections::HashSet;

/// Collects classes and validates them into a [`DeclarationIndex`]
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    classes: Vec<ClassInfo>,
}

impl IndexBuilder {
    /// Create empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add class, returning self for chaining
    #[inline]
    #[must_use]
    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.push(class);
        self
    }

    /// Add class
    #[inline]
    pub fn add_class(&mut self, class: ClassInfo) -> &mut Self {
        self.classes.push(class);
        self
    }

    /// Number of collected classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no class was added
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Validate and build the index
    ///
    /// # Errors
    /// Returns error on invalid names or duplicate class, method or field
    /// identities
    pub fn build(self) -> Result<DeclarationIndex, IndexError> {
        let mut class_names = HashSet::new();
        for class in &self.classes {
            validate_class(class)?;
            if !class_names.insert(class.name().clone()) {
                return Err(IndexError::DuplicateClass {
                    name: class.name().clone(),
                });
            }
        }

        let count = self.classes.len();
        let index = DeclarationIndex::from_classes(self.classes);
        tracing::debug!(classes = count, "declaration index built");
        Ok(index)
    }
}

impl Extend<ClassInfo> for IndexBuilder {
    fn extend<T: IntoIterator<Item = ClassInfo>>(&mut self, iter: T) {
        self.classes.extend(iter);
    }
}

impl FromIterator<ClassInfo> for IndexBuilder {
    fn from_iter<T: IntoIterator<Item = ClassInfo>>(iter: T) -> Self {
        Self {
            classes: iter.into_iter().collect(),
        }
    }
}

fn validate_class(class: &ClassInfo) -> Result<(), IndexError> {
    if !class.name().is_valid() {
        return Err(IndexError::InvalidName {
            name: class.name().to_string(),
        });
    }

    let mut methods = HashSet::new();
    for method in class.methods() {
        if !methods.insert(method.key()) {
            return Err(IndexError::DuplicateMethod {
                key: method.key().clone(),
            });
        }
    }

    let mut fields = HashSet::new();
    for field in class.fields() {
        if !fields.insert(field.key()) {
            return Err(IndexError::DuplicateField {
                key: field.key().clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_model::{FieldInfo, MethodInfo, PrimitiveKind, Type};

    #[test]
    fn builder_rejects_duplicate_class() {
        let result = IndexBuilder::new()
            .with_class(ClassInfo::builder("com.acme.A").build())
            .with_class(ClassInfo::builder("com.acme.A").build())
            .build();
        assert!(matches!(result, Err(IndexError::DuplicateClass { .. })));
    }

    #[test]
    fn builder_rejects_duplicate_method_identity() {
        let class = ClassInfo::builder("com.acme.A")
            .method(MethodInfo::builder("run").parameter(PrimitiveKind::Int))
            .method(
                MethodInfo::builder("run")
                    .parameter(PrimitiveKind::Int)
                    .returns(Type::class("java.lang.String")),
            )
            .build();
        let result = IndexBuilder::new().with_class(class).build();
        assert!(matches!(result, Err(IndexError::DuplicateMethod { .. })));
    }

    #[test]
    fn builder_accepts_overloads() {
        let class = ClassInfo::builder("com.acme.A")
            .method(MethodInfo::builder("run"))
            .method(MethodInfo::builder("run").parameter(PrimitiveKind::Int))
            .build();
        let index = IndexBuilder::new().with_class(class).build().unwrap();
        assert_eq!(index.methods().count(), 2);
    }

    #[test]
    fn builder_rejects_duplicate_field() {
        let class = ClassInfo::builder("com.acme.A")
            .field(FieldInfo::builder("x", PrimitiveKind::Int))
            .field(FieldInfo::builder("x", PrimitiveKind::Long))
            .build();
        let result = IndexBuilder::new().with_class(class).build();
        assert!(matches!(result, Err(IndexError::DuplicateField { .. })));
    }

    #[test]
    fn builder_rejects_invalid_name() {
        let result = IndexBuilder::new()
            .with_class(ClassInfo::builder("com..A").build())
            .build();
        assert!(matches!(result, Err(IndexError::InvalidName { .. })));
    }

    #[test]
    fn builder_collects_from_iterator() {
        let builder: IndexBuilder = ["a.A", "a.B"]
            .into_iter()
            .map(|n| ClassInfo::builder(n).build())
            .collect();
        assert_eq!(builder.len(), 2);
    }
}

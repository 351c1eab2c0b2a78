//! Annotation instance factory

use anvil_index::DeclarationIndex;
use anvil_model::{AnnotationInstance, AnnotationValue, TypeName};
use std::sync::Arc;

/// Builds [`AnnotationInstance`]s for enhancement callbacks
#[derive(Debug, Clone)]
pub struct Annotations {
    index: Arc<DeclarationIndex>,
}

impl Annotations {
    /// Create factory resolving types against `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>) -> Self {
        Self { index }
    }

    /// Start building an instance of `annotation`
    ///
    /// Types missing from the index are accepted.
    #[must_use]
    pub fn create(&self, annotation: impl Into<TypeName>) -> AnnotationBuilder {
        let name = annotation.into();
        if !self.index.contains_class(&name) {
            tracing::debug!(annotation = %name, "Building annotation of unindexed type");
        }
        AnnotationBuilder {
            instance: AnnotationInstance::new(name),
        }
    }
}

/// Member-by-member annotation builder
#[derive(Debug, Clone)]
#[must_use]
pub struct AnnotationBuilder {
    instance: AnnotationInstance,
}

impl AnnotationBuilder {
    /// Set `member`
    pub fn member(mut self, member: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.instance = self.instance.with(member, value);
        self
    }

    /// Set `value`
    pub fn value(mut self, value: impl Into<AnnotationValue>) -> Self {
        self.instance = self.instance.with_value(value);
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> AnnotationInstance {
        self.instance
    }
}

impl From<AnnotationBuilder> for AnnotationInstance {
    fn from(builder: AnnotationBuilder) -> Self {
        builder.build()
    }
}

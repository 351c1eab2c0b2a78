//! Configurable declarations
//!
//! Every write goes through the [`TransformationRegistry`], so the overlay
//! and the recorded transformations stay in step.

use anvil_model::{AnnotationInstance, ClassInfo, DeclarationKey, FieldInfo, MethodInfo, ParameterInfo, TypeName};
use anvil_overlay::{AnnotationSet, AnnotationSource, OverlayError, TransformError, TransformationRegistry};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

macro_rules! annotation_access {
    () => {
        /// Current annotations
        ///
        /// # Errors
        ///
        /// Returns [`OverlayError::Invalidated`] once enhancement has ended.
        pub fn annotations(&self) -> Result<AnnotationSet, OverlayError> {
            self.registry.overlays().annotations(&self.key())
        }

        /// Check current annotations for `name`
        ///
        /// # Errors
        ///
        /// Returns [`OverlayError::Invalidated`] once enhancement has ended.
        pub fn has_annotation(&self, name: &TypeName) -> Result<bool, OverlayError> {
            self.registry.overlays().has_annotation(&self.key(), name)
        }

        /// Add or replace an annotation
        ///
        /// # Errors
        ///
        /// Returns [`TransformError::Frozen`] after enhancement.
        pub fn add_annotation(&self, annotation: AnnotationInstance) -> Result<(), TransformError> {
            self.registry.add_by_key(&self.key(), annotation)
        }

        /// Remove annotations matching `predicate`; true if anything changed
        ///
        /// # Errors
        ///
        /// Returns [`TransformError::Frozen`] after enhancement.
        pub fn remove_annotation<P>(&self, predicate: P) -> Result<bool, TransformError>
        where
            P: Fn(&AnnotationInstance) -> bool + Send + Sync + 'static,
        {
            self.registry.remove_by_key(&self.key(), Arc::new(predicate))
        }

        /// Remove every annotation; true if anything changed
        ///
        /// # Errors
        ///
        /// Returns [`TransformError::Frozen`] after enhancement.
        pub fn remove_all_annotations(&self) -> Result<bool, TransformError> {
            self.remove_annotation(|_| true)
        }
    };
}

/// A class whose annotations can be changed
#[derive(Clone)]
pub struct ClassConfig<'a> {
    registry: &'a TransformationRegistry,
    class: Arc<ClassInfo>,
}

impl<'a> ClassConfig<'a> {
    /// Wrap `class`
    #[must_use]
    pub fn new(registry: &'a TransformationRegistry, class: Arc<ClassInfo>) -> Self {
        Self { registry, class }
    }

    /// Underlying declaration
    #[inline]
    #[must_use]
    pub fn info(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    /// Declaration key
    #[must_use]
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey::Class(self.class.key())
    }

    annotation_access!();

    /// Declared methods, constructors included
    #[must_use]
    pub fn methods(&self) -> Vec<MethodConfig<'a>> {
        self.class
            .methods()
            .iter()
            .map(|method| MethodConfig::new(self.registry, Arc::clone(method)))
            .collect()
    }

    /// Declared fields
    #[must_use]
    pub fn fields(&self) -> Vec<FieldConfig<'a>> {
        self.class
            .fields()
            .iter()
            .map(|field| FieldConfig::new(self.registry, Arc::clone(field)))
            .collect()
    }
}

/// A method or constructor whose annotations can be changed
#[derive(Clone)]
pub struct MethodConfig<'a> {
    registry: &'a TransformationRegistry,
    method: Arc<MethodInfo>,
}

impl<'a> MethodConfig<'a> {
    /// Wrap `method`
    #[must_use]
    pub fn new(registry: &'a TransformationRegistry, method: Arc<MethodInfo>) -> Self {
        Self { registry, method }
    }

    /// Underlying declaration
    #[inline]
    #[must_use]
    pub fn info(&self) -> &Arc<MethodInfo> {
        &self.method
    }

    /// Declaration key
    #[must_use]
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey::Method(self.method.key().clone())
    }

    annotation_access!();

    /// Parameters in declaration order
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterConfig<'a>> {
        (0..self.method.parameters().len())
            .map(|position| ParameterConfig {
                registry: self.registry,
                method: Arc::clone(&self.method),
                position,
            })
            .collect()
    }
}

/// A field whose annotations can be changed
#[derive(Clone)]
pub struct FieldConfig<'a> {
    registry: &'a TransformationRegistry,
    field: Arc<FieldInfo>,
}

impl<'a> FieldConfig<'a> {
    /// Wrap `field`
    #[must_use]
    pub fn new(registry: &'a TransformationRegistry, field: Arc<FieldInfo>) -> Self {
        Self { registry, field }
    }

    /// Underlying declaration
    #[inline]
    #[must_use]
    pub fn info(&self) -> &Arc<FieldInfo> {
        &self.field
    }

    /// Declaration key
    #[must_use]
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey::Field(self.field.key().clone())
    }

    annotation_access!();
}

/// A method parameter whose annotations can be changed
#[derive(Clone)]
pub struct ParameterConfig<'a> {
    registry: &'a TransformationRegistry,
    method: Arc<MethodInfo>,
    position: usize,
}

impl ParameterConfig<'_> {
    /// Underlying declaration
    #[must_use]
    pub fn info(&self) -> &ParameterInfo {
        &self.method.parameters()[self.position]
    }

    /// Declaring method
    #[must_use]
    pub fn method(&self) -> &Arc<MethodInfo> {
        &self.method
    }

    /// Declaration key
    #[must_use]
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey::Parameter(self.info().key().clone())
    }

    annotation_access!();
}

impl Debug for ClassConfig<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassConfig").field(&self.class.key()).finish()
    }
}

impl Debug for MethodConfig<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodConfig").field(self.method.key()).finish()
    }
}

impl Debug for FieldConfig<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldConfig").field(self.field.key()).finish()
    }
}

impl Debug for ParameterConfig<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParameterConfig").field(self.info().key()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_index::IndexBuilder;
    use anvil_model::{MethodBuilder, PrimitiveKind, Type};
    use anvil_overlay::AnnotationOverlays;

    fn registry() -> TransformationRegistry {
        let index = IndexBuilder::new()
            .with_class(
                ClassInfo::builder("c.Service")
                    .annotate(AnnotationInstance::new("c.Old"))
                    .method(
                        MethodBuilder::new("run")
                            .annotated_parameter(Type::primitive(PrimitiveKind::Int), "count", vec![AnnotationInstance::new("c.P")]),
                    )
                    .build(),
            )
            .build()
            .unwrap();
        TransformationRegistry::new(Arc::new(AnnotationOverlays::new(Arc::new(index))))
    }

    #[test]
    fn class_config_writes_through_registry() {
        let registry = registry();
        let class = Arc::clone(registry.overlays().shared_index().class(&TypeName::new("c.Service")).unwrap());
        let config = ClassConfig::new(&registry, class);

        config.add_annotation(AnnotationInstance::new("c.New")).unwrap();
        assert!(config.remove_annotation(|a| a.name().as_str() == "c.Old").unwrap());
        let names: Vec<_> = config.annotations().unwrap().names().map(|n| n.as_str().to_owned()).collect();
        assert_eq!(names, vec!["c.New"]);
        assert_eq!(registry.transformations(&config.key()).len(), 2);
    }

    #[test]
    fn parameter_configs_address_parameters() {
        let registry = registry();
        let class = Arc::clone(registry.overlays().shared_index().class(&TypeName::new("c.Service")).unwrap());
        let config = ClassConfig::new(&registry, class);
        let method = config.methods().remove(0);
        let parameter = method.parameters().remove(0);

        assert!(parameter.has_annotation(&TypeName::new("c.P")).unwrap());
        assert!(parameter.remove_all_annotations().unwrap());
        assert!(parameter.annotations().unwrap().is_empty());
        assert!(!registry.transformations(&method.key()).is_empty());
    }
}

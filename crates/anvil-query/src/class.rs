//! Class queries

use crate::filter::{annotated, retain_annotated, widen, QueryStream};
use crate::scope::QueryScope;
use anvil_model::{ClassInfo, DeclarationKey, TypeName};
use anvil_overlay::OverlayError;
use indexmap::IndexSet;
use std::iter;
use std::sync::Arc;

/// Additive class filter
///
/// `exactly`, `subtype_of` and `supertype_of` widen one class family;
/// `annotated_with` widens the annotation family. Families intersect.
#[derive(Debug, Clone)]
pub struct ClassQuery<'a> {
    scope: QueryScope<'a>,
    classes: Option<IndexSet<TypeName>>,
    annotations: Option<IndexSet<TypeName>>,
}

impl<'a> ClassQuery<'a> {
    pub(crate) fn new(scope: QueryScope<'a>) -> Self {
        Self {
            scope,
            classes: None,
            annotations: None,
        }
    }

    /// Include `name` itself
    #[must_use]
    pub fn exactly(mut self, name: impl Into<TypeName>) -> Self {
        widen(&mut self.classes, name.into());
        self
    }

    /// Include every known subtype of `name`, excluding `name`
    #[must_use]
    pub fn subtype_of(mut self, name: impl Into<TypeName>) -> Self {
        let subtypes = self.scope.index().all_subtypes(&name.into());
        self.classes.get_or_insert_with(IndexSet::new).extend(subtypes);
        self
    }

    /// Include every known supertype of `name`, excluding `name`
    #[must_use]
    pub fn supertype_of(mut self, name: impl Into<TypeName>) -> Self {
        let supertypes = self.scope.index().all_supertypes(&name.into());
        self.classes.get_or_insert_with(IndexSet::new).extend(supertypes);
        self
    }

    /// Include classes currently annotated with `annotation`
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Into<TypeName>) -> Self {
        widen(&mut self.annotations, annotation.into());
        self
    }

    /// Evaluate lazily
    #[must_use]
    pub fn stream(&self) -> QueryStream<'a, ClassInfo> {
        let index = self.scope.index();
        let source = self.scope.source();

        if let Some(classes) = self.classes.clone() {
            let candidates = classes
                .into_iter()
                .filter_map(move |name| index.class(&name).cloned())
                .map(Ok);
            return Box::new(retain_annotated(source, self.annotations.clone(), candidates, class_key));
        }

        if let Some(annotations) = &self.annotations {
            return match annotated(source, annotations) {
                Ok(keys) => Box::new(keys.into_iter().filter_map(move |key| match key {
                    DeclarationKey::Class(class) => index.class(class.name()).cloned().map(Ok),
                    _ => None,
                })),
                Err(err) => Box::new(iter::once(Err(err))),
            };
        }

        Box::new(index.classes().cloned().map(Ok))
    }

    /// Evaluate into a vector
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] if the annotation source is no
    /// longer readable.
    pub fn find(&self) -> Result<Vec<Arc<ClassInfo>>, OverlayError> {
        self.stream().collect()
    }
}

fn class_key(class: &Arc<ClassInfo>) -> DeclarationKey {
    DeclarationKey::Class(class.key())
}

#[cfg(test)]
mod tests {
    use crate::testing::{frozen, registry, sorted_names};
    use crate::QueryScope;
    use anvil_model::{AnnotationInstance, ClassKey};
    use pretty_assertions::assert_eq;

    #[test]
    fn class_query_without_families_scans_everything() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        assert_eq!(scope.classes().find().unwrap().len(), scope.index().len());
    }

    #[test]
    fn class_query_subtype_is_not_reflexive() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        let found = scope.classes().subtype_of("q.Animal").find().unwrap();
        assert_eq!(sorted_names(&found), vec!["q.Cat", "q.Dog"]);

        let found = scope.classes().subtype_of("q.Animal").exactly("q.Animal").find().unwrap();
        assert_eq!(sorted_names(&found), vec!["q.Animal", "q.Cat", "q.Dog"]);
    }

    #[test]
    fn class_query_supertype_is_not_reflexive() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        let found = scope.classes().supertype_of("q.Dog").find().unwrap();
        assert_eq!(sorted_names(&found), vec!["q.Animal"]);
    }

    #[test]
    fn class_query_families_intersect() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        let found = scope
            .classes()
            .subtype_of("q.Animal")
            .annotated_with("q.Loud")
            .find()
            .unwrap();
        assert_eq!(sorted_names(&found), vec!["q.Dog"]);
    }

    #[test]
    fn class_query_sees_transformed_annotations() {
        let registry = registry();
        registry
            .add_by_key(&ClassKey::new("q.Cat").into(), AnnotationInstance::new("q.Loud"))
            .unwrap();
        registry
            .remove_by_key(&ClassKey::new("q.Dog").into(), std::sync::Arc::new(|_: &AnnotationInstance| true))
            .unwrap();
        let scope = QueryScope::new(registry.overlays().as_ref());
        let found = scope.classes().annotated_with("q.Loud").find().unwrap();
        assert_eq!(sorted_names(&found), vec!["q.Cat"]);
    }

    #[test]
    fn class_query_fails_after_invalidation() {
        let registry = registry();
        registry.overlays().invalidate();
        let scope = QueryScope::new(registry.overlays().as_ref());
        assert!(scope.classes().annotated_with("q.Loud").find().is_err());
    }
}

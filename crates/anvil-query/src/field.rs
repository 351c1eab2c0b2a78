//! Field queries

use crate::class::ClassQuery;
use crate::filter::{annotated, retain_annotated, widen, QueryStream};
use crate::scope::QueryScope;
use anvil_model::{ClassInfo, DeclarationKey, FieldInfo, Type, TypeName};
use anvil_overlay::OverlayError;
use indexmap::IndexSet;
use std::collections::HashSet;
use std::iter;
use std::sync::Arc;

/// Additive field filter
#[derive(Debug, Clone)]
pub struct FieldQuery<'a> {
    scope: QueryScope<'a>,
    declared_on: Option<Vec<ClassQuery<'a>>>,
    types: Option<IndexSet<Type>>,
    annotations: Option<IndexSet<TypeName>>,
}

impl<'a> FieldQuery<'a> {
    pub(crate) fn new(scope: QueryScope<'a>) -> Self {
        Self {
            scope,
            declared_on: None,
            types: None,
            annotations: None,
        }
    }

    /// Fields declared on any class matched by `classes`
    #[must_use]
    pub fn declared_on(mut self, classes: ClassQuery<'a>) -> Self {
        self.declared_on.get_or_insert_with(Vec::new).push(classes);
        self
    }

    /// Fields of type `ty`
    #[must_use]
    pub fn of_type(mut self, ty: impl Into<Type>) -> Self {
        widen(&mut self.types, ty.into());
        self
    }

    /// Fields currently annotated with `annotation`
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Into<TypeName>) -> Self {
        widen(&mut self.annotations, annotation.into());
        self
    }

    /// Evaluate lazily
    #[must_use]
    pub fn stream(&self) -> QueryStream<'a, FieldInfo> {
        let index = self.scope.index();
        let source = self.scope.source();
        let types = self.types.clone();
        let matches = move |field: &Arc<FieldInfo>| types.as_ref().map_or(true, |types| types.contains(field.ty()));

        if let Some(sites) = self.declared_on.clone() {
            let mut seen = HashSet::new();
            let candidates = sites
                .into_iter()
                .flat_map(|query| query.stream())
                .filter(move |class| match class {
                    Ok(class) => seen.insert(class.name().clone()),
                    Err(_) => true,
                })
                .flat_map(members_of)
                .filter(move |field| field.as_ref().map_or(true, |f| matches(f)));
            return Box::new(retain_annotated(source, self.annotations.clone(), candidates, field_key));
        }

        if let Some(annotations) = &self.annotations {
            return match annotated(source, annotations) {
                Ok(keys) => Box::new(
                    keys.into_iter()
                        .filter_map(move |key| match key {
                            DeclarationKey::Field(field) => index.field(&field).cloned(),
                            _ => None,
                        })
                        .filter(move |field| matches(field))
                        .map(Ok),
                ),
                Err(err) => Box::new(iter::once(Err(err))),
            };
        }

        Box::new(
            index
                .classes()
                .flat_map(|class| class.fields().iter().cloned())
                .filter(move |field| matches(field))
                .map(Ok),
        )
    }

    /// Evaluate into a vector
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] if the annotation source is no
    /// longer readable.
    pub fn find(&self) -> Result<Vec<Arc<FieldInfo>>, OverlayError> {
        self.stream().collect()
    }
}

fn members_of(class: Result<Arc<ClassInfo>, OverlayError>) -> Vec<Result<Arc<FieldInfo>, OverlayError>> {
    match class {
        Ok(class) => class.fields().iter().cloned().map(Ok).collect(),
        Err(err) => vec![Err(err)],
    }
}

fn field_key(field: &Arc<FieldInfo>) -> DeclarationKey {
    DeclarationKey::Field(field.key().clone())
}

#[cfg(test)]
mod tests {
    use crate::testing::frozen;
    use crate::QueryScope;
    use anvil_model::{PrimitiveKind, Type};
    use pretty_assertions::assert_eq;

    fn field_names(fields: &[std::sync::Arc<anvil_model::FieldInfo>]) -> Vec<String> {
        let mut out: Vec<_> = fields.iter().map(|f| f.key().to_string()).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn field_query_of_type_unions() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        let found = scope
            .fields()
            .of_type(Type::primitive(PrimitiveKind::Int))
            .of_type(Type::class("q.Animal"))
            .find()
            .unwrap();
        assert_eq!(field_names(&found), vec!["q.Dog#age", "q.Owner#pet"]);
    }

    #[test]
    fn field_query_annotation_and_site_intersect() {
        let frozen = frozen();
        let scope = QueryScope::new(&frozen);
        let found = scope
            .fields()
            .declared_on(scope.classes().exactly("q.Owner"))
            .annotated_with("q.Tracked")
            .find()
            .unwrap();
        assert!(found.is_empty());

        let found = scope.fields().annotated_with("q.Tracked").find().unwrap();
        assert_eq!(field_names(&found), vec!["q.Dog#age"]);
    }
}

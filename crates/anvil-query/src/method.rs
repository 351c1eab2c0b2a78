//! Method and constructor queries

use crate::class::ClassQuery;
use crate::filter::{annotated, retain_annotated, widen, QueryStream};
use crate::scope::QueryScope;
use anvil_model::{ClassInfo, DeclarationKey, MethodInfo, Type, TypeName};
use anvil_overlay::OverlayError;
use indexmap::IndexSet;
use std::collections::HashSet;
use std::iter;
use std::sync::Arc;

/// Which methods a query ranges over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Regular methods; constructors and static initializers are excluded
    Method,
    /// Constructors only
    Constructor,
}

impl MethodKind {
    fn accepts(self, method: &MethodInfo) -> bool {
        match self {
            Self::Method => method.is_regular(),
            Self::Constructor => method.is_constructor(),
        }
    }
}

/// Additive method filter
#[derive(Debug, Clone)]
pub struct MethodQuery<'a> {
    scope: QueryScope<'a>,
    kind: MethodKind,
    declared_on: Option<Vec<ClassQuery<'a>>>,
    return_types: Option<IndexSet<Type>>,
    annotations: Option<IndexSet<TypeName>>,
}

impl<'a> MethodQuery<'a> {
    pub(crate) fn new(scope: QueryScope<'a>, kind: MethodKind) -> Self {
        Self {
            scope,
            kind,
            declared_on: None,
            return_types: None,
            annotations: None,
        }
    }

    /// Methods declared on any class matched by `classes`
    #[must_use]
    pub fn declared_on(mut self, classes: ClassQuery<'a>) -> Self {
        self.declared_on.get_or_insert_with(Vec::new).push(classes);
        self
    }

    /// Methods returning `ty`
    #[must_use]
    pub fn with_return_type(mut self, ty: impl Into<Type>) -> Self {
        widen(&mut self.return_types, ty.into());
        self
    }

    /// Methods currently annotated with `annotation`
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Into<TypeName>) -> Self {
        widen(&mut self.annotations, annotation.into());
        self
    }

    /// Evaluate lazily
    #[must_use]
    pub fn stream(&self) -> QueryStream<'a, MethodInfo> {
        let index = self.scope.index();
        let source = self.scope.source();
        let kind = self.kind;
        let return_types = self.return_types.clone();
        let matches = move |method: &Arc<MethodInfo>| {
            kind.accepts(method)
                && return_types
                    .as_ref()
                    .map_or(true, |types| types.contains(method.return_type()))
        };

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
                .filter(move |method| method.as_ref().map_or(true, |m| matches(m)));
            return Box::new(retain_annotated(source, self.annotations.clone(), candidates, method_key));
        }

        if let Some(annotations) = &self.annotations {
            return match annotated(source, annotations) {
                Ok(keys) => Box::new(
                    keys.into_iter()
                        .filter_map(move |key| match key {
                            DeclarationKey::Method(method) => index.method(&method).cloned(),
                            _ => None,
                        })
                        .filter(move |method| matches(method))
                        .map(Ok),
                ),
                Err(err) => Box::new(iter::once(Err(err))),
            };
        }

        Box::new(
            index
                .classes()
                .flat_map(|class| class.methods().iter().cloned())
                .filter(move |method| matches(method))
                .map(Ok),
        )
    }

    /// Evaluate into a vector
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] if the annotation source is no
    /// longer readable.
    pub fn find(&self) -> Result<Vec<Arc<MethodInfo>>, OverlayError> {
        self.stream().collect()
    }
}

fn members_of(class: Result<Arc<ClassInfo>, OverlayError>) -> Vec<Result<Arc<MethodInfo>, OverlayError>> {
    match class {
        Ok(class) => class.methods().iter().cloned().map(Ok).collect(),
        Err(err) => vec![Err(err)],
    }
}

fn method_key(method: &Arc<MethodInfo>) -> DeclarationKey {
    DeclarationKey::Method(method.key().clone())
}

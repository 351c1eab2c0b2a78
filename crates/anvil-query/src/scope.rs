//! Entry points binding queries to an annotation source

use crate::class::ClassQuery;
use crate::field::FieldQuery;
use crate::method::{MethodKind, MethodQuery};
use anvil_index::DeclarationIndex;
use anvil_overlay::AnnotationSource;
use std::fmt::{self, Debug, Formatter};

/// Declarations of one index, seen through one annotation source
#[derive(Clone, Copy)]
pub struct QueryScope<'a> {
    source: &'a dyn AnnotationSource,
}

impl<'a> QueryScope<'a> {
    /// Create scope over `source`
    #[inline]
    #[must_use]
    pub fn new(source: &'a dyn AnnotationSource) -> Self {
        Self { source }
    }

    /// Underlying index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &'a DeclarationIndex {
        self.source.index()
    }

    /// Annotation source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &'a dyn AnnotationSource {
        self.source
    }

    /// Query classes
    #[must_use]
    pub fn classes(&self) -> ClassQuery<'a> {
        ClassQuery::new(*self)
    }

    /// Query regular methods
    #[must_use]
    pub fn methods(&self) -> MethodQuery<'a> {
        MethodQuery::new(*self, MethodKind::Method)
    }

    /// Query constructors
    #[must_use]
    pub fn constructors(&self) -> MethodQuery<'a> {
        MethodQuery::new(*self, MethodKind::Constructor)
    }

    /// Query fields
    #[must_use]
    pub fn fields(&self) -> FieldQuery<'a> {
        FieldQuery::new(*self)
    }
}

impl Debug for QueryScope<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryScope")
            .field("classes", &self.index().len())
            .finish_non_exhaustive()
    }
}

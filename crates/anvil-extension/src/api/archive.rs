//! Archive-wide queries

use super::config::{ClassConfig, FieldConfig, MethodConfig};
use anvil_overlay::{OverlayError, TransformationRegistry};
use anvil_query::{ClassQuery, FieldQuery, MethodQuery, QueryScope};

/// Queries over every declaration in the archive
#[derive(Debug, Clone, Copy)]
pub struct AppArchive<'a> {
    scope: QueryScope<'a>,
}

impl<'a> AppArchive<'a> {
    /// Archive over `scope`
    #[must_use]
    pub fn new(scope: QueryScope<'a>) -> Self {
        Self { scope }
    }

    /// Class query
    #[must_use]
    pub fn classes(&self) -> ClassQuery<'a> {
        self.scope.classes()
    }

    /// Method query (constructors excluded)
    #[must_use]
    pub fn methods(&self) -> MethodQuery<'a> {
        self.scope.methods()
    }

    /// Constructor query
    #[must_use]
    pub fn constructors(&self) -> MethodQuery<'a> {
        self.scope.constructors()
    }

    /// Field query
    #[must_use]
    pub fn fields(&self) -> FieldQuery<'a> {
        self.scope.fields()
    }
}

/// Archive queries yielding configurable declarations
#[derive(Debug, Clone, Copy)]
pub struct AppArchiveConfig<'a> {
    scope: QueryScope<'a>,
    registry: &'a TransformationRegistry,
}

impl<'a> AppArchiveConfig<'a> {
    /// Config view over `registry`; queries read its live overlays
    #[must_use]
    pub fn new(registry: &'a TransformationRegistry) -> Self {
        Self {
            scope: QueryScope::new(&**registry.overlays()),
            registry,
        }
    }

    /// Read-only view of the same archive
    #[must_use]
    pub fn archive(&self) -> AppArchive<'a> {
        AppArchive::new(self.scope)
    }

    /// Class query to pass to [`Self::configure_classes`]
    #[must_use]
    pub fn classes(&self) -> ClassQuery<'a> {
        self.scope.classes()
    }

    /// Method query to pass to [`Self::configure_methods`]
    #[must_use]
    pub fn methods(&self) -> MethodQuery<'a> {
        self.scope.methods()
    }

    /// Constructor query to pass to [`Self::configure_methods`]
    #[must_use]
    pub fn constructors(&self) -> MethodQuery<'a> {
        self.scope.constructors()
    }

    /// Field query to pass to [`Self::configure_fields`]
    #[must_use]
    pub fn fields(&self) -> FieldQuery<'a> {
        self.scope.fields()
    }

    /// Configs of every class matched by `query`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] once enhancement has ended.
    pub fn configure_classes(&self, query: &ClassQuery<'a>) -> Result<Vec<ClassConfig<'a>>, OverlayError> {
        query
            .stream()
            .map(|class| class.map(|class| ClassConfig::new(self.registry, class)))
            .collect()
    }

    /// Configs of every method matched by `query`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] once enhancement has ended.
    pub fn configure_methods(&self, query: &MethodQuery<'a>) -> Result<Vec<MethodConfig<'a>>, OverlayError> {
        query
            .stream()
            .map(|method| method.map(|method| MethodConfig::new(self.registry, method)))
            .collect()
    }

    /// Configs of every field matched by `query`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] once enhancement has ended.
    pub fn configure_fields(&self, query: &FieldQuery<'a>) -> Result<Vec<FieldConfig<'a>>, OverlayError> {
        query
            .stream()
            .map(|field| field.map(|field| FieldConfig::new(self.registry, field)))
            .collect()
    }
}

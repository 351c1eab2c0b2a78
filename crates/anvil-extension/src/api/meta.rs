//! Meta-annotation registration during discovery

use super::config::ClassConfig;
use anvil_model::TypeName;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::{self, Debug, Formatter};

/// Deferred configuration of a registered annotation type
pub type Configure = Box<dyn FnOnce(&ClassConfig<'_>) -> anyhow::Result<()> + Send>;

/// Role given to a registered annotation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKind {
    /// Qualifier
    Qualifier,
    /// Interceptor binding
    InterceptorBinding,
    /// Stereotype
    Stereotype,
}

/// Custom scope registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextDescriptor {
    /// Scope annotation
    pub scope: TypeName,
    /// Context implementation class
    pub implementation: TypeName,
    /// Normal (proxied) scope
    pub normal_scoped: bool,
}

struct Registration {
    kind: MetaKind,
    annotation: TypeName,
    configure: Option<Configure>,
}

/// Qualifiers, interceptor bindings, stereotypes and contexts added by extensions
///
/// `configure` closures run against the annotation type's [`ClassConfig`]
/// at the start of enhancement, before any enhancement callback.
#[derive(Default)]
pub struct MetaAnnotations {
    registrations: Mutex<Vec<Registration>>,
    contexts: Mutex<Vec<ContextDescriptor>>,
}

impl MetaAnnotations {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `annotation` a qualifier
    pub fn add_qualifier<F>(&self, annotation: impl Into<TypeName>, configure: F)
    where
        F: FnOnce(&ClassConfig<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(MetaKind::Qualifier, annotation.into(), Box::new(configure));
    }

    /// Make `annotation` an interceptor binding
    pub fn add_interceptor_binding<F>(&self, annotation: impl Into<TypeName>, configure: F)
    where
        F: FnOnce(&ClassConfig<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(MetaKind::InterceptorBinding, annotation.into(), Box::new(configure));
    }

    /// Make `annotation` a stereotype
    pub fn add_stereotype<F>(&self, annotation: impl Into<TypeName>, configure: F)
    where
        F: FnOnce(&ClassConfig<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(MetaKind::Stereotype, annotation.into(), Box::new(configure));
    }

    /// Register a custom scope implemented by `implementation`
    pub fn add_context(&self, scope: impl Into<TypeName>, implementation: impl Into<TypeName>, normal_scoped: bool) {
        let context = ContextDescriptor {
            scope: scope.into(),
            implementation: implementation.into(),
            normal_scoped,
        };
        tracing::debug!(scope = %context.scope, implementation = %context.implementation, "Context registered");
        self.contexts.lock().push(context);
    }

    fn register(&self, kind: MetaKind, annotation: TypeName, configure: Configure) {
        tracing::debug!(annotation = %annotation, ?kind, "Meta-annotation registered");
        self.registrations.lock().push(Registration {
            kind,
            annotation,
            configure: Some(configure),
        });
    }

    /// Registered annotation types with their roles
    #[must_use]
    pub fn registered(&self) -> Vec<(MetaKind, TypeName)> {
        self.registrations
            .lock()
            .iter()
            .map(|r| (r.kind, r.annotation.clone()))
            .collect()
    }

    /// Registered annotation types of `kind`
    #[must_use]
    pub fn of_kind(&self, kind: MetaKind) -> Vec<TypeName> {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.annotation.clone())
            .collect()
    }

    /// Registered contexts
    #[must_use]
    pub fn contexts(&self) -> Vec<ContextDescriptor> {
        self.contexts.lock().clone()
    }

    /// Take pending `configure` closures, in registration order
    ///
    /// Each closure is returned once.
    #[must_use]
    pub fn take_configurators(&self) -> Vec<(MetaKind, TypeName, Configure)> {
        self.registrations
            .lock()
            .iter_mut()
            .filter_map(|r| r.configure.take().map(|configure| (r.kind, r.annotation.clone(), configure)))
            .collect()
    }
}

impl Debug for MetaAnnotations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaAnnotations")
            .field("registered", &self.registered())
            .field("contexts", &self.contexts())
            .finish()
    }
}

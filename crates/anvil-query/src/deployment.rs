//! Bean and observer queries over a resolved deployment

use crate::filter::widen;
use anvil_model::{BeanInfo, Deployment, ObserverInfo, Type, TypeName};
use indexmap::IndexSet;
use std::sync::Arc;

/// Entry point for deployment queries
#[derive(Debug, Clone, Copy)]
pub struct DeploymentScope<'a> {
    deployment: &'a Deployment,
}

impl<'a> DeploymentScope<'a> {
    /// Create scope over `deployment`
    #[inline]
    #[must_use]
    pub fn new(deployment: &'a Deployment) -> Self {
        Self { deployment }
    }

    /// Query beans
    #[must_use]
    pub fn beans(&self) -> BeanQuery<'a> {
        BeanQuery {
            beans: self.deployment.beans(),
            scopes: None,
            types: None,
            qualifiers: None,
            declaring_classes: None,
        }
    }

    /// Query observers
    #[must_use]
    pub fn observers(&self) -> ObserverQuery<'a> {
        ObserverQuery {
            observers: self.deployment.observers(),
            observed_types: None,
            qualifiers: None,
            declaring_classes: None,
        }
    }
}

fn admits(family: Option<&IndexSet<TypeName>>, name: &TypeName) -> bool {
    family.map_or(true, |names| names.contains(name))
}

fn admits_any<'n>(family: Option<&IndexSet<TypeName>>, mut names: impl Iterator<Item = &'n TypeName>) -> bool {
    family.map_or(true, |wanted| names.any(|name| wanted.contains(name)))
}

/// Additive bean filter
///
/// Bean types match by erased name; qualifiers match by annotation type.
#[derive(Debug, Clone)]
pub struct BeanQuery<'a> {
    beans: &'a [Arc<BeanInfo>],
    scopes: Option<IndexSet<TypeName>>,
    types: Option<IndexSet<TypeName>>,
    qualifiers: Option<IndexSet<TypeName>>,
    declaring_classes: Option<IndexSet<TypeName>>,
}

impl<'a> BeanQuery<'a> {
    /// Beans with scope annotation `scope`
    #[must_use]
    pub fn scope(mut self, scope: impl Into<TypeName>) -> Self {
        widen(&mut self.scopes, scope.into());
        self
    }

    /// Beans having `ty` among their bean types
    #[must_use]
    pub fn bean_type(mut self, ty: impl Into<Type>) -> Self {
        widen(&mut self.types, ty.into().name());
        self
    }

    /// Beans carrying qualifier `qualifier`
    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<TypeName>) -> Self {
        widen(&mut self.qualifiers, qualifier.into());
        self
    }

    /// Beans declared by `class`
    #[must_use]
    pub fn declaring_class(mut self, class: impl Into<TypeName>) -> Self {
        widen(&mut self.declaring_classes, class.into());
        self
    }

    /// Evaluate lazily
    pub fn stream(&self) -> impl Iterator<Item = Arc<BeanInfo>> + '_ {
        self.beans
            .iter()
            .filter(|bean| {
                admits(self.scopes.as_ref(), &bean.scope)
                    && self
                        .types
                        .as_ref()
                        .map_or(true, |wanted| bean.types.iter().any(|ty| wanted.contains(&ty.name())))
                    && admits_any(self.qualifiers.as_ref(), bean.qualifiers.iter().map(|q| q.name()))
                    && admits(self.declaring_classes.as_ref(), &bean.declaring_class)
            })
            .cloned()
    }

    /// Evaluate into a vector
    #[must_use]
    pub fn find(&self) -> Vec<Arc<BeanInfo>> {
        self.stream().collect()
    }

    /// Check whether nothing matches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stream().next().is_none()
    }
}

/// Additive observer filter
#[derive(Debug, Clone)]
pub struct ObserverQuery<'a> {
    observers: &'a [Arc<ObserverInfo>],
    observed_types: Option<IndexSet<TypeName>>,
    qualifiers: Option<IndexSet<TypeName>>,
    declaring_classes: Option<IndexSet<TypeName>>,
}

impl<'a> ObserverQuery<'a> {
    /// Observers of event type `ty`, by erased name
    #[must_use]
    pub fn observed_type(mut self, ty: impl Into<Type>) -> Self {
        widen(&mut self.observed_types, ty.into().name());
        self
    }

    /// Observers carrying qualifier `qualifier`
    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<TypeName>) -> Self {
        widen(&mut self.qualifiers, qualifier.into());
        self
    }

    /// Observers declared by `class`
    #[must_use]
    pub fn declaring_class(mut self, class: impl Into<TypeName>) -> Self {
        widen(&mut self.declaring_classes, class.into());
        self
    }

    /// Evaluate lazily
    pub fn stream(&self) -> impl Iterator<Item = Arc<ObserverInfo>> + '_ {
        self.observers
            .iter()
            .filter(|observer| {
                admits(self.observed_types.as_ref(), &observer.observed_type.name())
                    && admits_any(self.qualifiers.as_ref(), observer.qualifiers.iter().map(|q| q.name()))
                    && admits(self.declaring_classes.as_ref(), &observer.declaring_class)
            })
            .cloned()
    }

    /// Evaluate into a vector
    #[must_use]
    pub fn find(&self) -> Vec<Arc<ObserverInfo>> {
        self.stream().collect()
    }

    /// Check whether nothing matches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stream().next().is_none()
    }
}

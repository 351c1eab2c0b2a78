//! Descriptor class listing the synthetic components of one build

use crate::outcome::BuildId;
use anvil_extension::api::{ContextDescriptor, SyntheticBean, SyntheticObserver};
use anvil_literal::ValueHandle;
use anvil_model::TypeName;
use indexmap::IndexMap;
use serde::Serialize;

/// Simple-name prefix of the generated components class
pub const COMPONENTS_CLASS_PREFIX: &str = "SyntheticComponents_";

/// Name of the components class generated by build `build` into `package`
#[must_use]
pub fn components_class_name(package: &str, build: BuildId) -> TypeName {
    TypeName::new(format!("{package}.{COMPONENTS_CLASS_PREFIX}{build}"))
}

/// A synthetic bean with its qualifiers compiled to literals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticBeanRecord {
    /// Registration
    #[serde(flatten)]
    pub bean: SyntheticBean,
    /// Instructions constructing each qualifier, in qualifier order
    pub qualifier_literals: Vec<ValueHandle>,
}

/// A synthetic observer with its qualifiers compiled to literals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticObserverRecord {
    /// Registration
    #[serde(flatten)]
    pub observer: SyntheticObserver,
    /// Instructions constructing each qualifier, in qualifier order
    pub qualifier_literals: Vec<ValueHandle>,
}

/// Generated class registering every synthetic component at runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentsClass {
    /// Generated name
    pub name: TypeName,
    /// Build that generated it
    pub build: BuildId,
    /// Synthetic beans, in registration order
    pub beans: Vec<SyntheticBeanRecord>,
    /// Synthetic observers, in registration order
    pub observers: Vec<SyntheticObserverRecord>,
    /// Custom contexts
    pub contexts: Vec<ContextDescriptor>,
}

impl ComponentsClass {
    /// Check if there is nothing to register
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty() && self.observers.is_empty()
    }
}

/// Qualifier literals of the resolved, non-synthetic deployment
///
/// Keyed by bean or observer id; each list follows the component's qualifier
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualifierLiterals {
    /// Per bean
    pub beans: IndexMap<String, Vec<ValueHandle>>,
    /// Per observer
    pub observers: IndexMap<String, Vec<ValueHandle>>,
}

impl QualifierLiterals {
    /// Number of compiled qualifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.beans.values().chain(self.observers.values()).map(Vec::len).sum()
    }

    /// Check if no qualifier was compiled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

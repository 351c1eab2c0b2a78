//! Deployment view: beans and observers
//!
//! Bean resolution itself happens outside this workspace; these types are
//! the boundary through which the resolved graph is handed in.

use crate::annotation::AnnotationInstance;
use crate::key::MethodKey;
use crate::name::TypeName;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a bean is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanKind {
    /// Managed class
    Class,
    /// Producer method
    ProducerMethod,
    /// Producer field
    ProducerField,
    /// Registered by an extension during synthesis
    Synthetic,
}

/// A resolved bean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeanInfo {
    /// Stable identifier
    pub id: String,
    /// Definition kind
    pub kind: BeanKind,
    /// Class providing the instances
    pub implementation_class: TypeName,
    /// Class declaring the bean (the producer's class for producers)
    pub declaring_class: TypeName,
    /// Scope annotation
    pub scope: TypeName,
    /// Bean types
    pub types: Vec<Type>,
    /// Qualifiers
    pub qualifiers: Vec<AnnotationInstance>,
    /// Bean name
    pub name: Option<String>,
    /// Priority, when enabled as alternative or ordered
    pub priority: Option<i32>,
    /// Alternative flag
    pub alternative: bool,
}

impl BeanInfo {
    /// Class bean whose only bean type is its own class
    #[must_use]
    pub fn class_bean(id: impl Into<String>, class: impl Into<TypeName>, scope: impl Into<TypeName>) -> Self {
        let class = class.into();
        Self {
            id: id.into(),
            kind: BeanKind::Class,
            implementation_class: class.clone(),
            declaring_class: class.clone(),
            scope: scope.into(),
            types: vec![Type::class(class)],
            qualifiers: Vec::new(),
            name: None,
            priority: None,
            alternative: false,
        }
    }

    /// Add bean type
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<Type>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Add qualifier
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: AnnotationInstance) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Check for a qualifier by type name
    #[must_use]
    pub fn has_qualifier(&self, name: &TypeName) -> bool {
        self.qualifiers.iter().any(|q| q.name() == name)
    }
}

/// A resolved observer method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverInfo {
    /// Stable identifier
    pub id: String,
    /// Declaring class
    pub declaring_class: TypeName,
    /// Observer method, absent for synthetic observers
    pub method: Option<MethodKey>,
    /// Observed event type
    pub observed_type: Type,
    /// Event qualifiers
    pub qualifiers: Vec<AnnotationInstance>,
    /// Notification priority
    pub priority: i32,
    /// Async observer
    pub is_async: bool,
    /// Registered by an extension during synthesis
    pub is_synthetic: bool,
}

impl ObserverInfo {
    /// Default observer priority
    pub const DEFAULT_PRIORITY: i32 = 2500;

    /// Observer method declared on `declaring_class`
    #[must_use]
    pub fn method_observer(id: impl Into<String>, method: MethodKey, observed_type: impl Into<Type>) -> Self {
        Self {
            id: id.into(),
            declaring_class: method.class().clone(),
            method: Some(method),
            observed_type: observed_type.into(),
            qualifiers: Vec::new(),
            priority: Self::DEFAULT_PRIORITY,
            is_async: false,
            is_synthetic: false,
        }
    }

    /// Add qualifier
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: AnnotationInstance) -> Self {
        self.qualifiers.push(qualifier);
        self
    }
}

/// The resolved bean graph of one build
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    beans: Vec<Arc<BeanInfo>>,
    observers: Vec<Arc<ObserverInfo>>,
}

impl Deployment {
    /// Create deployment
    #[must_use]
    pub fn new(beans: Vec<BeanInfo>, observers: Vec<ObserverInfo>) -> Self {
        Self {
            beans: beans.into_iter().map(Arc::new).collect(),
            observers: observers.into_iter().map(Arc::new).collect(),
        }
    }

    /// All beans
    #[inline]
    #[must_use]
    pub fn beans(&self) -> &[Arc<BeanInfo>] {
        &self.beans
    }

    /// All observers
    #[inline]
    #[must_use]
    pub fn observers(&self) -> &[Arc<ObserverInfo>] {
        &self.observers
    }

    /// Append beans and observers
    pub fn extend(&mut self, beans: Vec<BeanInfo>, observers: Vec<ObserverInfo>) {
        self.beans.extend(beans.into_iter().map(Arc::new));
        self.observers.extend(observers.into_iter().map(Arc::new));
    }
}

//! Synthetic beans and observers registered during synthesis

use anvil_model::{AnnotationInstance, BeanInfo, BeanKind, ObserverInfo, Type, TypeName};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

/// Scope of synthetic beans that declare none
pub const DEFAULT_SCOPE: &str = "jakarta.enterprise.context.Dependent";

/// Parameter value handed to a synthetic bean's creator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `boolean`
    Boolean(bool),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `double`
    Double(f64),
    /// `String`
    String(String),
    /// `Class`
    Class(TypeName),
}

macro_rules! param_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

param_from!(bool => Boolean, i32 => Int, i64 => Long, f64 => Double, String => String, &str => String, TypeName => Class);

/// A synthetic bean as registered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticBean {
    /// Registration order, unique per build
    pub id: String,
    /// Extension that registered it
    pub extension: TypeName,
    /// Implementation class
    pub implementation_class: TypeName,
    /// Bean types
    pub types: Vec<Type>,
    /// Qualifiers
    pub qualifiers: Vec<AnnotationInstance>,
    /// Scope annotation
    pub scope: Option<TypeName>,
    /// Bean name
    pub name: Option<String>,
    /// Alternative flag
    pub alternative: bool,
    /// Priority
    pub priority: Option<i32>,
    /// Stereotypes
    pub stereotypes: Vec<TypeName>,
    /// Class creating instances
    pub creator: Option<TypeName>,
    /// Class disposing instances
    pub disposer: Option<TypeName>,
    /// Creator parameters
    pub params: IndexMap<String, ParamValue>,
}

impl SyntheticBean {
    /// Deployment view of this bean
    #[must_use]
    pub fn to_bean_info(&self) -> BeanInfo {
        let mut types = self.types.clone();
        if types.is_empty() {
            types.push(Type::class(self.implementation_class.clone()));
        }
        BeanInfo {
            id: self.id.clone(),
            kind: BeanKind::Synthetic,
            implementation_class: self.implementation_class.clone(),
            declaring_class: self.extension.clone(),
            scope: self.scope.clone().unwrap_or_else(|| TypeName::new(DEFAULT_SCOPE)),
            types,
            qualifiers: self.qualifiers.clone(),
            name: self.name.clone(),
            priority: self.priority,
            alternative: self.alternative,
        }
    }
}

/// A synthetic observer as registered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticObserver {
    /// Registration order, unique per build
    pub id: String,
    /// Declaring class; the registering extension unless overridden
    pub declaring_class: TypeName,
    /// Observed event type
    pub observed_type: Type,
    /// Event qualifiers
    pub qualifiers: Vec<AnnotationInstance>,
    /// Notification priority
    pub priority: i32,
    /// Async observer
    pub is_async: bool,
    /// Class receiving notifications
    pub observer_class: Option<TypeName>,
}

impl SyntheticObserver {
    /// Deployment view of this observer
    #[must_use]
    pub fn to_observer_info(&self) -> ObserverInfo {
        ObserverInfo {
            id: self.id.clone(),
            declaring_class: self.declaring_class.clone(),
            method: None,
            observed_type: self.observed_type.clone(),
            qualifiers: self.qualifiers.clone(),
            priority: self.priority,
            is_async: self.is_async,
            is_synthetic: true,
        }
    }
}

/// Every synthetic component registered in one build
#[derive(Debug, Default)]
pub struct SyntheticRegistry {
    beans: Mutex<Vec<SyntheticBean>>,
    observers: Mutex<Vec<SyntheticObserver>>,
}

impl SyntheticRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration handle for `extension`
    #[must_use]
    pub fn for_extension(&self, extension: TypeName) -> SyntheticComponents<'_> {
        SyntheticComponents {
            registry: self,
            extension,
        }
    }

    /// Registered beans
    #[must_use]
    pub fn beans(&self) -> Vec<SyntheticBean> {
        self.beans.lock().clone()
    }

    /// Registered observers
    #[must_use]
    pub fn observers(&self) -> Vec<SyntheticObserver> {
        self.observers.lock().clone()
    }

    /// Check if nothing was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beans.lock().is_empty() && self.observers.lock().is_empty()
    }

    /// Incomplete registrations, one line each
    ///
    /// Beans need a creator and observers need an observer class.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let beans = self.beans.lock();
        let observers = self.observers.lock();
        beans
            .iter()
            .filter(|bean| bean.creator.is_none())
            .map(|bean| {
                format!(
                    "synthetic bean {} ({}) registered by {} has no creator",
                    bean.id, bean.implementation_class, bean.extension
                )
            })
            .chain(observers.iter().filter(|o| o.observer_class.is_none()).map(|observer| {
                format!(
                    "synthetic observer {} of {} declared by {} has no observer class",
                    observer.id, observer.observed_type, observer.declaring_class
                )
            }))
            .collect()
    }

    fn update_bean(&self, position: usize, update: impl FnOnce(&mut SyntheticBean)) {
        if let Some(bean) = self.beans.lock().get_mut(position) {
            update(bean);
        }
    }

    fn update_observer(&self, position: usize, update: impl FnOnce(&mut SyntheticObserver)) {
        if let Some(observer) = self.observers.lock().get_mut(position) {
            update(observer);
        }
    }
}

/// Synthesis-phase registration handle of one extension
#[derive(Debug, Clone)]
pub struct SyntheticComponents<'a> {
    registry: &'a SyntheticRegistry,
    extension: TypeName,
}

impl<'a> SyntheticComponents<'a> {
    /// Register a bean implemented by `implementation_class`
    pub fn add_bean(&self, implementation_class: impl Into<TypeName>) -> SyntheticBeanBuilder<'a> {
        let mut beans = self.registry.beans.lock();
        let position = beans.len();
        let bean = SyntheticBean {
            id: format!("synthetic-bean-{position}"),
            extension: self.extension.clone(),
            implementation_class: implementation_class.into(),
            types: Vec::new(),
            qualifiers: Vec::new(),
            scope: None,
            name: None,
            alternative: false,
            priority: None,
            stereotypes: Vec::new(),
            creator: None,
            disposer: None,
            params: IndexMap::new(),
        };
        tracing::debug!(id = %bean.id, class = %bean.implementation_class, extension = %self.extension, "Synthetic bean added");
        beans.push(bean);
        SyntheticBeanBuilder {
            registry: self.registry,
            position,
        }
    }

    /// Register an observer of `observed_type`
    pub fn add_observer(&self, observed_type: impl Into<Type>) -> SyntheticObserverBuilder<'a> {
        let mut observers = self.registry.observers.lock();
        let position = observers.len();
        let observer = SyntheticObserver {
            id: format!("synthetic-observer-{position}"),
            declaring_class: self.extension.clone(),
            observed_type: observed_type.into(),
            qualifiers: Vec::new(),
            priority: ObserverInfo::DEFAULT_PRIORITY,
            is_async: false,
            observer_class: None,
        };
        tracing::debug!(id = %observer.id, observed = %observer.observed_type, extension = %self.extension, "Synthetic observer added");
        observers.push(observer);
        SyntheticObserverBuilder {
            registry: self.registry,
            position,
        }
    }
}

/// Refines a registered synthetic bean
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SyntheticBeanBuilder<'a> {
    registry: &'a SyntheticRegistry,
    position: usize,
}

impl SyntheticBeanBuilder<'_> {
    fn update(self, update: impl FnOnce(&mut SyntheticBean)) -> Self {
        self.registry.update_bean(self.position, update);
        self
    }

    /// Add bean type
    pub fn bean_type(self, ty: impl Into<Type>) -> Self {
        let ty = ty.into();
        self.update(|bean| bean.types.push(ty))
    }

    /// Add qualifier
    pub fn qualifier(self, qualifier: AnnotationInstance) -> Self {
        self.update(|bean| bean.qualifiers.push(qualifier))
    }

    /// Set scope annotation
    pub fn scope(self, scope: impl Into<TypeName>) -> Self {
        let scope = scope.into();
        self.update(|bean| bean.scope = Some(scope))
    }

    /// Set bean name
    pub fn name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.update(|bean| bean.name = Some(name))
    }

    /// Set alternative flag
    pub fn alternative(self, alternative: bool) -> Self {
        self.update(|bean| bean.alternative = alternative)
    }

    /// Set priority
    pub fn priority(self, priority: i32) -> Self {
        self.update(|bean| bean.priority = Some(priority))
    }

    /// Add stereotype
    pub fn stereotype(self, stereotype: impl Into<TypeName>) -> Self {
        let stereotype = stereotype.into();
        self.update(|bean| bean.stereotypes.push(stereotype))
    }

    /// Set creator class
    pub fn create_with(self, creator: impl Into<TypeName>) -> Self {
        let creator = creator.into();
        self.update(|bean| bean.creator = Some(creator))
    }

    /// Set disposer class
    pub fn dispose_with(self, disposer: impl Into<TypeName>) -> Self {
        let disposer = disposer.into();
        self.update(|bean| bean.disposer = Some(disposer))
    }

    /// Add creator parameter
    pub fn with_param(self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.update(|bean| {
            bean.params.insert(key, value);
        })
    }
}

/// Refines a registered synthetic observer
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SyntheticObserverBuilder<'a> {
    registry: &'a SyntheticRegistry,
    position: usize,
}

impl SyntheticObserverBuilder<'_> {
    fn update(self, update: impl FnOnce(&mut SyntheticObserver)) -> Self {
        self.registry.update_observer(self.position, update);
        self
    }

    /// Override declaring class
    pub fn declaring_class(self, class: impl Into<TypeName>) -> Self {
        let class = class.into();
        self.update(|observer| observer.declaring_class = class)
    }

    /// Add event qualifier
    pub fn qualifier(self, qualifier: AnnotationInstance) -> Self {
        self.update(|observer| observer.qualifiers.push(qualifier))
    }

    /// Set priority
    pub fn priority(self, priority: i32) -> Self {
        self.update(|observer| observer.priority = priority)
    }

    /// Set async flag
    pub fn is_async(self, is_async: bool) -> Self {
        self.update(|observer| observer.is_async = is_async)
    }

    /// Set class receiving notifications
    pub fn observe_with(self, class: impl Into<TypeName>) -> Self {
        let class = class.into();
        self.update(|observer| observer.observer_class = Some(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builders_refine_registered_components() {
        let registry = SyntheticRegistry::new();
        let components = registry.for_extension(TypeName::new("ext.Mine"));
        let _ = components
            .add_bean("s.Clock")
            .bean_type(Type::class("s.Time"))
            .qualifier(AnnotationInstance::new("s.System"))
            .create_with("s.ClockCreator")
            .with_param("zone", "UTC");
        let _ = components.add_observer(Type::class("s.Tick")).priority(10);

        let bean = registry.beans().remove(0);
        assert_eq!(bean.params.get("zone"), Some(&ParamValue::String("UTC".into())));
        let info = bean.to_bean_info();
        assert_eq!(info.declaring_class, TypeName::new("ext.Mine"));
        assert_eq!(info.scope, TypeName::new(DEFAULT_SCOPE));
        assert_eq!(info.types, vec![Type::class("s.Time")]);

        let observer = registry.observers().remove(0).to_observer_info();
        assert_eq!(observer.priority, 10);
        assert!(observer.is_synthetic);
    }

    #[test]
    fn incomplete_components_are_problems() {
        let registry = SyntheticRegistry::new();
        let components = registry.for_extension(TypeName::new("ext.Mine"));
        let _ = components.add_bean("s.Clock");
        let _ = components.add_observer(Type::class("s.Tick")).observe_with("s.TickObserver");

        let problems = registry.problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("no creator"));
    }
}

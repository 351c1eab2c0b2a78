//! Resolved callback arguments

use crate::api::{
    Annotations, AppArchive, AppArchiveConfig, AppDeployment, ClassConfig, FieldConfig, Messages, MetaAnnotations,
    MethodConfig, ScannedClasses, SyntheticComponents, Types,
};
use crate::phase::Phase;
use crate::role::ParameterRole;
use anvil_model::{BeanInfo, ClassInfo, FieldInfo, MethodInfo, ObserverInfo};
use std::sync::Arc;

/// One resolved parameter value
#[derive(Debug, Clone)]
pub enum Argument<'a> {
    /// Diagnostics sink
    Messages(&'a Messages),
    /// Classes to add to the archive
    ScannedClasses(&'a ScannedClasses),
    /// Meta-annotation registration
    MetaAnnotations(&'a MetaAnnotations),
    /// Matching class, configurable
    ClassConfig(ClassConfig<'a>),
    /// Matching method, configurable
    MethodConfig(MethodConfig<'a>),
    /// Matching field, configurable
    FieldConfig(FieldConfig<'a>),
    /// Matching class
    ClassInfo(Arc<ClassInfo>),
    /// Matching method
    MethodInfo(Arc<MethodInfo>),
    /// Matching field
    FieldInfo(Arc<FieldInfo>),
    /// Annotation factory
    Annotations(&'a Annotations),
    /// Archive queries yielding configs
    AppArchiveConfig(AppArchiveConfig<'a>),
    /// Type factory
    Types(&'a Types),
    /// Archive queries
    AppArchive(AppArchive<'a>),
    /// Deployment queries
    AppDeployment(AppDeployment<'a>),
    /// Synthetic component registration
    SyntheticComponents(SyntheticComponents<'a>),
    /// Matching bean
    BeanInfo(Arc<BeanInfo>),
    /// Matching observer
    ObserverInfo(Arc<ObserverInfo>),
}

impl Argument<'_> {
    /// Role this argument fills
    #[must_use]
    pub fn role(&self) -> ParameterRole {
        match self {
            Self::Messages(_) => ParameterRole::Messages,
            Self::ScannedClasses(_) => ParameterRole::ScannedClasses,
            Self::MetaAnnotations(_) => ParameterRole::MetaAnnotations,
            Self::ClassConfig(_) => ParameterRole::ClassConfig,
            Self::MethodConfig(_) => ParameterRole::MethodConfig,
            Self::FieldConfig(_) => ParameterRole::FieldConfig,
            Self::ClassInfo(_) => ParameterRole::ClassInfo,
            Self::MethodInfo(_) => ParameterRole::MethodInfo,
            Self::FieldInfo(_) => ParameterRole::FieldInfo,
            Self::Annotations(_) => ParameterRole::Annotations,
            Self::AppArchiveConfig(_) => ParameterRole::AppArchiveConfig,
            Self::Types(_) => ParameterRole::Types,
            Self::AppArchive(_) => ParameterRole::AppArchive,
            Self::AppDeployment(_) => ParameterRole::AppDeployment,
            Self::SyntheticComponents(_) => ParameterRole::SyntheticComponents,
            Self::BeanInfo(_) => ParameterRole::BeanInfo,
            Self::ObserverInfo(_) => ParameterRole::ObserverInfo,
        }
    }
}

/// Arguments of one callback invocation, in declared parameter order
#[derive(Debug)]
pub struct Invocation<'a> {
    phase: Phase,
    extension: &'a str,
    method: &'a str,
    arguments: Vec<Argument<'a>>,
}

macro_rules! accessors {
    ($($(#[$doc:meta])* $name:ident: $variant:ident => $ty:ty, by $how:tt;)+) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Fails if the callback did not declare the parameter.
            pub fn $name(&self) -> anyhow::Result<$ty> {
                self.arguments
                    .iter()
                    .find_map(|argument| match argument {
                        Argument::$variant(value) => Some(accessors!(@get $how value)),
                        _ => None,
                    })
                    .ok_or_else(|| self.missing(ParameterRole::$variant))
            }
        )+
    };
    (@get copy $value:ident) => { *$value };
    (@get clone $value:ident) => { $value.clone() };
}

impl<'a> Invocation<'a> {
    /// Create invocation
    #[must_use]
    pub fn new(phase: Phase, extension: &'a str, method: &'a str, arguments: Vec<Argument<'a>>) -> Self {
        Self {
            phase,
            extension,
            method,
            arguments,
        }
    }

    /// Running phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Declaring extension
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &str {
        self.extension
    }

    /// Callback method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        self.method
    }

    /// Every argument, in declared order
    #[must_use]
    pub fn arguments(&self) -> &[Argument<'a>] {
        &self.arguments
    }

    fn missing(&self, role: ParameterRole) -> anyhow::Error {
        anyhow::anyhow!("{}::{} did not declare a {role:?} parameter", self.extension, self.method)
    }

    accessors! {
        /// Diagnostics sink
        messages: Messages => &'a Messages, by copy;
        /// Scanned classes
        scanned_classes: ScannedClasses => &'a ScannedClasses, by copy;
        /// Meta-annotations
        meta_annotations: MetaAnnotations => &'a MetaAnnotations, by copy;
        /// Matching class config
        class_config: ClassConfig => ClassConfig<'a>, by clone;
        /// Matching method config
        method_config: MethodConfig => MethodConfig<'a>, by clone;
        /// Matching field config
        field_config: FieldConfig => FieldConfig<'a>, by clone;
        /// Matching class
        class_info: ClassInfo => Arc<ClassInfo>, by clone;
        /// Matching method
        method_info: MethodInfo => Arc<MethodInfo>, by clone;
        /// Matching field
        field_info: FieldInfo => Arc<FieldInfo>, by clone;
        /// Annotation factory
        annotations: Annotations => &'a Annotations, by copy;
        /// Archive config
        archive_config: AppArchiveConfig => AppArchiveConfig<'a>, by copy;
        /// Type factory
        types: Types => &'a Types, by copy;
        /// Archive queries
        archive: AppArchive => AppArchive<'a>, by copy;
        /// Deployment queries
        deployment: AppDeployment => AppDeployment<'a>, by copy;
        /// Synthetic component registration
        synthetic_components: SyntheticComponents => SyntheticComponents<'a>, by clone;
        /// Matching bean
        bean: BeanInfo => Arc<BeanInfo>, by clone;
        /// Matching observer
        observer: ObserverInfo => Arc<ObserverInfo>, by clone;
    }
}

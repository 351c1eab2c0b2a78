//! Callback parameter roles

use crate::phase::Phase;
use std::fmt::{self, Display, Formatter};

const ALL: &[Phase] = &Phase::ALL;
const DISCOVERY: &[Phase] = &[Phase::Discovery];
const ENHANCEMENT: &[Phase] = &[Phase::Enhancement];
const SYNTHESIS: &[Phase] = &[Phase::Synthesis];
const VALIDATION: &[Phase] = &[Phase::Validation];
const AFTER_DISCOVERY: &[Phase] = &[Phase::Enhancement, Phase::Synthesis, Phase::Validation];
const AFTER_ENHANCEMENT: &[Phase] = &[Phase::Synthesis, Phase::Validation];

/// What a callback parameter receives
///
/// Singular roles receive one context object per invocation. Query roles
/// receive one matching declaration, bean or observer per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// Diagnostics sink
    Messages,
    /// Classes to add to the archive
    ScannedClasses,
    /// Qualifier, binding, stereotype and context registration
    MetaAnnotations,
    /// Each matching class, configurable
    ClassConfig,
    /// Each matching method, configurable
    MethodConfig,
    /// Each matching field, configurable
    FieldConfig,
    /// Each matching class, read-only
    ClassInfo,
    /// Each matching method, read-only
    MethodInfo,
    /// Each matching field, read-only
    FieldInfo,
    /// Annotation instance factory
    Annotations,
    /// Archive queries yielding configs
    AppArchiveConfig,
    /// Type factory
    Types,
    /// Archive queries
    AppArchive,
    /// Bean and observer queries
    AppDeployment,
    /// Synthetic bean and observer registration
    SyntheticComponents,
    /// Each matching bean
    BeanInfo,
    /// Each matching observer
    ObserverInfo,
    /// Parameter type not understood
    Unknown(String),
}

impl ParameterRole {
    /// Whether the role expands to one invocation per match
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(
            self,
            Self::ClassConfig
                | Self::MethodConfig
                | Self::FieldConfig
                | Self::ClassInfo
                | Self::MethodInfo
                | Self::FieldInfo
                | Self::BeanInfo
                | Self::ObserverInfo
        )
    }

    /// Phases in which the role may be declared
    #[must_use]
    pub const fn legal_phases(&self) -> &'static [Phase] {
        match self {
            Self::Messages => ALL,
            Self::ScannedClasses | Self::MetaAnnotations => DISCOVERY,
            Self::ClassConfig
            | Self::MethodConfig
            | Self::FieldConfig
            | Self::ClassInfo
            | Self::MethodInfo
            | Self::FieldInfo
            | Self::Annotations
            | Self::AppArchiveConfig => ENHANCEMENT,
            Self::Types | Self::AppArchive => AFTER_DISCOVERY,
            Self::AppDeployment => AFTER_ENHANCEMENT,
            Self::SyntheticComponents => SYNTHESIS,
            Self::BeanInfo | Self::ObserverInfo => VALIDATION,
            Self::Unknown(_) => &[],
        }
    }

    /// Whether the role may be declared in `phase`
    #[must_use]
    pub fn is_legal_in(&self, phase: Phase) -> bool {
        self.legal_phases().contains(&phase)
    }
}

impl Display for ParameterRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown parameter type {name}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_roles_are_enhancement_or_validation_only() {
        let roles = [
            ParameterRole::ClassConfig,
            ParameterRole::MethodInfo,
            ParameterRole::BeanInfo,
            ParameterRole::ObserverInfo,
        ];
        for role in roles {
            assert!(role.is_query());
            assert!(!role.is_legal_in(Phase::Discovery));
            assert!(!role.is_legal_in(Phase::Synthesis));
        }
    }

    #[test]
    fn legality_table() {
        assert!(ParameterRole::Messages.is_legal_in(Phase::Validation));
        assert!(ParameterRole::ScannedClasses.is_legal_in(Phase::Discovery));
        assert!(!ParameterRole::ScannedClasses.is_legal_in(Phase::Enhancement));
        assert!(ParameterRole::Types.is_legal_in(Phase::Synthesis));
        assert!(!ParameterRole::AppDeployment.is_legal_in(Phase::Enhancement));
        assert!(ParameterRole::SyntheticComponents.is_legal_in(Phase::Synthesis));
        assert!(!ParameterRole::Unknown("x.Y".into()).is_legal_in(Phase::Discovery));
        assert!(!ParameterRole::Annotations.is_query());
    }
}

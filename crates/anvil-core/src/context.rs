//! Build-scoped state and callback argument resolution

use crate::config::PipelineConfig;
use crate::error::BuildError;
use crate::outcome::BuildId;
use anvil_extension::api::{
    Annotations, AppArchive, AppArchiveConfig, AppDeployment, ClassConfig, FieldConfig, Messages, MetaAnnotations,
    MethodConfig, ScannedClasses, SyntheticRegistry, Types,
};
use anvil_extension::{Argument, Callback, ConfigurationError, Constraint, ParameterRole, Phase};
use anvil_index::DeclarationIndex;
use anvil_model::{ClassInfo, Deployment, Type, TypeName};
use anvil_overlay::{AnnotationOverlays, AnnotationSource, FrozenAnnotations, OverlayError, TransformationRegistry};
use anvil_query::{DeploymentScope, QueryScope};
use indexmap::IndexMap;
use std::sync::Arc;

/// Everything one build shares between its callbacks
///
/// Nothing here outlives a single run, so a process can run any number of
/// builds one after another.
pub struct BuildContext {
    id: BuildId,
    config: PipelineConfig,
    index: Arc<DeclarationIndex>,
    registry: TransformationRegistry,
    frozen: Option<FrozenAnnotations>,
    messages: Messages,
    scanned: ScannedClasses,
    meta: MetaAnnotations,
    annotations: Annotations,
    types: Types,
    synthetic: SyntheticRegistry,
    deployment: Deployment,
    entered: Option<Phase>,
}

impl BuildContext {
    /// Fresh context over `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>, config: PipelineConfig) -> Self {
        let overlays = Arc::new(AnnotationOverlays::new(Arc::clone(&index)));
        Self {
            id: BuildId::new(),
            config,
            registry: TransformationRegistry::new(overlays),
            frozen: None,
            messages: Messages::new(),
            scanned: ScannedClasses::new(),
            meta: MetaAnnotations::new(),
            annotations: Annotations::new(Arc::clone(&index)),
            types: Types::new(Arc::clone(&index)),
            synthetic: SyntheticRegistry::new(),
            deployment: Deployment::default(),
            entered: None,
            index,
        }
    }

    /// Build identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> BuildId {
        self.id
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Immutable declaration index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<DeclarationIndex> {
        &self.index
    }

    /// Transformation registry of the enhancement phase
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TransformationRegistry {
        &self.registry
    }

    /// Final annotations, once enhancement has frozen them
    #[inline]
    #[must_use]
    pub fn frozen(&self) -> Option<&FrozenAnnotations> {
        self.frozen.as_ref()
    }

    /// Current annotation view: the live overlays until enhancement ends, the frozen view after
    #[must_use]
    pub fn source(&self) -> &dyn AnnotationSource {
        match &self.frozen {
            Some(frozen) => frozen,
            None => &**self.registry.overlays(),
        }
    }

    /// Diagnostics sink
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Classes extensions asked to scan
    #[inline]
    #[must_use]
    pub fn scanned(&self) -> &ScannedClasses {
        &self.scanned
    }

    /// Meta-annotation registrations
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &MetaAnnotations {
        &self.meta
    }

    /// Synthetic component registrations
    #[inline]
    #[must_use]
    pub fn synthetic(&self) -> &SyntheticRegistry {
        &self.synthetic
    }

    /// Current deployment; empty before enhancement completes
    #[inline]
    #[must_use]
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Last phase entered
    #[inline]
    #[must_use]
    pub fn entered(&self) -> Option<Phase> {
        self.entered
    }

    /// Mark `phase` as running
    ///
    /// # Errors
    ///
    /// [`BuildError::PhaseOrder`] unless `phase` directly follows the last
    /// entered phase. A phase is never entered twice.
    pub fn enter(&mut self, phase: Phase) -> Result<(), BuildError> {
        let expected = match self.entered {
            None => Some(Phase::Discovery),
            Some(last) => last.next(),
        };
        if expected != Some(phase) {
            return Err(BuildError::PhaseOrder {
                requested: phase,
                expected,
            });
        }
        self.entered = Some(phase);
        Ok(())
    }

    pub(crate) fn set_frozen(&mut self, frozen: FrozenAnnotations) {
        self.frozen = Some(frozen);
    }

    pub(crate) fn set_deployment(&mut self, deployment: Deployment) {
        self.deployment = deployment;
    }

    /// Argument lists of every invocation of `callback`
    ///
    /// Without a query role there is exactly one invocation. With one, there
    /// is one invocation per match, possibly none.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Overlay`] if annotations can no longer be read
    /// - [`BuildError::Configuration`] if a role cannot be supplied
    pub fn invocations<'a>(
        &'a self,
        callback: &Callback,
        extension_class: &TypeName,
    ) -> Result<Vec<Vec<Argument<'a>>>, BuildError> {
        let roles = callback.method().roles();
        let matches = match callback.query_role() {
            Some(role) => self.query(role, callback.method().constraints())?,
            None => vec![],
        };
        let has_query = callback.query_role().is_some();

        let build = |matched: Option<&Argument<'a>>| -> Result<Vec<Argument<'a>>, BuildError> {
            roles
                .iter()
                .map(|role| {
                    let argument = if role.is_query() {
                        matched.cloned()
                    } else {
                        self.singular(role, extension_class)
                    };
                    argument.ok_or_else(|| {
                        BuildError::from(ConfigurationError::UnknownRole {
                            extension: callback.extension_name().to_owned(),
                            method: callback.name().to_owned(),
                            name: role.to_string(),
                        })
                    })
                })
                .collect()
        };

        if has_query {
            matches.iter().map(|matched| build(Some(matched))).collect()
        } else {
            Ok(vec![build(None)?])
        }
    }

    fn singular<'a>(&'a self, role: &ParameterRole, extension_class: &TypeName) -> Option<Argument<'a>> {
        Some(match role {
            ParameterRole::Messages => Argument::Messages(&self.messages),
            ParameterRole::ScannedClasses => Argument::ScannedClasses(&self.scanned),
            ParameterRole::MetaAnnotations => Argument::MetaAnnotations(&self.meta),
            ParameterRole::Annotations => Argument::Annotations(&self.annotations),
            ParameterRole::AppArchiveConfig => Argument::AppArchiveConfig(AppArchiveConfig::new(&self.registry)),
            ParameterRole::Types => Argument::Types(&self.types),
            ParameterRole::AppArchive => Argument::AppArchive(AppArchive::new(QueryScope::new(self.source()))),
            ParameterRole::AppDeployment => Argument::AppDeployment(AppDeployment::new(&self.deployment)),
            ParameterRole::SyntheticComponents => {
                Argument::SyntheticComponents(self.synthetic.for_extension(extension_class.clone()))
            }
            _ => return None,
        })
    }

    fn query<'a>(&'a self, role: &ParameterRole, constraints: &[Constraint]) -> Result<Vec<Argument<'a>>, BuildError> {
        let registry = &self.registry;
        let found = match role {
            ParameterRole::ClassConfig => self
                .matching_classes(constraints)?
                .into_iter()
                .map(|class| Argument::ClassConfig(ClassConfig::new(registry, class)))
                .collect(),
            ParameterRole::ClassInfo => self
                .matching_classes(constraints)?
                .into_iter()
                .map(Argument::ClassInfo)
                .collect(),
            ParameterRole::MethodConfig | ParameterRole::MethodInfo => {
                let configurable = matches!(role, ParameterRole::MethodConfig);
                self.matching_classes(constraints)?
                    .iter()
                    .flat_map(|class| class.regular_methods().cloned().collect::<Vec<_>>())
                    .map(|method| {
                        if configurable {
                            Argument::MethodConfig(MethodConfig::new(registry, method))
                        } else {
                            Argument::MethodInfo(method)
                        }
                    })
                    .collect()
            }
            ParameterRole::FieldConfig | ParameterRole::FieldInfo => {
                let configurable = matches!(role, ParameterRole::FieldConfig);
                self.matching_classes(constraints)?
                    .iter()
                    .flat_map(|class| class.fields().to_vec())
                    .map(|field| {
                        if configurable {
                            Argument::FieldConfig(FieldConfig::new(registry, field))
                        } else {
                            Argument::FieldInfo(field)
                        }
                    })
                    .collect()
            }
            ParameterRole::BeanInfo => self.matching_beans(constraints).into_iter().map(Argument::BeanInfo).collect(),
            ParameterRole::ObserverInfo => self
                .matching_observers(constraints)
                .into_iter()
                .map(Argument::ObserverInfo)
                .collect(),
            _ => Vec::new(),
        };
        Ok(found)
    }

    /// Classes matched by any constraint, deduplicated in first-match order
    fn matching_classes(&self, constraints: &[Constraint]) -> Result<Vec<Arc<ClassInfo>>, OverlayError> {
        let scope = QueryScope::new(self.source());
        let mut found: IndexMap<TypeName, Arc<ClassInfo>> = IndexMap::new();
        for constraint in constraints {
            let mut query = match constraint {
                Constraint::ExactType { ty, .. } => scope.classes().exactly(ty.clone()),
                Constraint::SubtypesOf { ty, .. } => scope.classes().subtype_of(ty.clone()),
            };
            for annotation in constraint.required_annotations() {
                query = query.annotated_with(annotation.clone());
            }
            for class in query.find()? {
                found.entry(class.name().clone()).or_insert(class);
            }
        }
        Ok(found.into_values().collect())
    }

    /// Type names a constraint admits for beans and observers
    fn constraint_types(&self, constraint: &Constraint) -> Vec<TypeName> {
        match constraint {
            Constraint::ExactType { ty, .. } => vec![ty.clone()],
            Constraint::SubtypesOf { ty, .. } => self.index.all_subtypes(ty),
        }
    }

    fn matching_beans(&self, constraints: &[Constraint]) -> Vec<Arc<anvil_model::BeanInfo>> {
        let scope = DeploymentScope::new(&self.deployment);
        let mut found: IndexMap<String, Arc<anvil_model::BeanInfo>> = IndexMap::new();
        for constraint in constraints {
            let types = self.constraint_types(constraint);
            if types.is_empty() {
                continue;
            }
            let mut query = scope.beans();
            for ty in types {
                query = query.bean_type(Type::class(ty));
            }
            for qualifier in constraint.required_annotations() {
                query = query.qualifier(qualifier.clone());
            }
            for bean in query.stream() {
                found.entry(bean.id.clone()).or_insert(bean);
            }
        }
        found.into_values().collect()
    }

    fn matching_observers(&self, constraints: &[Constraint]) -> Vec<Arc<anvil_model::ObserverInfo>> {
        let scope = DeploymentScope::new(&self.deployment);
        let mut found: IndexMap<String, Arc<anvil_model::ObserverInfo>> = IndexMap::new();
        for constraint in constraints {
            let types = self.constraint_types(constraint);
            if types.is_empty() {
                continue;
            }
            let mut query = scope.observers();
            for ty in types {
                query = query.observed_type(Type::class(ty));
            }
            for qualifier in constraint.required_annotations() {
                query = query.qualifier(qualifier.clone());
            }
            for observer in query.stream() {
                found.entry(observer.id.clone()).or_insert(observer);
            }
        }
        found.into_values().collect()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("id", &self.id)
            .field("entered", &self.entered)
            .field("frozen", &self.frozen.is_some())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_extension::{Extension, ExtensionMethod, ExtensionRegistry};
    use anvil_index::IndexBuilder;
    use anvil_model::{AnnotationInstance, BeanInfo, FieldInfo, MethodInfo, ObserverInfo};
    use pretty_assertions::assert_eq;

    fn index() -> Arc<DeclarationIndex> {
        Arc::new(
            IndexBuilder::new()
                .with_class(ClassInfo::builder("t.Service").build())
                .with_class(
                    ClassInfo::builder("t.Mail")
                        .implements("t.Service")
                        .annotate(AnnotationInstance::new("t.Fast"))
                        .method(MethodInfo::builder("send").returns(Type::class("t.Receipt")))
                        .method(anvil_model::MethodBuilder::constructor())
                        .field(FieldInfo::builder("host", Type::class("java.lang.String")))
                        .build(),
                )
                .with_class(ClassInfo::builder("t.Sms").implements("t.Service").build())
                .build()
                .unwrap(),
        )
    }

    struct One(ExtensionMethod);

    impl Extension for One {
        fn name(&self) -> &str {
            "t::One"
        }

        fn methods(&self) -> Vec<ExtensionMethod> {
            vec![self.0.clone()]
        }
    }

    fn callback(method: ExtensionMethod) -> Callback {
        let mut registry = ExtensionRegistry::new();
        registry.register_instance(One(method.invoke(|_| Ok(()))));
        let plan = registry.discover().unwrap();
        let first = plan.iter().next().cloned().unwrap();
        first
    }

    fn class_names(invocations: &[Vec<Argument<'_>>]) -> Vec<String> {
        let mut names: Vec<String> = invocations
            .iter()
            .map(|arguments| match &arguments[0] {
                Argument::ClassInfo(class) => class.name().to_string(),
                Argument::ClassConfig(config) => config.info().name().to_string(),
                other => format!("{:?}", other.role()),
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn phases_must_be_entered_in_order() {
        let mut context = BuildContext::new(index(), PipelineConfig::new());
        let err = context.enter(Phase::Enhancement).unwrap_err();
        assert!(matches!(
            err,
            BuildError::PhaseOrder {
                requested: Phase::Enhancement,
                expected: Some(Phase::Discovery)
            }
        ));
        for phase in Phase::ALL {
            context.enter(phase).unwrap();
        }
        assert!(matches!(
            context.enter(Phase::Validation),
            Err(BuildError::PhaseOrder { expected: None, .. })
        ));
    }

    #[test]
    fn query_role_yields_one_invocation_per_subtype() {
        let context = BuildContext::new(index(), PipelineConfig::new());
        let callback = callback(
            ExtensionMethod::new("m")
                .phase(Phase::Enhancement)
                .role(ParameterRole::ClassInfo)
                .role(ParameterRole::Messages)
                .constraint(Constraint::subtypes_of("t.Service")),
        );
        let invocations = context.invocations(&callback, &TypeName::new("t.One")).unwrap();
        assert_eq!(class_names(&invocations), vec!["t.Mail", "t.Sms"]);
        assert!(matches!(invocations[0][1], Argument::Messages(_)));
    }

    #[test]
    fn annotated_with_narrows_and_constraints_union() {
        let context = BuildContext::new(index(), PipelineConfig::new());
        let callback = callback(
            ExtensionMethod::new("m")
                .phase(Phase::Enhancement)
                .role(ParameterRole::ClassConfig)
                .constraint(Constraint::subtypes_of("t.Service").annotated_with("t.Fast"))
                .constraint(Constraint::exact("t.Service")),
        );
        let invocations = context.invocations(&callback, &TypeName::new("t.One")).unwrap();
        assert_eq!(class_names(&invocations), vec!["t.Mail", "t.Service"]);
    }

    #[test]
    fn method_matches_exclude_constructors() {
        let context = BuildContext::new(index(), PipelineConfig::new());
        let callback = callback(
            ExtensionMethod::new("m")
                .phase(Phase::Enhancement)
                .role(ParameterRole::MethodInfo)
                .constraint(Constraint::exact("t.Mail")),
        );
        let invocations = context.invocations(&callback, &TypeName::new("t.One")).unwrap();
        assert_eq!(invocations.len(), 1);
        assert!(matches!(&invocations[0][0], Argument::MethodInfo(m) if m.name() == "send"));

        let fields = callback_fields(&context);
        assert_eq!(fields, vec!["host"]);
    }

    fn callback_fields(context: &BuildContext) -> Vec<String> {
        let callback = callback(
            ExtensionMethod::new("f")
                .phase(Phase::Enhancement)
                .role(ParameterRole::FieldConfig)
                .constraint(Constraint::exact("t.Mail")),
        );
        context
            .invocations(&callback, &TypeName::new("t.One"))
            .unwrap()
            .iter()
            .filter_map(|arguments| match &arguments[0] {
                Argument::FieldConfig(field) => Some(field.info().name().to_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_match_means_no_invocation() {
        let context = BuildContext::new(index(), PipelineConfig::new());
        let callback = callback(
            ExtensionMethod::new("m")
                .phase(Phase::Enhancement)
                .role(ParameterRole::ClassInfo)
                .constraint(Constraint::subtypes_of("t.Sms")),
        );
        assert!(context.invocations(&callback, &TypeName::new("t.One")).unwrap().is_empty());
    }

    #[test]
    fn beans_filter_by_type_and_qualifier() {
        let mut context = BuildContext::new(index(), PipelineConfig::new());
        context.set_deployment(Deployment::new(
            vec![
                BeanInfo::class_bean("mail", "t.Mail", "t.Singleton")
                    .with_type(Type::class("t.Service"))
                    .with_qualifier(AnnotationInstance::new("t.Fast")),
                BeanInfo::class_bean("sms", "t.Sms", "t.Singleton").with_type(Type::class("t.Service")),
            ],
            vec![ObserverInfo::method_observer(
                "boot",
                anvil_model::MethodKey::new("t.Mail", "boot", vec![]),
                Type::class("t.Mail"),
            )],
        ));
        let beans = callback(
            ExtensionMethod::new("b")
                .phase(Phase::Validation)
                .role(ParameterRole::BeanInfo)
                .constraint(Constraint::exact("t.Service").annotated_with("t.Fast")),
        );
        let invocations = context.invocations(&beans, &TypeName::new("t.One")).unwrap();
        assert_eq!(invocations.len(), 1);
        assert!(matches!(&invocations[0][0], Argument::BeanInfo(bean) if bean.id == "mail"));

        let observers = callback(
            ExtensionMethod::new("o")
                .phase(Phase::Validation)
                .role(ParameterRole::ObserverInfo)
                .constraint(Constraint::subtypes_of("t.Service")),
        );
        let invocations = context.invocations(&observers, &TypeName::new("t.One")).unwrap();
        assert_eq!(invocations.len(), 1);
    }

    #[test]
    fn singular_roles_resolve_once() {
        let context = BuildContext::new(index(), PipelineConfig::new());
        let callback = callback(
            ExtensionMethod::new("s")
                .phase(Phase::Synthesis)
                .role(ParameterRole::Types)
                .role(ParameterRole::SyntheticComponents)
                .role(ParameterRole::AppDeployment),
        );
        let invocations = context.invocations(&callback, &TypeName::new("t.One")).unwrap();
        assert_eq!(invocations.len(), 1);
        let roles: Vec<_> = invocations[0].iter().map(Argument::role).collect();
        assert_eq!(
            roles,
            vec![
                ParameterRole::Types,
                ParameterRole::SyntheticComponents,
                ParameterRole::AppDeployment
            ]
        );
    }
}

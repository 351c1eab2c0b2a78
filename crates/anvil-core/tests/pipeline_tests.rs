use anvil_core::{BuildContext, BuildError, PhaseRunner, Pipeline, PipelineConfig, StaticDeployment};
use anvil_extension::api::{Level, MetaKind};
use anvil_extension::{Constraint, Extension, ExtensionMethod, ExtensionRegistry, Invocation, ParameterRole, Phase};
use anvil_model::{
    AnnotationInstance, BeanInfo, ClassKey, DeclarationKey, Deployment, MethodKey, ObserverInfo, Type, TypeName,
};
use anvil_overlay::{AnnotationSource, OverlayError, TransformError};
use anvil_test_utils::{
    annotation, init_tracing, sample_index, CallLog, CollectingOutput, RecordingExtension, AUDIT, FAST, MAIL, NAMED,
    QUALIFIER, SERVICE, SMS,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

struct Scripted {
    name: &'static str,
    methods: Vec<ExtensionMethod>,
}

impl Extension for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn methods(&self) -> Vec<ExtensionMethod> {
        self.methods.clone()
    }
}

fn scripted(name: &'static str, methods: Vec<ExtensionMethod>) -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register_instance(Scripted { name, methods });
    registry
}

fn names(found: &[std::sync::Arc<anvil_model::ClassInfo>]) -> Vec<String> {
    let mut names: Vec<String> = found.iter().map(|c| c.name().to_string()).collect();
    names.sort();
    names
}

#[test]
fn phases_run_in_order_with_ascending_priorities() {
    init_tracing();
    let log = CallLog::new();
    let mut registry = ExtensionRegistry::new();
    registry.register_instance(
        RecordingExtension::new(log.clone())
            .callback("validate", Phase::Validation, None)
            .callback("enhance15", Phase::Enhancement, Some(15))
            .callback("discover20", Phase::Discovery, Some(20))
            .callback("enhance5", Phase::Enhancement, Some(5))
            .callback("discover10", Phase::Discovery, Some(10)),
    );

    Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "discovery:discover10",
            "discovery:discover20",
            "enhancement:enhance5",
            "enhancement:enhance15",
            "validation:validate",
        ]
    );
}

#[test]
fn configuration_errors_abort_before_any_callback() {
    let log = CallLog::new();
    let mut registry = ExtensionRegistry::new();
    registry.register_instance(RecordingExtension::new(log.clone()).callback("early", Phase::Discovery, Some(1)));
    registry.register_instance(Scripted {
        name: "app::Broken",
        methods: vec![ExtensionMethod::new("misplaced")
            .phase(Phase::Discovery)
            .role(ParameterRole::AppDeployment)
            .invoke(|_| Ok(()))],
    });

    let err = Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("app::Broken::misplaced"));
    assert!(log.entries().is_empty());
}

#[test]
fn validation_errors_accumulate_and_fail_once() {
    let log = CallLog::new();
    let reporter = |name: &'static str, log: CallLog| {
        ExtensionMethod::new(name)
            .phase(Phase::Validation)
            .role(ParameterRole::Messages)
            .invoke(move |call: &Invocation<'_>| {
                log.record(call.method());
                call.messages()?.error(format!("{name} found a problem"), None);
                Ok(())
            })
    };
    let registry = scripted("app::Checks", vec![reporter("first", log.clone()), reporter("second", log.clone())]);

    let err = Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.phase(), Some(Phase::Validation));
    let texts: Vec<_> = err.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first found a problem", "second found a problem"]);
    assert_eq!(log.entries(), vec!["first", "second"]);
}

#[test]
fn warnings_fail_the_phase_only_when_configured() {
    let registry = || {
        scripted(
            "app::Warn",
            vec![ExtensionMethod::new("warn")
                .phase(Phase::Discovery)
                .role(ParameterRole::Messages)
                .invoke(|call| {
                    call.messages()?.warning("suspicious", None);
                    Ok(())
                })],
        )
    };

    let outcome = Pipeline::new(sample_index(), registry()).run(&CollectingOutput::new()).unwrap();
    assert_eq!(outcome.warnings(), 1);
    assert_eq!(outcome.messages[0].level, Level::Warning);

    let err = Pipeline::new(sample_index(), registry())
        .with_config(PipelineConfig::new().with_fail_on_warnings(true))
        .run(&CollectingOutput::new())
        .unwrap_err();
    assert!(matches!(err, BuildError::Validation { phase: Phase::Discovery, .. }));
}

#[test]
fn annotation_added_in_enhancement_is_seen_in_validation() {
    let seen = CallLog::new();
    let recorder = seen.clone();
    let registry = scripted(
        "app::Marking",
        vec![
            ExtensionMethod::new("mark")
                .phase(Phase::Enhancement)
                .role(ParameterRole::ClassConfig)
                .constraint(Constraint::exact(AUDIT))
                .invoke(|call| {
                    call.class_config()?.add_annotation(annotation(QUALIFIER))?;
                    Ok(())
                }),
            ExtensionMethod::new("check")
                .phase(Phase::Validation)
                .role(ParameterRole::AppArchive)
                .invoke(move |call| {
                    for class in names(&call.archive()?.classes().annotated_with(QUALIFIER).find()?) {
                        recorder.record(class);
                    }
                    Ok(())
                }),
        ],
    );

    Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();

    assert_eq!(seen.entries(), vec![AUDIT]);
}

#[test]
fn query_callbacks_run_once_per_match() {
    let log = CallLog::new();
    let recorder = log.clone();
    let registry = scripted(
        "app::PerClass",
        vec![ExtensionMethod::new("each")
            .phase(Phase::Enhancement)
            .role(ParameterRole::ClassInfo)
            .constraint(Constraint::subtypes_of(SERVICE))
            .invoke(move |call| {
                recorder.record(call.class_info()?.name().to_string());
                Ok(())
            })],
    );

    Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();

    let mut entries = log.entries();
    entries.sort();
    assert_eq!(entries, vec![MAIL, SMS]);
}

#[test]
fn enhancement_freezes_and_invalidates_the_overlay() {
    let plan = ExtensionRegistry::new().discover().unwrap();
    let resolver = StaticDeployment::empty();
    let runner = PhaseRunner::new(&plan, &resolver);
    let mut context = BuildContext::new(sample_index(), PipelineConfig::new());
    let audit = DeclarationKey::from(ClassKey::new(AUDIT));

    runner.run(&mut context, Phase::Discovery).unwrap();
    assert!(context.registry().overlays().annotations(&audit).is_ok());

    runner.run(&mut context, Phase::Enhancement).unwrap();
    assert_eq!(
        context.registry().overlays().annotations(&audit).unwrap_err(),
        OverlayError::Invalidated
    );
    assert_eq!(
        context.registry().add_by_key(&audit, annotation(QUALIFIER)).unwrap_err(),
        TransformError::Frozen
    );
    assert!(context.frozen().is_some());
    assert!(context.source().annotations(&audit).is_ok());
}

#[test]
fn failing_enhancement_still_freezes() {
    let registry = scripted(
        "app::Failing",
        vec![ExtensionMethod::new("explode")
            .phase(Phase::Enhancement)
            .invoke(|_| anyhow::bail!("boom"))],
    );
    let plan = registry.discover().unwrap();
    let resolver = StaticDeployment::empty();
    let runner = PhaseRunner::new(&plan, &resolver);
    let mut context = BuildContext::new(sample_index(), PipelineConfig::new());

    runner.run(&mut context, Phase::Discovery).unwrap();
    let err = runner.run(&mut context, Phase::Enhancement).unwrap_err();

    match err {
        BuildError::Callback {
            phase,
            extension,
            method,
            source,
        } => {
            assert_eq!(phase, Phase::Enhancement);
            assert_eq!(extension, "app::Failing");
            assert_eq!(method, "explode");
            assert_eq!(source.to_string(), "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(context.registry().is_frozen());
    assert!(!context.registry().overlays().is_valid());
    assert!(matches!(
        runner.run(&mut context, Phase::Enhancement),
        Err(BuildError::PhaseOrder { .. })
    ));
}

#[test]
fn meta_annotation_configuration_runs_before_enhancement_callbacks() {
    let seen = CallLog::new();
    let recorder = seen.clone();
    let registry = scripted(
        "app::Meta",
        vec![
            ExtensionMethod::new("register")
                .phase(Phase::Discovery)
                .role(ParameterRole::MetaAnnotations)
                .role(ParameterRole::ScannedClasses)
                .invoke(|call| {
                    call.meta_annotations()?.add_qualifier(NAMED, |config| {
                        config.add_annotation(AnnotationInstance::new("app.Marker"))?;
                        Ok(())
                    });
                    call.meta_annotations()?.add_context("app.Session", "app.SessionContext", true);
                    call.scanned_classes()?.add("app.Extra");
                    Ok(())
                }),
            ExtensionMethod::new("observe")
                .phase(Phase::Enhancement)
                .role(ParameterRole::AppArchiveConfig)
                .invoke(move |call| {
                    for class in names(&call.archive_config()?.classes().annotated_with("app.Marker").find()?) {
                        recorder.record(class);
                    }
                    Ok(())
                }),
        ],
    );

    let outcome = Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();

    assert_eq!(seen.entries(), vec![NAMED]);
    assert_eq!(outcome.meta_annotations, vec![(MetaKind::Qualifier, TypeName::new(NAMED))]);
    assert_eq!(outcome.scanned_classes, vec![TypeName::new("app.Extra")]);
    assert_eq!(outcome.contexts.len(), 1);
}

fn synthesis(creator: Option<&'static str>) -> ExtensionMethod {
    ExtensionMethod::new("synthesize")
        .phase(Phase::Synthesis)
        .role(ParameterRole::SyntheticComponents)
        .invoke(move |call| {
            let components = call.synthetic_components()?;
            let bean = components
                .add_bean(MAIL)
                .bean_type(Type::class(SERVICE))
                .qualifier(annotation(QUALIFIER))
                .with_param("retries", 3);
            if let Some(creator) = creator {
                let _ = bean.create_with(creator);
            }
            let _ = components.add_observer(Type::class("app.Started")).observe_with("app.StartObserver");
            Ok(())
        })
}

#[test]
fn synthetic_components_join_the_deployment_and_the_output() {
    let seen = CallLog::new();
    let recorder = seen.clone();
    let registry = scripted(
        "app::Synth",
        vec![
            synthesis(Some("app.MailCreator")),
            ExtensionMethod::new("beans")
                .phase(Phase::Validation)
                .role(ParameterRole::BeanInfo)
                .constraint(Constraint::exact(SERVICE).annotated_with(QUALIFIER))
                .invoke(move |call| {
                    recorder.record(call.bean()?.id.clone());
                    Ok(())
                }),
        ],
    );
    let resolver = StaticDeployment::new(Deployment::new(
        vec![BeanInfo::class_bean("sms", SMS, "app.Singleton").with_type(Type::class(SERVICE))],
        vec![],
    ));
    let output = CollectingOutput::new();

    let outcome = Pipeline::new(sample_index(), registry)
        .with_resolver(resolver)
        .run(&output)
        .unwrap();

    assert_eq!(seen.entries(), vec!["synthetic-bean-0"]);
    assert_eq!(outcome.synthetic_beans.len(), 1);
    assert_eq!(outcome.synthetic_observers[0].declaring_class, TypeName::new("app.Synth"));

    let written: Vec<String> = output.class_names().iter().map(ToString::to_string).collect();
    assert_eq!(written[0], "app.Q_Shared_AnnotationLiteral");
    let components = &written[1];
    assert!(components.starts_with(&format!("anvil.generated.SyntheticComponents_{}", outcome.build_id)));
    assert_eq!(
        output.services(),
        vec![(TypeName::new("anvil.runtime.ComponentsProvider"), TypeName::new(components.as_str()))]
    );

    let json: serde_json::Value = serde_json::from_slice(&output.class(components).unwrap()).unwrap();
    assert_eq!(json["beans"][0]["creator"], "app.MailCreator");
    assert_eq!(json["beans"][0]["params"]["retries"], 3);
    assert_eq!(json["beans"][0]["qualifier_literals"][0]["class"], "app.Q_Shared_AnnotationLiteral");
}

#[test]
fn synthetic_bean_without_creator_fails_synthesis() {
    let registry = scripted("app::Synth", vec![synthesis(None)]);

    let err = Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Synthesis));
    assert!(err.to_string().contains("has no creator"));
}

#[test]
fn one_off_literals_land_in_the_generated_package() {
    let registry = scripted("app::Synth", vec![synthesis(Some("app.MailCreator"))]);
    let output = CollectingOutput::new();

    let outcome = Pipeline::new(sample_index(), registry)
        .with_config(PipelineConfig::new().with_shared_literals(false))
        .run(&output)
        .unwrap();

    let literal = output.class_names()[0].to_string();
    assert!(literal.starts_with("anvil.generated.Q"));
    assert!(literal.ends_with("_AnnotationLiteral"));
    assert_eq!(outcome.literals.one_off_classes, 1);
}

#[test]
fn unknown_qualifier_type_is_a_literal_error() {
    let registry = scripted(
        "app::Synth",
        vec![ExtensionMethod::new("synthesize")
            .phase(Phase::Synthesis)
            .role(ParameterRole::SyntheticComponents)
            .invoke(|call| {
                let _ = call
                    .synthetic_components()?
                    .add_bean(MAIL)
                    .qualifier(annotation("app.Unindexed"))
                    .create_with("app.MailCreator");
                Ok(())
            })],
    );

    let err = Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap_err();

    assert!(matches!(err, BuildError::Literal(_)));
}

#[test]
fn fast_annotated_fields_are_configurable() {
    let registry = scripted(
        "app::Fields",
        vec![
            ExtensionMethod::new("mark")
                .phase(Phase::Enhancement)
                .role(ParameterRole::FieldConfig)
                .constraint(Constraint::subtypes_of(SERVICE).annotated_with(FAST))
                .invoke(|call| {
                    call.field_config()?.add_annotation(annotation(QUALIFIER))?;
                    Ok(())
                }),
            ExtensionMethod::new("check")
                .phase(Phase::Validation)
                .role(ParameterRole::AppArchive)
                .role(ParameterRole::Messages)
                .invoke(|call| {
                    let fields = call.archive()?.fields().annotated_with(QUALIFIER).find()?;
                    if fields.len() != 1 || fields[0].name() != "host" {
                        call.messages()?.error("expected app.Mail#host to carry @Q", None);
                    }
                    Ok(())
                }),
        ],
    );

    Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();
}

proptest! {
    #[test]
    fn prop_priorities_run_ascending_within_each_phase(priorities in proptest::collection::vec(-50i32..50, 1..8)) {
        let log = CallLog::new();
        let mut extension = RecordingExtension::new(log.clone());
        for (n, priority) in priorities.iter().enumerate() {
            extension = extension.callback(&format!("p{priority}_{n}"), Phase::Validation, Some(*priority));
        }
        let mut registry = ExtensionRegistry::new();
        registry.register_instance(extension);

        Pipeline::new(sample_index(), registry).run(&CollectingOutput::new()).unwrap();

        let ran: Vec<i32> = log
            .entries()
            .iter()
            .map(|entry| entry["validation:p".len()..].split('_').next().unwrap().parse().unwrap())
            .collect();
        let mut expected = priorities.clone();
        expected.sort_unstable();
        prop_assert_eq!(ran, expected);
    }
}

/// Class beans for every class carrying `@Q`, qualified by its `@Q` and
/// `@Named` as currently annotated, plus one `@Fast` observer on `Mail`
struct QualifiedClassBeans;

impl anvil_core::DeploymentResolver for QualifiedClassBeans {
    fn resolve(&self, annotations: &dyn AnnotationSource) -> anyhow::Result<Deployment> {
        let qualifier_types = [TypeName::new(QUALIFIER), TypeName::new(NAMED)];
        let mut beans = Vec::new();
        for key in annotations.declarations_with(&TypeName::new(QUALIFIER))? {
            let DeclarationKey::Class(class) = &key else {
                continue;
            };
            let mut bean = BeanInfo::class_bean(class.name().simple_name().to_lowercase(), class.name(), "app.Dependent");
            for qualifier in annotations.annotations(&key)?.iter() {
                if qualifier_types.contains(qualifier.name()) {
                    bean = bean.with_qualifier(qualifier.clone());
                }
            }
            beans.push(bean);
        }
        let observer = ObserverInfo::method_observer(
            "mail-started",
            MethodKey::new(MAIL, "send", vec![Type::class("java.lang.String")]),
            Type::class("app.Started"),
        )
        .with_qualifier(annotation(FAST));
        Ok(Deployment::new(beans, vec![observer]))
    }
}

fn qualifying_services() -> ExtensionRegistry {
    scripted(
        "app::Qualify",
        vec![ExtensionMethod::new("qualify")
            .phase(Phase::Enhancement)
            .role(ParameterRole::ClassConfig)
            .constraint(Constraint::subtypes_of(SERVICE))
            .invoke(|call| {
                let class = call.class_config()?;
                class.add_annotation(annotation(QUALIFIER))?;
                if class.info().name().as_str() == MAIL {
                    class.add_annotation(annotation(NAMED).with_value("primary"))?;
                }
                Ok(())
            })],
    )
}

#[test]
fn qualifiers_added_in_enhancement_become_literal_classes() {
    let output = CollectingOutput::new();

    let outcome = Pipeline::new(sample_index(), qualifying_services())
        .with_resolver(QualifiedClassBeans)
        .with_config(PipelineConfig::new().with_shared_literals(false))
        .run(&output)
        .unwrap();

    let mut written: Vec<String> = output.class_names().iter().map(ToString::to_string).collect();
    written.sort();
    assert_eq!(written.len(), 3);
    for (name, simple) in written.iter().zip(["Fast", "Named", "Q"]) {
        assert!(name.starts_with(&format!("app.{simple}")), "{name}");
        assert!(name.ends_with("_AnnotationLiteral"), "{name}");
        assert!(!name.contains("_Shared"), "{name}");
    }
    assert_eq!(outcome.literals.one_off_classes, 3);

    let literals = &outcome.qualifier_literals;
    assert_eq!(literals.beans["mail"].len(), 2);
    assert_eq!(literals.beans["sms"].len(), 1);
    assert_eq!(literals.beans["mail"][0], literals.beans["sms"][0]);
    assert_eq!(literals.observers["mail-started"].len(), 1);
    assert_eq!(literals.len(), 4);
}

#[test]
fn shared_qualifier_literals_are_written_once_per_type() {
    let output = CollectingOutput::new();

    let outcome = Pipeline::new(sample_index(), qualifying_services())
        .with_resolver(QualifiedClassBeans)
        .run(&output)
        .unwrap();

    let mut written: Vec<String> = output.class_names().iter().map(ToString::to_string).collect();
    written.sort();
    assert_eq!(
        written,
        vec![
            "app.Fast_Shared_AnnotationLiteral",
            "app.Named_Shared_AnnotationLiteral",
            "app.Q_Shared_AnnotationLiteral",
        ]
    );
    assert_eq!(
        outcome.qualifier_literals.beans["mail"][1].instantiated_class(),
        Some(&TypeName::new("app.Named_Shared_AnnotationLiteral"))
    );
    assert!(output.services().is_empty());
}

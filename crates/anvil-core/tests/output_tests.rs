use anvil_core::{BuildError, ComponentsClass, JsonClassGenerator, OutputSink, Pipeline, PipelineConfig};
use anvil_extension::{Extension, ExtensionMethod, ExtensionRegistry, ParameterRole, Phase};
use anvil_literal::GeneratedClass;
use anvil_model::{Type, TypeName};
use anvil_test_utils::{annotation, sample_index, MAIL, NAMED, QUALIFIER, SERVICE};
use mockall::mock;
use mockall::predicate::eq;

mock! {
    Sink {}

    impl OutputSink for Sink {
        fn write_class(&self, name: &TypeName, bytes: &[u8]) -> anyhow::Result<()>;
        fn write_service_provider(&self, interface: &TypeName, implementation: &TypeName) -> anyhow::Result<()>;
    }
}

#[derive(Default)]
struct Synth;

impl Extension for Synth {
    fn methods(&self) -> Vec<ExtensionMethod> {
        vec![ExtensionMethod::new("synthesize")
            .phase(Phase::Synthesis)
            .role(ParameterRole::SyntheticComponents)
            .invoke(|call| {
                let components = call.synthetic_components()?;
                let _ = components
                    .add_bean(MAIL)
                    .bean_type(Type::class(SERVICE))
                    .qualifier(annotation(QUALIFIER))
                    .qualifier(annotation(NAMED).with_value("primary"))
                    .create_with("app.MailCreator");
                Ok(())
            })]
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(sample_index(), ExtensionRegistry::new().with::<Synth>())
}

#[test]
fn sink_receives_literals_components_and_service_entry() {
    let mut sink = MockSink::new();
    sink.expect_write_class()
        .withf(|name, bytes| name.as_str().ends_with("_Shared_AnnotationLiteral") && !bytes.is_empty())
        .times(2)
        .returning(|_, _| Ok(()));
    sink.expect_write_class()
        .withf(|name, _| name.as_str().starts_with("anvil.generated.SyntheticComponents_"))
        .times(1)
        .returning(|_, _| Ok(()));
    sink.expect_write_service_provider()
        .withf(|interface, implementation| {
            interface.as_str() == "anvil.runtime.ComponentsProvider"
                && implementation.as_str().starts_with("anvil.generated.SyntheticComponents_")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = pipeline().run(&sink).unwrap();

    assert_eq!(outcome.written_classes.len(), 3);
    assert_eq!(outcome.literals.shared.entry_count, 2);
}

#[test]
fn nothing_is_written_without_synthetic_components() {
    let mut sink = MockSink::new();
    sink.expect_write_class().never();
    sink.expect_write_service_provider().never();

    let outcome = Pipeline::new(sample_index(), ExtensionRegistry::new()).run(&sink).unwrap();

    assert!(outcome.written_classes.is_empty());
}

#[test]
fn sink_failures_name_the_class() {
    let mut sink = MockSink::new();
    sink.expect_write_class()
        .with(eq(TypeName::new("app.Q_Shared_AnnotationLiteral")), mockall::predicate::always())
        .returning(|_, _| Err(anyhow::anyhow!("disk full")));
    sink.expect_write_class()
        .withf(|name, _| name.as_str() != "app.Q_Shared_AnnotationLiteral")
        .returning(|_, _| Ok(()));

    let err = pipeline().run(&sink).unwrap_err();

    match err {
        BuildError::Output { name, source } => {
            assert_eq!(name, "app.Q_Shared_AnnotationLiteral");
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("unexpected error: {other}"),
    }
}

struct Rejecting;

impl anvil_core::ClassGenerator for Rejecting {
    fn literal(&self, class: &GeneratedClass) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("cannot render {}", class.name)
    }

    fn components(&self, _class: &ComponentsClass) -> anyhow::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[test]
fn generator_failures_abort_before_writing() {
    let mut sink = MockSink::new();
    sink.expect_write_class().never();

    let err = pipeline().with_generator(Rejecting).run(&sink).unwrap_err();

    assert!(matches!(err, BuildError::Output { .. }));
}

#[test]
fn pretty_generator_and_toml_config_drive_the_build() {
    let config = PipelineConfig::from_toml_str(
        r#"
        generated_package = "com.acme.generated"
        application_packages = ["app"]
        "#,
    )
    .unwrap();
    let mut sink = MockSink::new();
    sink.expect_write_class()
        .withf(|name, _| name.as_str().ends_with("_Shared_AnnotationLiteral"))
        .returning(|_, _| Ok(()));
    sink.expect_write_class()
        .withf(|name, bytes| {
            name.as_str().starts_with("com.acme.generated.SyntheticComponents_")
                && String::from_utf8_lossy(bytes).contains("\n  \"beans\"")
        })
        .times(1)
        .returning(|_, _| Ok(()));
    sink.expect_write_service_provider().times(1).returning(|_, _| Ok(()));

    pipeline()
        .with_config(config)
        .with_generator(JsonClassGenerator::pretty())
        .run(&sink)
        .unwrap();
}

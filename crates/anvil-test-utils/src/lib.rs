//! Testing utilities for anvil workspace
//!
//! Shared fixtures, a recording extension and an in-memory output sink.

#![allow(missing_docs)]

use anvil_core::OutputSink;
use anvil_extension::{Extension, ExtensionMethod, Invocation, Phase};
use anvil_index::{DeclarationIndex, IndexBuilder};
use anvil_model::{AnnotationInstance, ClassBuilder, ClassInfo, ClassKind, FieldInfo, MethodInfo, Type, TypeName};
use parking_lot::Mutex;
use std::sync::Arc;

pub const QUALIFIER: &str = "app.Q";
pub const NAMED: &str = "app.Named";
pub const FAST: &str = "app.Fast";
pub const SERVICE: &str = "app.Service";
pub const MAIL: &str = "app.Mail";
pub const SMS: &str = "app.Sms";
pub const AUDIT: &str = "app.Audit";

pub fn annotation(name: &str) -> AnnotationInstance {
    AnnotationInstance::new(name)
}

pub fn class(name: &str) -> ClassBuilder {
    ClassInfo::builder(name)
}

pub fn annotation_type(name: &str) -> ClassBuilder {
    class(name).kind(ClassKind::Annotation)
}

/// Annotation types `Q`, `Named` and `Fast`, service interface `Service`
/// with implementors `Mail` (annotated `@Fast`) and `Sms`, and an
/// unrelated `Audit` class.
pub fn sample_index() -> Arc<DeclarationIndex> {
    let java_string = Type::class("java.lang.String");
    Arc::new(
        IndexBuilder::new()
            .with_class(annotation_type(QUALIFIER).build())
            .with_class(
                annotation_type(NAMED)
                    .method(MethodInfo::builder("value").returns(java_string.clone()).default_value(""))
                    .build(),
            )
            .with_class(annotation_type(FAST).build())
            .with_class(class(SERVICE).kind(ClassKind::Interface).build())
            .with_class(
                class(MAIL)
                    .implements(SERVICE)
                    .annotate(annotation(FAST))
                    .method(MethodInfo::builder("send").parameter(java_string.clone()))
                    .field(FieldInfo::builder("host", java_string))
                    .build(),
            )
            .with_class(class(SMS).implements(SERVICE).build())
            .with_class(class(AUDIT).build())
            .build()
            .unwrap(),
    )
}

/// Shared log of callback invocations, `"<phase>:<method>"` per entry
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Extension whose callbacks only record that they ran
#[derive(Debug, Default)]
pub struct RecordingExtension {
    log: CallLog,
    callbacks: Vec<(String, Phase, Option<i32>)>,
}

impl RecordingExtension {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            callbacks: Vec::new(),
        }
    }

    pub fn callback(mut self, name: &str, phase: Phase, priority: Option<i32>) -> Self {
        self.callbacks.push((name.to_owned(), phase, priority));
        self
    }
}

impl Extension for RecordingExtension {
    fn name(&self) -> &str {
        "anvil_test_utils::RecordingExtension"
    }

    fn methods(&self) -> Vec<ExtensionMethod> {
        self.callbacks
            .iter()
            .map(|(name, phase, priority)| {
                let log = self.log.clone();
                let method = ExtensionMethod::new(name.as_str()).phase(*phase).invoke(move |call: &Invocation<'_>| {
                    log.record(format!("{}:{}", call.phase(), call.method()));
                    Ok(())
                });
                match priority {
                    Some(priority) => method.priority(*priority),
                    None => method,
                }
            })
            .collect()
    }
}

/// Output sink keeping everything in memory
#[derive(Debug, Default)]
pub struct CollectingOutput {
    classes: Mutex<Vec<(TypeName, Vec<u8>)>>,
    services: Mutex<Vec<(TypeName, TypeName)>>,
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_names(&self) -> Vec<TypeName> {
        self.classes.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn class(&self, name: &str) -> Option<Vec<u8>> {
        self.classes
            .lock()
            .iter()
            .find(|(written, _)| written.as_str() == name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn services(&self) -> Vec<(TypeName, TypeName)> {
        self.services.lock().clone()
    }
}

impl OutputSink for CollectingOutput {
    fn write_class(&self, name: &TypeName, bytes: &[u8]) -> anyhow::Result<()> {
        self.classes.lock().push((name.clone(), bytes.to_vec()));
        Ok(())
    }

    fn write_service_provider(&self, interface: &TypeName, implementation: &TypeName) -> anyhow::Result<()> {
        self.services.lock().push((interface.clone(), implementation.clone()));
        Ok(())
    }
}

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are ignored
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

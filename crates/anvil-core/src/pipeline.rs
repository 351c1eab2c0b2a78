//! Build pipeline entry point

use crate::components::{
    components_class_name, ComponentsClass, QualifierLiterals, SyntheticBeanRecord, SyntheticObserverRecord,
};
use crate::config::PipelineConfig;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::outcome::BuildOutcome;
use crate::output::{ClassGenerator, JsonClassGenerator, OutputSink, COMPONENTS_PROVIDER};
use crate::resolver::{DeploymentResolver, StaticDeployment};
use crate::runner::PhaseRunner;
use anvil_extension::{ExtensionRegistry, Phase};
use anvil_index::DeclarationIndex;
use anvil_literal::{ClassOutput, CollectedClasses, LiteralCompiler, ValueHandle};
use anvil_model::{AnnotationInstance, BeanKind, TypeName};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One configured build: index, extensions, resolver and renderer
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use anvil_core::{Pipeline, PipelineConfig};
/// use anvil_extension::ExtensionRegistry;
/// use anvil_index::IndexBuilder;
///
/// struct Discard;
///
/// impl anvil_core::OutputSink for Discard {
///     fn write_class(&self, _: &anvil_model::TypeName, _: &[u8]) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn write_service_provider(&self, _: &anvil_model::TypeName, _: &anvil_model::TypeName) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let index = Arc::new(IndexBuilder::new().build().unwrap());
/// let outcome = Pipeline::new(index, ExtensionRegistry::new())
///     .with_config(PipelineConfig::new())
///     .run(&Discard)
///     .unwrap();
/// assert!(outcome.written_classes.is_empty());
/// ```
pub struct Pipeline {
    index: Arc<DeclarationIndex>,
    extensions: ExtensionRegistry,
    config: PipelineConfig,
    resolver: Arc<dyn DeploymentResolver>,
    generator: Arc<dyn ClassGenerator>,
}

impl Pipeline {
    /// Pipeline over `index` running `extensions`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>, extensions: ExtensionRegistry) -> Self {
        Self {
            index,
            extensions,
            config: PipelineConfig::default(),
            resolver: Arc::new(StaticDeployment::empty()),
            generator: Arc::new(JsonClassGenerator::new()),
        }
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// With deployment resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl DeploymentResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// With class renderer
    #[must_use]
    pub fn with_generator(mut self, generator: impl ClassGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all four phases, then write generated classes to `sink`
    ///
    /// Every callback is validated before the first one runs. Nothing is
    /// written unless every phase succeeds.
    ///
    /// # Errors
    ///
    /// The first [`BuildError`] encountered; see [`PhaseRunner::run`].
    pub fn run(&self, sink: &dyn OutputSink) -> Result<BuildOutcome, BuildError> {
        let mut context = BuildContext::new(Arc::clone(&self.index), self.config.clone());
        let span = tracing::info_span!("build", id = %context.id());
        let _guard = span.enter();

        let plan = self.extensions.discover()?;
        tracing::info!(
            extensions = self.extensions.len(),
            callbacks = plan.len(),
            classes = self.index.len(),
            "Build started"
        );

        let runner = PhaseRunner::new(&plan, &*self.resolver);
        for phase in Phase::ALL {
            runner.run(&mut context, phase)?;
        }

        let literals = self.literal_compiler();
        let collected = CollectedClasses::new();
        let mut qualifiers = QualifierCompiler::new(&literals, &collected);
        let components = self.components(&context, &mut qualifiers)?;
        let qualifier_literals = deployment_literals(&context, &mut qualifiers)?;

        let mut written = Vec::new();
        let existing: HashSet<TypeName> = self.index.classes().map(|c| c.name().clone()).collect();
        let mut classes = collected.take();
        classes.extend(literals.generate(&existing));
        for class in &classes {
            let bytes = self.generator.literal(class).map_err(|source| output_error(&class.name, source))?;
            sink.write_class(&class.name, &bytes)
                .map_err(|source| output_error(&class.name, source))?;
            written.push(class.name.clone());
        }

        if !components.is_empty() {
            let bytes = self
                .generator
                .components(&components)
                .map_err(|source| output_error(&components.name, source))?;
            sink.write_class(&components.name, &bytes)
                .map_err(|source| output_error(&components.name, source))?;
            let provider = TypeName::new(COMPONENTS_PROVIDER);
            sink.write_service_provider(&provider, &components.name)
                .map_err(|source| output_error(&provider, source))?;
            written.push(components.name.clone());
        }

        let outcome = BuildOutcome {
            build_id: context.id(),
            messages: context.messages().all(),
            scanned_classes: context.scanned().classes(),
            meta_annotations: context.meta().registered(),
            contexts: context.meta().contexts(),
            synthetic_beans: context.synthetic().beans(),
            synthetic_observers: context.synthetic().observers(),
            written_classes: written,
            qualifier_literals,
            literals: literals.stats(),
        };
        tracing::info!(
            written = outcome.written_classes.len(),
            messages = outcome.messages.len(),
            warnings = outcome.warnings(),
            "Build finished"
        );
        Ok(outcome)
    }

    fn literal_compiler(&self) -> LiteralCompiler {
        let config = self.config.clone();
        LiteralCompiler::new(Arc::clone(&self.index), self.config.shared_literals)
            .with_generated_package(self.config.generated_package.clone())
            .with_application_classes(move |name| config.is_application_class(name))
    }

    /// Compile every synthetic component's qualifiers into the components class
    fn components(
        &self,
        context: &BuildContext,
        qualifiers: &mut QualifierCompiler<'_>,
    ) -> Result<ComponentsClass, BuildError> {
        let package = self.config.generated_package.as_str();

        let beans = context
            .synthetic()
            .beans()
            .into_iter()
            .map(|bean| {
                Ok(SyntheticBeanRecord {
                    qualifier_literals: qualifiers.compile(&bean.qualifiers, package)?,
                    bean,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;
        let observers = context
            .synthetic()
            .observers()
            .into_iter()
            .map(|observer| {
                Ok(SyntheticObserverRecord {
                    qualifier_literals: qualifiers.compile(&observer.qualifiers, package)?,
                    observer,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        Ok(ComponentsClass {
            name: components_class_name(package, context.id()),
            build: context.id(),
            beans,
            observers,
            contexts: context.meta().contexts(),
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("extensions", &self.extensions)
            .field("config", &self.config)
            .field("classes", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// Compile the qualifiers of every resolved bean and observer
///
/// The deployment was resolved from the frozen annotations, so its qualifiers
/// already carry every Enhancement edit. Literals target the package of the
/// declaring class. Synthetic components are compiled with the components
/// class instead.
fn deployment_literals(
    context: &BuildContext,
    qualifiers: &mut QualifierCompiler<'_>,
) -> Result<QualifierLiterals, BuildError> {
    let mut compiled = QualifierLiterals::default();
    for bean in context.deployment().beans() {
        if bean.kind == BeanKind::Synthetic || bean.qualifiers.is_empty() {
            continue;
        }
        let handles = qualifiers.compile(&bean.qualifiers, bean.declaring_class.package())?;
        compiled.beans.insert(bean.id.clone(), handles);
    }
    for observer in context.deployment().observers() {
        if observer.is_synthetic || observer.qualifiers.is_empty() {
            continue;
        }
        let handles = qualifiers.compile(&observer.qualifiers, observer.declaring_class.package())?;
        compiled.observers.insert(observer.id.clone(), handles);
    }
    tracing::debug!(
        beans = compiled.beans.len(),
        observers = compiled.observers.len(),
        qualifiers = compiled.len(),
        "Deployment qualifiers compiled"
    );
    Ok(compiled)
}

/// Materializes qualifiers once per instance and target package
struct QualifierCompiler<'a> {
    literals: &'a LiteralCompiler,
    output: &'a dyn ClassOutput,
    compiled: HashMap<(AnnotationInstance, String), ValueHandle>,
}

impl<'a> QualifierCompiler<'a> {
    fn new(literals: &'a LiteralCompiler, output: &'a dyn ClassOutput) -> Self {
        Self {
            literals,
            output,
            compiled: HashMap::new(),
        }
    }

    fn compile(&mut self, qualifiers: &[AnnotationInstance], package: &str) -> Result<Vec<ValueHandle>, BuildError> {
        qualifiers
            .iter()
            .map(|qualifier| {
                let key = (qualifier.clone(), package.to_owned());
                if let Some(handle) = self.compiled.get(&key) {
                    return Ok(handle.clone());
                }
                let handle = self.literals.materialize_instance(self.output, qualifier, package)?;
                self.compiled.insert(key, handle.clone());
                Ok(handle)
            })
            .collect()
    }
}

fn output_error(name: &TypeName, source: anyhow::Error) -> BuildError {
    BuildError::Output {
        name: name.to_string(),
        source,
    }
}

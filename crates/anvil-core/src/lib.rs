//! anvil Core - Build pipeline
//!
//! Runs registered extensions through the four build phases:
//! - Discovery: scanned classes and meta-annotations
//! - Enhancement: annotation transformations, frozen when the phase ends
//! - Synthesis: synthetic beans and observers
//! - Validation: checks over the final deployment
//!
//! After the last phase, annotation literal classes and the synthetic
//! components class are rendered and written to an [`OutputSink`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use anvil_core::{BuildContext, PhaseRunner, PipelineConfig, StaticDeployment};
//! use anvil_extension::{ExtensionRegistry, Phase};
//! use anvil_index::IndexBuilder;
//!
//! let index = Arc::new(IndexBuilder::new().build().unwrap());
//! let plan = ExtensionRegistry::new().discover().unwrap();
//! let resolver = StaticDeployment::empty();
//! let runner = PhaseRunner::new(&plan, &resolver);
//!
//! let mut context = BuildContext::new(index, PipelineConfig::new());
//! assert!(runner.run(&mut context, Phase::Validation).is_err());
//! runner.run(&mut context, Phase::Discovery).unwrap();
//! ```

#![warn(missing_docs)]

pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod runner;

pub use components::{
    components_class_name, ComponentsClass, QualifierLiterals, SyntheticBeanRecord, SyntheticObserverRecord,
};
pub use config::PipelineConfig;
pub use context::BuildContext;
pub use error::BuildError;
pub use outcome::{BuildId, BuildOutcome};
pub use output::{ClassGenerator, JsonClassGenerator, OutputSink, COMPONENTS_PROVIDER};
pub use pipeline::Pipeline;
pub use resolver::{DeploymentResolver, StaticDeployment};
pub use runner::PhaseRunner;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

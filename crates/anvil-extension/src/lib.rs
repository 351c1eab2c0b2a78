//! anvil Extension Model
//!
//! Extensions contribute callbacks to four ordered build phases. Each
//! callback declares the parameters it needs as [`ParameterRole`]s; the
//! pipeline resolves them to [`Argument`]s and invokes the callback once,
//! or once per match when a query role is declared.
//!
//! # Example
//!
//! ```rust
//! use anvil_extension::{Constraint, Extension, ExtensionMethod, ExtensionRegistry, ParameterRole, Phase};
//!
//! #[derive(Default)]
//! struct Audit;
//!
//! impl Extension for Audit {
//!     fn methods(&self) -> Vec<ExtensionMethod> {
//!         vec![ExtensionMethod::new("mark")
//!             .phase(Phase::Enhancement)
//!             .role(ParameterRole::ClassConfig)
//!             .constraint(Constraint::subtypes_of("com.acme.Service"))
//!             .invoke(|call| {
//!                 let class = call.class_config()?;
//!                 class.add_annotation(anvil_model::AnnotationInstance::new("com.acme.Audited"))?;
//!                 Ok(())
//!             })]
//!     }
//! }
//!
//! let plan = ExtensionRegistry::new().with::<Audit>().discover().unwrap();
//! assert_eq!(plan.callbacks(Phase::Enhancement).len(), 1);
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod argument;
pub mod constraint;
pub mod error;
pub mod extension;
pub mod method;
pub mod phase;
pub mod registry;
pub mod role;

pub use argument::{Argument, Invocation};
pub use constraint::Constraint;
pub use error::ConfigurationError;
pub use extension::{extension_class, Extension};
pub use method::{ExtensionMethod, Invoker};
pub use phase::Phase;
pub use registry::{Callback, CallbackPlan, ExtensionRegistry};
pub use role::ParameterRole;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! anvil Annotation Literals
//!
//! Turns annotation instances known at build time into instructions that
//! recreate them at runtime, together with descriptors of the literal
//! classes those instructions instantiate.
//!
//! # Example
//!
//! ```rust
//! use anvil_index::IndexBuilder;
//! use anvil_literal::{CollectedClasses, LiteralCompiler};
//! use anvil_model::{AnnotationInstance, ClassInfo, ClassKind, MethodInfo, PrimitiveKind, Type};
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! let index = IndexBuilder::new()
//!     .with_class(
//!         ClassInfo::builder("com.acme.Retry")
//!             .kind(ClassKind::Annotation)
//!             .method(MethodInfo::builder("times").returns(Type::primitive(PrimitiveKind::Int)))
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//! let compiler = LiteralCompiler::new(Arc::new(index), true);
//! let output = CollectedClasses::new();
//!
//! let handle = compiler
//!     .materialize_instance(&output, &AnnotationInstance::new("com.acme.Retry").with("times", 3), "com.app")
//!     .unwrap();
//! assert_eq!(
//!     handle.instantiated_class().unwrap().as_str(),
//!     "com.acme.Retry_Shared_AnnotationLiteral"
//! );
//! assert_eq!(compiler.generate(&HashSet::new()).len(), 1);
//! ```

#![warn(missing_docs)]

mod cache;
pub mod class;
pub mod compiler;
pub mod error;
pub mod handle;
pub mod naming;

pub use cache::CacheStats;
pub use class::{
    ClassOutput, CollectedClasses, GeneratedClass, GeneratedField, GeneratedMethod, MethodBody, StaticInit,
};
pub use compiler::{ApplicationClassPredicate, LiteralCompiler, LiteralStats};
pub use error::LiteralError;
pub use handle::{Constant, EmptyArrayKind, ValueHandle};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! anvil Declaration Index
//!
//! Immutable, queryable corpus of classes, methods, fields and parameters
//! together with their original annotations.
//!
//! # Overview
//!
//! - [`DeclarationIndex`]: lookups, hierarchy traversal, annotation reverse index
//! - [`IndexBuilder`]: validated construction
//!
//! # Example
//!
//! ```rust
//! use anvil_index::IndexBuilder;
//! use anvil_model::{ClassInfo, TypeName};
//!
//! let index = IndexBuilder::new()
//!     .with_class(ClassInfo::builder("com.acme.Base").build())
//!     .with_class(ClassInfo::builder("com.acme.Impl").extends("com.acme.Base").build())
//!     .build()
//!     .unwrap();
//!
//! let subtypes = index.all_subtypes(&TypeName::new("com.acme.Base"));
//! assert_eq!(subtypes, vec![TypeName::new("com.acme.Impl")]);
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod index;

pub use builder::IndexBuilder;
pub use error::IndexError;
pub use index::DeclarationIndex;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

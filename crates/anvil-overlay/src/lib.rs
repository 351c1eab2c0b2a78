//! anvil Annotation Overlay
//!
//! Copy-on-write view of declaration annotations plus the registry that
//! records every transformation applied to it.
//!
//! # Overview
//!
//! - [`AnnotationOverlay`] / [`AnnotationOverlays`]: lazily seeded per-kind overlays
//! - [`TransformationRegistry`]: add/remove operations, replay log, freeze
//! - [`FrozenAnnotations`]: immutable result of enhancement
//! - [`AnnotationSource`]: read access shared by live and frozen views
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use anvil_index::IndexBuilder;
//! use anvil_model::{AnnotationInstance, ClassInfo, ClassKey, TypeName};
//! use anvil_overlay::{AnnotationOverlays, AnnotationSource, TransformationRegistry};
//!
//! let index = IndexBuilder::new()
//!     .with_class(ClassInfo::builder("com.acme.Greeter").build())
//!     .build()
//!     .unwrap();
//! let registry = TransformationRegistry::new(Arc::new(AnnotationOverlays::new(Arc::new(index))));
//!
//! let greeter = ClassKey::new("com.acme.Greeter");
//! registry.add_annotation(&greeter, AnnotationInstance::new("com.acme.Q")).unwrap();
//!
//! let frozen = registry.freeze().unwrap();
//! assert!(frozen.has_annotation(&greeter.into(), &TypeName::new("com.acme.Q")).unwrap());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod frozen;
pub mod overlay;
pub mod set;
pub mod source;
pub mod target;
pub mod transformation;

pub use error::{OverlayError, TransformError};
pub use frozen::FrozenAnnotations;
pub use overlay::{AnnotationOverlay, AnnotationOverlays};
pub use set::AnnotationSet;
pub use source::AnnotationSource;
pub use target::{seed, seed_contains, OverlayKey, OverlayTarget};
pub use transformation::{
    AnnotationPredicate, AnnotationSink, RecordedTransformation, TransformOp, TransformTarget,
    TransformationRegistry,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

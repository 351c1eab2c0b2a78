//! anvil Query Builders
//!
//! Additive, lazily evaluated filters over declarations, beans and
//! observers.
//!
//! Calling a predicate method again widens its family (union); different
//! families narrow each other (intersection). Exactly one evaluation
//! strategy is chosen per query:
//!
//! 1. an exact candidate set (named classes, or declaring classes for members)
//! 2. the overlay-aware annotation reverse index
//! 3. a full scan
//!
//! Remaining families are applied as filters.
//!
//! # Example
//!
//! ```rust
//! use anvil_index::IndexBuilder;
//! use anvil_model::{AnnotationInstance, ClassInfo};
//! use anvil_overlay::FrozenAnnotations;
//! use anvil_query::QueryScope;
//! use std::sync::Arc;
//!
//! let index = IndexBuilder::new()
//!     .with_class(ClassInfo::builder("com.acme.Base").build())
//!     .with_class(
//!         ClassInfo::builder("com.acme.Impl")
//!             .extends("com.acme.Base")
//!             .annotate(AnnotationInstance::new("com.acme.Q"))
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//! let annotations = FrozenAnnotations::untransformed(Arc::new(index));
//!
//! let found = QueryScope::new(&annotations)
//!     .classes()
//!     .subtype_of("com.acme.Base")
//!     .annotated_with("com.acme.Q")
//!     .find()
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod class;
pub mod deployment;
pub mod field;
mod filter;
pub mod method;
pub mod scope;

pub use class::ClassQuery;
pub use deployment::{BeanQuery, DeploymentScope, ObserverQuery};
pub use field::FieldQuery;
pub use filter::QueryStream;
pub use method::{MethodKind, MethodQuery};
pub use scope::QueryScope;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod testing {
    use anvil_index::{DeclarationIndex, IndexBuilder};
    use anvil_model::{
        AnnotationInstance, ClassInfo, ClassKind, FieldBuilder, MethodBuilder, PrimitiveKind, Type,
    };
    use anvil_overlay::{AnnotationOverlays, FrozenAnnotations, TransformationRegistry};
    use std::sync::Arc;

    pub(crate) fn index() -> Arc<DeclarationIndex> {
        let int = Type::primitive(PrimitiveKind::Int);
        Arc::new(
            IndexBuilder::new()
                .with_class(ClassInfo::builder("q.Animal").kind(ClassKind::Interface).build())
                .with_class(ClassInfo::builder("q.Loud").kind(ClassKind::Annotation).build())
                .with_class(
                    ClassInfo::builder("q.Dog")
                        .implements("q.Animal")
                        .annotate(AnnotationInstance::new("q.Loud"))
                        .method(MethodBuilder::constructor().parameter(int.clone()))
                        .method(MethodBuilder::new("bark").annotate(AnnotationInstance::new("q.Action")))
                        .method(MethodBuilder::new("name").returns(Type::class("java.lang.String")))
                        .field(FieldBuilder::new("age", int).annotate(AnnotationInstance::new("q.Tracked")))
                        .build(),
                )
                .with_class(
                    ClassInfo::builder("q.Cat")
                        .implements("q.Animal")
                        .method(MethodBuilder::new("meow").annotate(AnnotationInstance::new("q.Action")))
                        .build(),
                )
                .with_class(
                    ClassInfo::builder("q.Owner")
                        .field(FieldBuilder::new("pet", Type::class("q.Animal")))
                        .build(),
                )
                .build()
                .unwrap(),
        )
    }

    pub(crate) fn frozen() -> FrozenAnnotations {
        FrozenAnnotations::untransformed(index())
    }

    pub(crate) fn registry() -> TransformationRegistry {
        TransformationRegistry::new(Arc::new(AnnotationOverlays::new(index())))
    }

    pub(crate) fn sorted_names(classes: &[Arc<ClassInfo>]) -> Vec<&str> {
        let mut out: Vec<_> = classes.iter().map(|c| c.name().as_str()).collect();
        out.sort_unstable();
        out
    }
}

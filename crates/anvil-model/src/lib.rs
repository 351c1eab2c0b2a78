//! anvil Declaration Model
//!
//! Structural model of the program corpus that build-time extensions
//! inspect and annotate.
//!
//! # Overview
//!
//! - [`TypeName`] and [`Type`]: names and declared types
//! - [`ClassInfo`], [`MethodInfo`], [`FieldInfo`], [`ParameterInfo`]: immutable declarations
//! - [`DeclarationKey`]: structural identity shared by every layer above
//! - [`AnnotationInstance`] / [`AnnotationValue`]: recursive annotation values
//! - [`BeanInfo`], [`ObserverInfo`], [`Deployment`]: the resolved bean graph view
//!
//! # Example
//!
//! ```rust
//! use anvil_model::{AnnotationInstance, ClassInfo, ClassKey};
//!
//! let class = ClassInfo::builder("com.acme.Greeter")
//!     .annotate(AnnotationInstance::new("com.acme.Q"))
//!     .build();
//! assert_eq!(class.key(), ClassKey::new("com.acme.Greeter"));
//! ```

#![warn(missing_docs)]

pub mod annotation;
pub mod bean;
pub mod declaration;
pub mod error;
pub mod hash;
pub mod key;
pub mod name;
pub mod types;

pub use annotation::{AnnotationInstance, AnnotationValue, ValueKind};
pub use bean::{BeanInfo, BeanKind, Deployment, ObserverInfo};
pub use declaration::{
    ClassBuilder, ClassInfo, ClassKind, FieldBuilder, FieldInfo, MethodBuilder, MethodInfo,
    ParameterInfo, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME,
};
pub use error::ModelError;
pub use hash::ContentHash;
pub use key::{ClassKey, DeclarationKey, FieldKey, MethodKey, ParameterKey};
pub use name::TypeName;
pub use types::{PrimitiveKind, Type};

/// Name of the implicit annotation member
pub const VALUE_MEMBER: &str = "value";

/// `java.lang.Class`
pub const CLASS_TYPE: &str = "java.lang.Class";

/// `java.lang.String`
pub const STRING_TYPE: &str = "java.lang.String";

/// `java.lang.Object`
pub const OBJECT_TYPE: &str = "java.lang.Object";

/// Meta-annotation marking class annotations as inherited by subclasses
pub const INHERITED: &str = "java.lang.annotation.Inherited";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

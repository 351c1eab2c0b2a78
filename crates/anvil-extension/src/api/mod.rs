//! Objects handed to extension callbacks

pub mod annotations;
pub mod archive;
pub mod config;
pub mod deployment;
pub mod messages;
pub mod meta;
pub mod scanned;
pub mod synthetic;
pub mod types;

pub use annotations::{AnnotationBuilder, Annotations};
pub use archive::{AppArchive, AppArchiveConfig};
pub use config::{ClassConfig, FieldConfig, MethodConfig, ParameterConfig};
pub use deployment::AppDeployment;
pub use messages::{Level, Message, MessageContext, Messages};
pub use meta::{Configure, ContextDescriptor, MetaAnnotations, MetaKind};
pub use scanned::ScannedClasses;
pub use synthetic::{
    ParamValue, SyntheticBean, SyntheticBeanBuilder, SyntheticComponents, SyntheticObserver,
    SyntheticObserverBuilder, SyntheticRegistry, DEFAULT_SCOPE,
};
pub use types::Types;

//! Extension trait

use crate::method::ExtensionMethod;
use anvil_model::TypeName;

/// A unit of build-time behavior
///
/// An extension lists its callbacks; the pipeline validates them up front,
/// then invokes them phase by phase. One instance serves every phase.
pub trait Extension: Send + Sync + 'static {
    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Callback descriptors
    fn methods(&self) -> Vec<ExtensionMethod>;
}

/// Class name standing in for an extension, e.g. as a declaring class
#[must_use]
pub fn extension_class(name: &str) -> TypeName {
    TypeName::new(name.replace("::", "."))
}

//! Build identity and results

use crate::components::QualifierLiterals;
use anvil_extension::api::{ContextDescriptor, Message, MetaKind, SyntheticBean, SyntheticObserver};
use anvil_literal::LiteralStats;
use anvil_model::TypeName;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique build identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildId(pub Ulid);

impl BuildId {
    /// Generate new build ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a successful build produced
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    /// Build that produced this outcome
    pub build_id: BuildId,
    /// Every reported message, in report order
    pub messages: Vec<Message>,
    /// Classes extensions asked to add to the archive
    pub scanned_classes: Vec<TypeName>,
    /// Registered qualifiers, interceptor bindings and stereotypes
    pub meta_annotations: Vec<(MetaKind, TypeName)>,
    /// Registered custom contexts
    pub contexts: Vec<ContextDescriptor>,
    /// Synthetic beans
    pub synthetic_beans: Vec<SyntheticBean>,
    /// Synthetic observers
    pub synthetic_observers: Vec<SyntheticObserver>,
    /// Names of the classes written to the sink, in write order
    pub written_classes: Vec<TypeName>,
    /// Qualifier literals of the resolved beans and observers
    pub qualifier_literals: QualifierLiterals,
    /// Literal compiler statistics
    #[serde(skip)]
    pub literals: LiteralStats,
}

impl BuildOutcome {
    /// Number of warnings reported
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.level == anvil_extension::api::Level::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_ids_sort_by_creation() {
        let first = BuildId::new();
        let second = BuildId::new();
        assert_ne!(first, second);
        assert_eq!(first.to_string().len(), 26);
    }
}

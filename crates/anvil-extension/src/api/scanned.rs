//! Classes contributed during discovery

use anvil_model::TypeName;
use indexmap::IndexSet;
use parking_lot::Mutex;

/// Classes the indexer must add to the archive
#[derive(Debug, Default)]
pub struct ScannedClasses {
    classes: Mutex<IndexSet<TypeName>>,
}

impl ScannedClasses {
    /// Create empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `class`; duplicates are ignored
    pub fn add(&self, class: impl Into<TypeName>) {
        let class = class.into();
        tracing::debug!(class = %class, "Scanned class added");
        self.classes.lock().insert(class);
    }

    /// Requested classes, in first-request order
    #[must_use]
    pub fn classes(&self) -> Vec<TypeName> {
        self.classes.lock().iter().cloned().collect()
    }

    /// Number of requested classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Check if nothing was requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }
}

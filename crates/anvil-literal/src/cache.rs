//! Shared literal class cache

use anvil_model::{ClassInfo, MethodInfo, TypeName};
use moka::sync::Cache;
use parking_lot::Mutex;
use std::sync::Arc;

/// Synthesized literal class: the annotation type and its members
#[derive(Debug)]
pub(crate) struct LiteralClassData {
    pub(crate) generated_name: TypeName,
    pub(crate) application_class: bool,
    pub(crate) annotation: Arc<ClassInfo>,
    pub(crate) members: Vec<Arc<MethodInfo>>,
}

impl LiteralClassData {
    pub(crate) fn new(generated_name: TypeName, application_class: bool, annotation: Arc<ClassInfo>) -> Self {
        let members = annotation.regular_methods().cloned().collect();
        Self {
            generated_name,
            application_class,
            annotation,
            members,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Shared classes synthesized so far
    pub entry_count: usize,
}

/// Annotation type -> shared literal class
///
/// Synthesis runs at most once per annotation type; concurrent callers
/// for the same type wait for and receive the same descriptor.
pub(crate) struct LiteralCache {
    entries: Cache<TypeName, Arc<LiteralClassData>>,
    synthesized: Mutex<Vec<Arc<LiteralClassData>>>,
}

impl LiteralCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Cache::builder().name("annotation-literals").build(),
            synthesized: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn get_or_synthesize(
        &self,
        annotation: &TypeName,
        synthesize: impl FnOnce() -> LiteralClassData,
    ) -> Arc<LiteralClassData> {
        self.entries.get_with(annotation.clone(), || {
            let data = Arc::new(synthesize());
            tracing::debug!(annotation = %annotation, literal = %data.generated_name, "Synthesized shared literal class");
            self.synthesized.lock().push(Arc::clone(&data));
            data
        })
    }

    /// Synthesized classes in first-use order
    pub(crate) fn synthesized(&self) -> Vec<Arc<LiteralClassData>> {
        self.synthesized.lock().clone()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.synthesized.lock().len(),
        }
    }
}

impl std::fmt::Debug for LiteralCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteralCache").field("stats", &self.stats()).finish()
    }
}

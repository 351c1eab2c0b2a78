//! Immutable annotation view after enhancement

use crate::error::OverlayError;
use crate::set::AnnotationSet;
use crate::source::AnnotationSource;
use crate::target::{seed, seed_contains};
use anvil_index::DeclarationIndex;
use anvil_model::{DeclarationKey, TypeName};
use std::collections::HashMap;
use std::sync::Arc;

/// Final annotations, rebuilt from the transformation log
///
/// Declarations without recorded transformations are answered from the
/// index. The view never changes and stays readable for the rest of the
/// build.
#[derive(Debug, Clone)]
pub struct FrozenAnnotations {
    index: Arc<DeclarationIndex>,
    transformed: HashMap<DeclarationKey, AnnotationSet>,
    reverse: HashMap<TypeName, Vec<DeclarationKey>>,
}

impl FrozenAnnotations {
    /// Create view from replayed sets
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>, transformed: HashMap<DeclarationKey, AnnotationSet>) -> Self {
        let mut reverse: HashMap<TypeName, Vec<DeclarationKey>> = HashMap::new();
        for (key, set) in &transformed {
            for name in set.names() {
                reverse.entry(name.clone()).or_default().push(key.clone());
            }
        }
        Self {
            index,
            transformed,
            reverse,
        }
    }

    /// View with no transformations
    #[must_use]
    pub fn untransformed(index: Arc<DeclarationIndex>) -> Self {
        Self::new(index, HashMap::new())
    }

    /// Shared index
    #[inline]
    #[must_use]
    pub fn shared_index(&self) -> &Arc<DeclarationIndex> {
        &self.index
    }

    /// Transformed declarations and their final sets
    pub fn transformed(&self) -> impl Iterator<Item = (&DeclarationKey, &AnnotationSet)> {
        self.transformed.iter()
    }

    /// Check whether `key` was transformed
    #[must_use]
    pub fn is_transformed(&self, key: &DeclarationKey) -> bool {
        self.transformed.contains_key(key)
    }

    /// Number of transformed declarations
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformed.len()
    }

    /// Check if nothing was transformed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformed.is_empty()
    }
}

impl AnnotationSource for FrozenAnnotations {
    fn index(&self) -> &DeclarationIndex {
        &self.index
    }

    fn annotations(&self, key: &DeclarationKey) -> Result<AnnotationSet, OverlayError> {
        Ok(self
            .transformed
            .get(key)
            .cloned()
            .unwrap_or_else(|| seed(&self.index, key)))
    }

    fn has_annotation(&self, key: &DeclarationKey, name: &TypeName) -> Result<bool, OverlayError> {
        Ok(match self.transformed.get(key) {
            Some(set) => set.contains(name),
            None => seed_contains(&self.index, key, name),
        })
    }

    fn overlaid_with(&self, name: &TypeName) -> Result<Vec<DeclarationKey>, OverlayError> {
        Ok(self.reverse.get(name).cloned().unwrap_or_default())
    }
}

//! Read access to current annotations

use crate::error::OverlayError;
use crate::set::AnnotationSet;
use anvil_index::DeclarationIndex;
use anvil_model::{ClassKey, DeclarationKey, TypeName};
use indexmap::IndexSet;

/// Current annotations of the declarations in an index
///
/// Implemented by the live overlays during enhancement and by
/// [`crate::FrozenAnnotations`] afterwards.
pub trait AnnotationSource: Send + Sync {
    /// Underlying index
    fn index(&self) -> &DeclarationIndex;

    /// Current annotations of `key`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] when the source is no longer readable.
    fn annotations(&self, key: &DeclarationKey) -> Result<AnnotationSet, OverlayError>;

    /// Check `key` for an annotation type
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] when the source is no longer readable.
    fn has_annotation(&self, key: &DeclarationKey, name: &TypeName) -> Result<bool, OverlayError>;

    /// Transformed declarations currently carrying `name`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] when the source is no longer readable.
    fn overlaid_with(&self, name: &TypeName) -> Result<Vec<DeclarationKey>, OverlayError>;

    /// Every declaration currently carrying `name`
    ///
    /// Merges the index's reverse lookup with transformed declarations,
    /// adds subclasses for inherited annotations and drops declarations
    /// whose annotation was removed.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] when the source is no longer readable.
    fn declarations_with(&self, name: &TypeName) -> Result<Vec<DeclarationKey>, OverlayError> {
        let index = self.index();
        let mut candidates: IndexSet<DeclarationKey> = index.annotated_with(name).iter().cloned().collect();
        candidates.extend(self.overlaid_with(name)?);

        if index.is_inherited_annotation(name) {
            let roots: Vec<TypeName> = candidates
                .iter()
                .filter_map(|key| match key {
                    DeclarationKey::Class(class) => Some(class.name().clone()),
                    _ => None,
                })
                .collect();
            for root in roots {
                candidates.extend(
                    index
                        .all_subclasses(&root)
                        .into_iter()
                        .map(|sub| DeclarationKey::Class(ClassKey::new(sub))),
                );
            }
        }

        let mut found = Vec::with_capacity(candidates.len());
        for key in candidates {
            if self.has_annotation(&key, name)? {
                found.push(key);
            }
        }
        Ok(found)
    }
}

//! Shared predicate plumbing

use anvil_model::{DeclarationKey, TypeName};
use anvil_overlay::{AnnotationSource, OverlayError};
use indexmap::IndexSet;
use std::sync::Arc;

/// Lazily evaluated query results
pub type QueryStream<'a, T> = Box<dyn Iterator<Item = Result<Arc<T>, OverlayError>> + 'a>;

/// Add `value` to a predicate family, creating it on first use
pub(crate) fn widen<T: std::hash::Hash + Eq>(family: &mut Option<IndexSet<T>>, value: T) {
    family.get_or_insert_with(IndexSet::new).insert(value);
}

/// Check `key` for any of `names`
pub(crate) fn carries_any(
    source: &dyn AnnotationSource,
    key: &DeclarationKey,
    names: &IndexSet<TypeName>,
) -> Result<bool, OverlayError> {
    for name in names {
        if source.has_annotation(key, name)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Union of the overlay-aware reverse lookups of `names`
pub(crate) fn annotated(
    source: &dyn AnnotationSource,
    names: &IndexSet<TypeName>,
) -> Result<IndexSet<DeclarationKey>, OverlayError> {
    let mut keys = IndexSet::new();
    for name in names {
        keys.extend(source.declarations_with(name)?);
    }
    tracing::trace!(annotations = names.len(), candidates = keys.len(), "Reverse annotation lookup");
    Ok(keys)
}

/// Keep items carrying any of `names`; an absent family keeps everything
pub(crate) fn retain_annotated<'a, T, I, K>(
    source: &'a dyn AnnotationSource,
    names: Option<IndexSet<TypeName>>,
    items: I,
    key: K,
) -> impl Iterator<Item = Result<T, OverlayError>> + 'a
where
    T: 'a,
    I: Iterator<Item = Result<T, OverlayError>> + 'a,
    K: Fn(&T) -> DeclarationKey + 'a,
{
    items.filter_map(move |item| {
        let Some(names) = &names else {
            return Some(item);
        };
        match item {
            Ok(value) => match carries_any(source, &key(&value), names) {
                Ok(true) => Some(Ok(value)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            },
            Err(err) => Some(Err(err)),
        }
    })
}

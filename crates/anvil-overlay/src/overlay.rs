//! Copy-on-write annotation overlay
//!
//! An overlay starts empty. The first read or write of a key seeds its
//! entry from the index; every later access sees the overlaid set. Keys
//! never touched are answered from the index without allocating.

use crate::error::OverlayError;
use crate::set::AnnotationSet;
use crate::source::AnnotationSource;
use crate::target::{seed_contains, OverlayKey, OverlayTarget};
use anvil_index::DeclarationIndex;
use anvil_model::{ClassKey, DeclarationKey, FieldKey, MethodKey, ParameterKey, TypeName};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Overlay over one declaration kind
#[derive(Debug)]
pub struct AnnotationOverlay<K: OverlayKey> {
    index: Arc<DeclarationIndex>,
    entries: DashMap<K, AnnotationSet>,
    valid: AtomicBool,
}

impl<K: OverlayKey> AnnotationOverlay<K> {
    /// Create an empty overlay over `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>) -> Self {
        Self {
            index,
            entries: DashMap::new(),
            valid: AtomicBool::new(true),
        }
    }

    /// Key of `target`, as used by every overlay operation
    #[inline]
    #[must_use]
    pub fn key<T: OverlayTarget<Key = K>>(target: &T) -> K {
        target.overlay_key()
    }

    /// Current annotations of `target`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] after invalidation.
    pub fn get<T: OverlayTarget<Key = K>>(&self, target: &T) -> Result<AnnotationSet, OverlayError> {
        self.get_by_key(&Self::key(target))
    }

    /// Current annotations of `key`, seeding the entry on first access
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] after invalidation.
    pub fn get_by_key(&self, key: &K) -> Result<AnnotationSet, OverlayError> {
        self.ensure_valid()?;
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.value().clone());
        }
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| key.seed(&self.index));
        Ok(entry.value().clone())
    }

    /// Check `key` for an annotation type
    ///
    /// Falls back to the index when the key was never overlaid.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] after invalidation.
    pub fn has_annotation(&self, key: &K, name: &TypeName) -> Result<bool, OverlayError> {
        self.ensure_valid()?;
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.contains(name));
        }
        Ok(seed_contains(&self.index, &key.declaration(), name))
    }

    /// Overlaid keys whose current set contains `name`
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Invalidated`] after invalidation.
    pub fn declarations_with(&self, name: &TypeName) -> Result<Vec<K>, OverlayError> {
        self.ensure_valid()?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.value().contains(name))
            .map(|entry| entry.key().clone())
            .collect())
    }

    /// Check whether `key` has an overlay entry
    #[must_use]
    pub fn is_overlaid(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of overlaid entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entry was overlaid yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutate the entry of `key`, seeding it first if needed
    pub(crate) fn modify<R, F>(&self, key: &K, f: F) -> Result<R, OverlayError>
    where
        F: FnOnce(&mut AnnotationSet) -> R,
    {
        self.ensure_valid()?;
        let mut entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| key.seed(&self.index));
        Ok(f(entry.value_mut()))
    }

    /// Drop all entries and reject further reads
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
        self.entries.clear();
    }

    /// Check whether the overlay still accepts access
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    fn ensure_valid(&self) -> Result<(), OverlayError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(OverlayError::Invalidated)
        }
    }
}

/// One overlay per declaration kind, sharing one index
#[derive(Debug)]
pub struct AnnotationOverlays {
    index: Arc<DeclarationIndex>,
    classes: AnnotationOverlay<ClassKey>,
    methods: AnnotationOverlay<MethodKey>,
    fields: AnnotationOverlay<FieldKey>,
    parameters: AnnotationOverlay<ParameterKey>,
}

impl AnnotationOverlays {
    /// Create empty overlays over `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>) -> Self {
        Self {
            classes: AnnotationOverlay::new(Arc::clone(&index)),
            methods: AnnotationOverlay::new(Arc::clone(&index)),
            fields: AnnotationOverlay::new(Arc::clone(&index)),
            parameters: AnnotationOverlay::new(Arc::clone(&index)),
            index,
        }
    }

    /// Shared index
    #[inline]
    #[must_use]
    pub fn shared_index(&self) -> &Arc<DeclarationIndex> {
        &self.index
    }

    /// Class overlay
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &AnnotationOverlay<ClassKey> {
        &self.classes
    }

    /// Method overlay
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &AnnotationOverlay<MethodKey> {
        &self.methods
    }

    /// Field overlay
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &AnnotationOverlay<FieldKey> {
        &self.fields
    }

    /// Parameter overlay
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &AnnotationOverlay<ParameterKey> {
        &self.parameters
    }

    /// Check whether `key` has an overlay entry
    #[must_use]
    pub fn is_overlaid(&self, key: &DeclarationKey) -> bool {
        match key {
            DeclarationKey::Class(key) => self.classes.is_overlaid(key),
            DeclarationKey::Method(key) => self.methods.is_overlaid(key),
            DeclarationKey::Field(key) => self.fields.is_overlaid(key),
            DeclarationKey::Parameter(key) => self.parameters.is_overlaid(key),
        }
    }

    /// Number of overlaid entries across all kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len() + self.methods.len() + self.fields.len() + self.parameters.len()
    }

    /// Check if nothing was overlaid yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidate every overlay
    pub fn invalidate(&self) {
        self.classes.invalidate();
        self.methods.invalidate();
        self.fields.invalidate();
        self.parameters.invalidate();
        tracing::debug!("annotation overlays invalidated");
    }

    /// Check whether the overlays still accept access
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.classes.is_valid()
    }

    pub(crate) fn modify<R, F>(&self, key: &DeclarationKey, f: F) -> Result<R, OverlayError>
    where
        F: FnOnce(&mut AnnotationSet) -> R,
    {
        match key {
            DeclarationKey::Class(key) => self.classes.modify(key, f),
            DeclarationKey::Method(key) => self.methods.modify(key, f),
            DeclarationKey::Field(key) => self.fields.modify(key, f),
            DeclarationKey::Parameter(key) => self.parameters.modify(key, f),
        }
    }

    /// Snapshot of every overlaid entry
    pub(crate) fn snapshot(&self) -> HashMap<DeclarationKey, AnnotationSet> {
        fn collect<K: OverlayKey>(
            overlay: &AnnotationOverlay<K>,
            into: &mut HashMap<DeclarationKey, AnnotationSet>,
        ) {
            for entry in &overlay.entries {
                into.insert(entry.key().declaration(), entry.value().clone());
            }
        }
        let mut out = HashMap::with_capacity(self.len());
        collect(&self.classes, &mut out);
        collect(&self.methods, &mut out);
        collect(&self.fields, &mut out);
        collect(&self.parameters, &mut out);
        out
    }
}

impl AnnotationSource for AnnotationOverlays {
    fn index(&self) -> &DeclarationIndex {
        &self.index
    }

    fn annotations(&self, key: &DeclarationKey) -> Result<AnnotationSet, OverlayError> {
        match key {
            DeclarationKey::Class(key) => self.classes.get_by_key(key),
            DeclarationKey::Method(key) => self.methods.get_by_key(key),
            DeclarationKey::Field(key) => self.fields.get_by_key(key),
            DeclarationKey::Parameter(key) => self.parameters.get_by_key(key),
        }
    }

    fn has_annotation(&self, key: &DeclarationKey, name: &TypeName) -> Result<bool, OverlayError> {
        match key {
            DeclarationKey::Class(key) => self.classes.has_annotation(key, name),
            DeclarationKey::Method(key) => self.methods.has_annotation(key, name),
            DeclarationKey::Field(key) => self.fields.has_annotation(key, name),
            DeclarationKey::Parameter(key) => self.parameters.has_annotation(key, name),
        }
    }

    fn overlaid_with(&self, name: &TypeName) -> Result<Vec<DeclarationKey>, OverlayError> {
        let mut out: Vec<DeclarationKey> = Vec::new();
        out.extend(self.classes.declarations_with(name)?.into_iter().map(Into::into));
        out.extend(self.methods.declarations_with(name)?.into_iter().map(Into::into));
        out.extend(self.fields.declarations_with(name)?.into_iter().map(Into::into));
        out.extend(self.parameters.declarations_with(name)?.into_iter().map(Into::into));
        Ok(out)
    }
}

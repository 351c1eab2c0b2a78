//! Replayable annotation transformations
//!
//! Every add or remove issued during enhancement is applied to the live
//! overlay and appended to a per-declaration log. Parameter operations are
//! re-expressed on the owning method, so a method's log replays its own
//! annotations and those of its parameters in issue order.
//!
//! Freezing replays the log against fresh seeds and checks the result
//! against the overlay before handing out [`FrozenAnnotations`].

use crate::error::TransformError;
use crate::frozen::FrozenAnnotations;
use crate::overlay::AnnotationOverlays;
use crate::set::AnnotationSet;
use crate::target::{seed, OverlayKey, OverlayTarget};
use anvil_index::DeclarationIndex;
use anvil_model::{AnnotationInstance, DeclarationKey, MethodKey};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared removal predicate
pub type AnnotationPredicate = Arc<dyn Fn(&AnnotationInstance) -> bool + Send + Sync>;

/// Declaration a logged operation applies to, relative to its log key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformTarget {
    /// The logged declaration itself
    Declaration,
    /// Parameter of the logged method
    Parameter(u16),
}

/// A logged operation
#[derive(Clone)]
pub enum TransformOp {
    /// Add or replace an annotation
    Add(AnnotationInstance),
    /// Remove every annotation matching the predicate
    Remove(AnnotationPredicate),
}

impl Debug for TransformOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(annotation) => f.debug_tuple("Add").field(annotation).finish(),
            Self::Remove(_) => f.write_str("Remove(<predicate>)"),
        }
    }
}

/// One entry of a declaration's transformation log
#[derive(Debug, Clone)]
pub struct RecordedTransformation {
    target: TransformTarget,
    op: TransformOp,
}

impl RecordedTransformation {
    /// Target relative to the log key
    #[inline]
    #[must_use]
    pub fn target(&self) -> TransformTarget {
        self.target
    }

    /// Operation
    #[inline]
    #[must_use]
    pub fn op(&self) -> &TransformOp {
        &self.op
    }

    /// Apply to `sink`
    pub fn apply_to(&self, sink: &mut dyn AnnotationSink) {
        match &self.op {
            TransformOp::Add(annotation) => sink.add(self.target, annotation.clone()),
            TransformOp::Remove(predicate) => sink.remove(self.target, predicate.as_ref()),
        }
    }
}

/// Receiver of replayed transformations
pub trait AnnotationSink {
    /// Add or replace an annotation on `target`
    fn add(&mut self, target: TransformTarget, annotation: AnnotationInstance);

    /// Remove matching annotations from `target`
    fn remove(&mut self, target: TransformTarget, predicate: &(dyn Fn(&AnnotationInstance) -> bool + Send + Sync));
}

/// Plain sets only receive operations on the declaration itself
impl AnnotationSink for AnnotationSet {
    fn add(&mut self, target: TransformTarget, annotation: AnnotationInstance) {
        if target == TransformTarget::Declaration {
            AnnotationSet::add(self, annotation);
        }
    }

    fn remove(&mut self, target: TransformTarget, predicate: &(dyn Fn(&AnnotationInstance) -> bool + Send + Sync)) {
        if target == TransformTarget::Declaration {
            self.remove_if(predicate);
        }
    }
}

/// Sink seeding each touched target from the index
struct SeededSink<'a> {
    index: &'a DeclarationIndex,
    key: &'a DeclarationKey,
    sets: IndexMap<TransformTarget, AnnotationSet>,
}

impl<'a> SeededSink<'a> {
    fn new(index: &'a DeclarationIndex, key: &'a DeclarationKey) -> Self {
        Self {
            index,
            key,
            sets: IndexMap::new(),
        }
    }

    fn resolve(&self, target: TransformTarget) -> DeclarationKey {
        match (target, self.key) {
            (TransformTarget::Parameter(position), DeclarationKey::Method(method)) => {
                DeclarationKey::Parameter(method.parameter(position))
            }
            _ => self.key.clone(),
        }
    }

    fn set(&mut self, target: TransformTarget) -> &mut AnnotationSet {
        let resolved = self.resolve(target);
        let index = self.index;
        self.sets.entry(target).or_insert_with(|| seed(index, &resolved))
    }

    fn finish(self) -> Vec<(DeclarationKey, AnnotationSet)> {
        let resolved: Vec<DeclarationKey> = self.sets.keys().map(|target| self.resolve(*target)).collect();
        resolved.into_iter().zip(self.sets.into_values()).collect()
    }
}

impl AnnotationSink for SeededSink<'_> {
    fn add(&mut self, target: TransformTarget, annotation: AnnotationInstance) {
        self.set(target).add(annotation);
    }

    fn remove(&mut self, target: TransformTarget, predicate: &(dyn Fn(&AnnotationInstance) -> bool + Send + Sync)) {
        self.set(target).remove_if(predicate);
    }
}

/// Records and applies annotation transformations
pub struct TransformationRegistry {
    overlays: Arc<AnnotationOverlays>,
    log: Mutex<IndexMap<DeclarationKey, Vec<RecordedTransformation>>>,
    frozen: AtomicBool,
}

impl Debug for TransformationRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationRegistry")
            .field("logged", &self.log.lock().len())
            .field("frozen", &self.is_frozen())
            .finish_non_exhaustive()
    }
}

impl TransformationRegistry {
    /// Create registry writing through `overlays`
    #[must_use]
    pub fn new(overlays: Arc<AnnotationOverlays>) -> Self {
        Self {
            overlays,
            log: Mutex::new(IndexMap::new()),
            frozen: AtomicBool::new(false),
        }
    }

    /// Overlays written by this registry
    #[inline]
    #[must_use]
    pub fn overlays(&self) -> &Arc<AnnotationOverlays> {
        &self.overlays
    }

    /// Key of `target`, identical to the overlay's key derivation
    #[inline]
    #[must_use]
    pub fn key<T: OverlayTarget>(target: &T) -> T::Key {
        target.overlay_key()
    }

    /// Add or replace an annotation on `target`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Frozen`] after [`Self::freeze`], or an
    /// overlay error if the overlay was invalidated.
    pub fn add_annotation<T: OverlayTarget>(&self, target: &T, annotation: AnnotationInstance) -> Result<(), TransformError> {
        self.apply(Self::key(target).declaration(), TransformOp::Add(annotation))
            .map(|_| ())
    }

    /// Remove every annotation of `target` matching `predicate`
    ///
    /// Returns true if the current set changed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_annotation`].
    pub fn remove_annotation<T, P>(&self, target: &T, predicate: P) -> Result<bool, TransformError>
    where
        T: OverlayTarget,
        P: Fn(&AnnotationInstance) -> bool + Send + Sync + 'static,
    {
        self.apply(Self::key(target).declaration(), TransformOp::Remove(Arc::new(predicate)))
    }

    /// Remove every annotation of `target`
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_annotation`].
    pub fn remove_all_annotations<T: OverlayTarget>(&self, target: &T) -> Result<bool, TransformError> {
        self.remove_annotation(target, |_| true)
    }

    /// Add by declaration key
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_annotation`].
    pub fn add_by_key(&self, key: &DeclarationKey, annotation: AnnotationInstance) -> Result<(), TransformError> {
        self.apply(key.clone(), TransformOp::Add(annotation)).map(|_| ())
    }

    /// Remove by declaration key
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_annotation`].
    pub fn remove_by_key(&self, key: &DeclarationKey, predicate: AnnotationPredicate) -> Result<bool, TransformError> {
        self.apply(key.clone(), TransformOp::Remove(predicate))
    }

    fn apply(&self, key: DeclarationKey, op: TransformOp) -> Result<bool, TransformError> {
        if self.is_frozen() {
            return Err(TransformError::Frozen);
        }
        let changed = self.overlays.modify(&key, |set| match &op {
            TransformOp::Add(annotation) => set.add(annotation.clone()).as_ref() != Some(annotation),
            TransformOp::Remove(predicate) => set.remove_if(|a| predicate(a)),
        })?;

        let (log_key, target) = match key {
            DeclarationKey::Parameter(parameter) => (
                DeclarationKey::Method(parameter.method().clone()),
                TransformTarget::Parameter(parameter.position()),
            ),
            other => (other, TransformTarget::Declaration),
        };
        tracing::trace!(key = %log_key, ?target, ?op, "annotation transformation recorded");
        self.log
            .lock()
            .entry(log_key)
            .or_default()
            .push(RecordedTransformation { target, op });
        Ok(changed)
    }

    /// Replay the log of `key` into `sink`
    ///
    /// Parameter keys replay only the operations aimed at that parameter,
    /// reported as [`TransformTarget::Declaration`].
    pub fn replay(&self, key: &DeclarationKey, sink: &mut dyn AnnotationSink) {
        let log = self.log.lock();
        match key {
            DeclarationKey::Parameter(parameter) => {
                let owner = DeclarationKey::Method(parameter.method().clone());
                let wanted = TransformTarget::Parameter(parameter.position());
                for entry in log.get(&owner).into_iter().flatten() {
                    if entry.target == wanted {
                        RecordedTransformation {
                            target: TransformTarget::Declaration,
                            op: entry.op.clone(),
                        }
                        .apply_to(sink);
                    }
                }
            }
            other => {
                for entry in log.get(other).into_iter().flatten() {
                    entry.apply_to(sink);
                }
            }
        }
    }

    /// Replay a method's log, including its parameters
    pub fn replay_method(&self, key: &MethodKey, sink: &mut dyn AnnotationSink) {
        self.replay(&DeclarationKey::Method(key.clone()), sink);
    }

    /// Logged operations of `key`
    #[must_use]
    pub fn transformations(&self, key: &DeclarationKey) -> Vec<RecordedTransformation> {
        self.log.lock().get(key).cloned().unwrap_or_default()
    }

    /// Log keys in first-transformation order
    #[must_use]
    pub fn transformed_keys(&self) -> Vec<DeclarationKey> {
        self.log.lock().keys().cloned().collect()
    }

    /// Check whether the registry stopped accepting writes
    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Stop accepting writes and build the final annotation view
    ///
    /// Each log is replayed against fresh seeds from the index; every
    /// resulting set must match the overlay entry of the same key.
    ///
    /// # Errors
    ///
    /// - [`TransformError::Frozen`] if already frozen
    /// - [`TransformError::Overlay`] if the overlay was invalidated first
    /// - [`TransformError::KeyMismatch`] / [`TransformError::ReplayDivergence`]
    ///   when the log and the overlay disagree
    pub fn freeze(&self) -> Result<FrozenAnnotations, TransformError> {
        if self.frozen.swap(true, Ordering::SeqCst) {
            return Err(TransformError::Frozen);
        }
        if !self.overlays.is_valid() {
            return Err(crate::OverlayError::Invalidated.into());
        }

        let index = self.overlays.shared_index();
        let live = self.overlays.snapshot();
        let log = self.log.lock();
        let mut transformed = HashMap::with_capacity(log.len());
        for (key, entries) in log.iter() {
            let mut sink = SeededSink::new(index, key);
            for entry in entries {
                entry.apply_to(&mut sink);
            }
            for (resolved, replayed) in sink.finish() {
                let Some(current) = live.get(&resolved) else {
                    return Err(TransformError::KeyMismatch { key: resolved });
                };
                if *current != replayed {
                    return Err(TransformError::ReplayDivergence { key: resolved });
                }
                transformed.insert(resolved, replayed);
            }
        }
        tracing::debug!(transformed = transformed.len(), "annotation transformations frozen");
        Ok(FrozenAnnotations::new(Arc::clone(index), transformed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::AnnotationSource;
    use anvil_index::IndexBuilder;
    use anvil_model::{ClassInfo, ClassKey, MethodBuilder, PrimitiveKind, Type, TypeName};
    use pretty_assertions::assert_eq;

    fn registry() -> TransformationRegistry {
        let index = IndexBuilder::new()
            .with_class(
                ClassInfo::builder("a.Service")
                    .annotate(AnnotationInstance::new("a.Old"))
                    .method(
                        MethodBuilder::new("handle")
                            .annotated_parameter(
                                Type::primitive(PrimitiveKind::Int),
                                "count",
                                vec![AnnotationInstance::new("a.P")],
                            )
                            .annotate(AnnotationInstance::new("a.M")),
                    )
                    .build(),
            )
            .build()
            .unwrap();
        TransformationRegistry::new(Arc::new(AnnotationOverlays::new(Arc::new(index))))
    }

    fn handle() -> MethodKey {
        MethodKey::new("a.Service", "handle", vec![Type::primitive(PrimitiveKind::Int)])
    }

    #[test]
    fn registry_writes_through_overlay() {
        let registry = registry();
        let class = ClassKey::new("a.Service");
        registry.add_annotation(&class, AnnotationInstance::new("a.New")).unwrap();
        assert!(registry.remove_annotation(&class, |a| a.name().as_str() == "a.Old").unwrap());

        let set = registry.overlays().classes().get_by_key(&class).unwrap();
        assert_eq!(set.into_vec(), vec![AnnotationInstance::new("a.New")]);
    }

    #[test]
    fn registry_logs_parameter_ops_on_owning_method() {
        let registry = registry();
        let parameter = handle().parameter(0);
        registry.add_annotation(&parameter, AnnotationInstance::new("a.Extra")).unwrap();
        registry.add_annotation(&handle(), AnnotationInstance::new("a.OnMethod")).unwrap();

        assert_eq!(registry.transformed_keys(), vec![DeclarationKey::Method(handle())]);
        let targets: Vec<_> = registry
            .transformations(&DeclarationKey::Method(handle()))
            .iter()
            .map(RecordedTransformation::target)
            .collect();
        assert_eq!(targets, vec![TransformTarget::Parameter(0), TransformTarget::Declaration]);

        let mut replayed = AnnotationSet::new();
        registry.replay(&DeclarationKey::Parameter(parameter), &mut replayed);
        assert_eq!(replayed.into_vec(), vec![AnnotationInstance::new("a.Extra")]);
    }

    #[test]
    fn registry_freeze_reproduces_overlay() {
        let registry = registry();
        let parameter = handle().parameter(0);
        registry.add_annotation(&parameter, AnnotationInstance::new("a.Extra")).unwrap();
        registry.remove_annotation(&handle(), |_| true).unwrap();

        let frozen = registry.freeze().unwrap();
        registry.overlays().invalidate();

        let p = frozen.annotations(&parameter.clone().into()).unwrap();
        assert_eq!(
            p.into_vec(),
            vec![AnnotationInstance::new("a.P"), AnnotationInstance::new("a.Extra")]
        );
        assert!(frozen.annotations(&handle().into()).unwrap().is_empty());
        assert!(frozen
            .has_annotation(&ClassKey::new("a.Service").into(), &TypeName::new("a.Old"))
            .unwrap());
        assert_eq!(
            frozen.declarations_with(&TypeName::new("a.Extra")).unwrap(),
            vec![DeclarationKey::Parameter(parameter)]
        );
    }

    #[test]
    fn registry_rejects_writes_after_freeze() {
        let registry = registry();
        registry.freeze().unwrap();
        assert_eq!(
            registry.add_annotation(&ClassKey::new("a.Service"), AnnotationInstance::new("a.Late")),
            Err(TransformError::Frozen)
        );
        assert_eq!(registry.freeze().unwrap_err(), TransformError::Frozen);
    }
}

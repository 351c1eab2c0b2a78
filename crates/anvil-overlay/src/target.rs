//! Key derivation shared by the overlay and the transformation registry
//!
//! Both layers map a declaration to its key through [`OverlayTarget`], so
//! a transformation recorded against a declaration is always found again
//! when the overlay is read for that same declaration.

use crate::set::AnnotationSet;
use anvil_index::DeclarationIndex;
use anvil_model::{
    ClassInfo, ClassKey, DeclarationKey, FieldInfo, FieldKey, MethodInfo, MethodKey, ParameterInfo,
    ParameterKey, TypeName,
};
use std::fmt::Debug;
use std::hash::Hash;

/// Key of one overlay kind
pub trait OverlayKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Widen to a declaration key
    fn declaration(&self) -> DeclarationKey;

    /// Narrow a declaration key of the matching kind
    fn from_declaration(key: &DeclarationKey) -> Option<Self>;

    /// Initial annotation set, taken from the index
    fn seed(&self, index: &DeclarationIndex) -> AnnotationSet {
        seed(index, &self.declaration())
    }
}

impl OverlayKey for ClassKey {
    fn declaration(&self) -> DeclarationKey {
        DeclarationKey::Class(self.clone())
    }

    fn from_declaration(key: &DeclarationKey) -> Option<Self> {
        match key {
            DeclarationKey::Class(key) => Some(key.clone()),
            _ => None,
        }
    }
}

impl OverlayKey for MethodKey {
    fn declaration(&self) -> DeclarationKey {
        DeclarationKey::Method(self.clone())
    }

    fn from_declaration(key: &DeclarationKey) -> Option<Self> {
        match key {
            DeclarationKey::Method(key) => Some(key.clone()),
            _ => None,
        }
    }
}

impl OverlayKey for FieldKey {
    fn declaration(&self) -> DeclarationKey {
        DeclarationKey::Field(self.clone())
    }

    fn from_declaration(key: &DeclarationKey) -> Option<Self> {
        match key {
            DeclarationKey::Field(key) => Some(key.clone()),
            _ => None,
        }
    }
}

impl OverlayKey for ParameterKey {
    fn declaration(&self) -> DeclarationKey {
        DeclarationKey::Parameter(self.clone())
    }

    fn from_declaration(key: &DeclarationKey) -> Option<Self> {
        match key {
            DeclarationKey::Parameter(key) => Some(key.clone()),
            _ => None,
        }
    }
}

/// A declaration that can be annotated through the overlay
pub trait OverlayTarget {
    /// Key kind
    type Key: OverlayKey;

    /// Structural key of this declaration
    fn overlay_key(&self) -> Self::Key;
}

impl OverlayTarget for ClassInfo {
    type Key = ClassKey;

    fn overlay_key(&self) -> ClassKey {
        self.key()
    }
}

impl OverlayTarget for MethodInfo {
    type Key = MethodKey;

    fn overlay_key(&self) -> MethodKey {
        self.key().clone()
    }
}

impl OverlayTarget for FieldInfo {
    type Key = FieldKey;

    fn overlay_key(&self) -> FieldKey {
        self.key().clone()
    }
}

impl OverlayTarget for ParameterInfo {
    type Key = ParameterKey;

    fn overlay_key(&self) -> ParameterKey {
        self.key().clone()
    }
}

macro_rules! key_targets {
    ($($key:ty),+ $(,)?) => {
        $(
            impl OverlayTarget for $key {
                type Key = $key;

                fn overlay_key(&self) -> $key {
                    self.clone()
                }
            }
        )+
    };
}

key_targets!(ClassKey, MethodKey, FieldKey, ParameterKey);

/// Initial annotations of `key`
///
/// Classes additionally receive inherited annotations from their
/// superclass chain. The nearest declaration wins and direct annotations
/// always take precedence.
#[must_use]
pub fn seed(index: &DeclarationIndex, key: &DeclarationKey) -> AnnotationSet {
    let mut set: AnnotationSet = index.original_annotations(key).iter().cloned().collect();
    if let DeclarationKey::Class(class) = key {
        for ancestor in index.superclass_chain(class.name()) {
            for annotation in ancestor.annotations() {
                if index.is_inherited_annotation(annotation.name()) {
                    set.add_if_absent(annotation.clone());
                }
            }
        }
    }
    set
}

/// Check the seeded set for `name` without materializing it
#[must_use]
pub fn seed_contains(index: &DeclarationIndex, key: &DeclarationKey, name: &TypeName) -> bool {
    if index.original_annotations(key).iter().any(|a| a.name() == name) {
        return true;
    }
    match key {
        DeclarationKey::Class(class) if index.is_inherited_annotation(name) => index
            .superclass_chain(class.name())
            .iter()
            .any(|ancestor| ancestor.has_declared_annotation(name)),
        _ => false,
    }
}

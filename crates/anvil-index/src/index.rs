//! Declaration index with radix tree
//!
//! Provides [`DeclarationIndex`] for class lookup by fully-qualified name,
//! package prefix queries, hierarchy traversal and the original
//! annotation reverse index.

use anvil_model::{
    AnnotationInstance, ClassInfo, DeclarationKey, FieldInfo, FieldKey, MethodInfo, MethodKey,
    ParameterInfo, ParameterKey, TypeName, INHERITED,
};
use indexmap::IndexSet;
use radix_trie::{Trie, TrieCommon};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Immutable, queryable corpus of declarations
///
/// We use radix_trie for the class table so that package-prefix
/// lookups walk a subtree instead of the whole corpus. Hierarchy edges and
/// the annotation reverse index are computed once at build time.
///
/// The index is never mutated after [`crate::IndexBuilder::build`]; all
/// annotation edits live in overlays layered on top of it.
#[derive(Debug)]
pub struct DeclarationIndex {
    /// Radix trie mapping class name -> class
    classes: Trie<String, Arc<ClassInfo>>,

    /// Member tables
    methods: HashMap<MethodKey, Arc<MethodInfo>>,
    fields: HashMap<FieldKey, Arc<FieldInfo>>,

    /// Hierarchy: superclass -> direct subclasses
    subclasses: HashMap<TypeName, Vec<TypeName>>,

    /// Hierarchy: interface -> direct implementors and subinterfaces
    implementors: HashMap<TypeName, Vec<TypeName>>,

    /// Reverse index: annotation type -> annotated declarations
    by_annotation: HashMap<TypeName, Vec<DeclarationKey>>,
}

impl DeclarationIndex {
    pub(crate) fn from_classes(classes: Vec<ClassInfo>) -> Self {
        let mut trie = Trie::new();
        let mut methods = HashMap::new();
        let mut fields = HashMap::new();
        let mut subclasses: HashMap<TypeName, Vec<TypeName>> = HashMap::new();
        let mut implementors: HashMap<TypeName, Vec<TypeName>> = HashMap::new();
        let mut by_annotation: HashMap<TypeName, Vec<DeclarationKey>> = HashMap::new();

        for class in classes {
            let class = Arc::new(class);

            if let Some(super_name) = class.super_name() {
                subclasses
                    .entry(super_name.clone())
                    .or_default()
                    .push(class.name().clone());
            }
            for interface in class.interfaces() {
                implementors
                    .entry(interface.clone())
                    .or_default()
                    .push(class.name().clone());
            }

            record_annotations(&mut by_annotation, class.annotations(), || {
                class.key().into()
            });
            for method in class.methods() {
                record_annotations(&mut by_annotation, method.annotations(), || {
                    method.key().clone().into()
                });
                for parameter in method.parameters() {
                    record_annotations(&mut by_annotation, parameter.annotations(), || {
                        parameter.key().clone().into()
                    });
                }
                methods.insert(method.key().clone(), Arc::clone(method));
            }
            for field in class.fields() {
                record_annotations(&mut by_annotation, field.annotations(), || {
                    field.key().clone().into()
                });
                fields.insert(field.key().clone(), Arc::clone(field));
            }

            trie.insert(class.name().to_string(), class);
        }

        Self {
            classes: trie,
            methods,
            fields,
            subclasses,
            implementors,
            by_annotation,
        }
    }

    /// Lookup class by name
    #[inline]
    #[must_use]
    pub fn class(&self, name: &TypeName) -> Option<&Arc<ClassInfo>> {
        self.classes.get(name.as_str())
    }

    /// Check if class exists in index
    #[inline]
    #[must_use]
    pub fn contains_class(&self, name: &TypeName) -> bool {
        self.class(name).is_some()
    }

    /// All classes, ordered by name
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassInfo>> {
        self.classes.values()
    }

    /// Get total class count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in `package` and its subpackages
    #[must_use]
    pub fn classes_in_package(&self, package: &str) -> Vec<Arc<ClassInfo>> {
        if package.is_empty() {
            return self.classes().cloned().collect();
        }
        let prefix = format!("{package}.");
        self.classes
            .get_raw_descendant(&prefix)
            .map(|subtrie| {
                subtrie
                    .values()
                    .filter(|class| class.name().is_in_package(package))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lookup method by identity
    #[inline]
    #[must_use]
    pub fn method(&self, key: &MethodKey) -> Option<&Arc<MethodInfo>> {
        self.methods.get(key)
    }

    /// Lookup field by identity
    #[inline]
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&Arc<FieldInfo>> {
        self.fields.get(key)
    }

    /// Lookup parameter by identity
    #[must_use]
    pub fn parameter(&self, key: &ParameterKey) -> Option<&ParameterInfo> {
        self.method(key.method())?
            .parameters()
            .get(usize::from(key.position()))
    }

    /// All methods of all classes, constructors included
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodInfo>> {
        self.classes().flat_map(|class| class.methods().iter())
    }

    /// All fields of all classes
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldInfo>> {
        self.classes().flat_map(|class| class.fields().iter())
    }

    /// Check whether a declaration with this identity exists
    #[must_use]
    pub fn contains(&self, key: &DeclarationKey) -> bool {
        match key {
            DeclarationKey::Class(key) => self.contains_class(key.name()),
            DeclarationKey::Method(key) => self.method(key).is_some(),
            DeclarationKey::Field(key) => self.field(key).is_some(),
            DeclarationKey::Parameter(key) => self.parameter(key).is_some(),
        }
    }

    /// Annotations as originally declared (no inheritance, no overlay)
    #[must_use]
    pub fn original_annotations(&self, key: &DeclarationKey) -> &[AnnotationInstance] {
        let annotations = match key {
            DeclarationKey::Class(key) => self.class(key.name()).map(|c| c.annotations()),
            DeclarationKey::Method(key) => self.method(key).map(|m| m.annotations()),
            DeclarationKey::Field(key) => self.field(key).map(|f| f.annotations()),
            DeclarationKey::Parameter(key) => self.parameter(key).map(ParameterInfo::annotations),
        };
        annotations.unwrap_or_default()
    }

    /// Declarations carrying `annotation` in the original index
    #[inline]
    #[must_use]
    pub fn annotated_with(&self, annotation: &TypeName) -> &[DeclarationKey] {
        self.by_annotation
            .get(annotation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check whether `annotation` is meta-annotated as inherited
    #[must_use]
    pub fn is_inherited_annotation(&self, annotation: &TypeName) -> bool {
        let inherited = TypeName::new(INHERITED);
        self.class(annotation)
            .is_some_and(|class| class.has_declared_annotation(&inherited))
    }

    /// Direct subclasses of `name`
    #[inline]
    #[must_use]
    pub fn direct_subclasses(&self, name: &TypeName) -> &[TypeName] {
        self.subclasses
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Direct implementors (and subinterfaces) of `name`
    #[inline]
    #[must_use]
    pub fn direct_implementors(&self, name: &TypeName) -> &[TypeName] {
        self.implementors
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All transitive subtypes of `name`, excluding `name` itself
    ///
    /// Follows both superclass and interface edges.
    #[must_use]
    pub fn all_subtypes(&self, name: &TypeName) -> Vec<TypeName> {
        self.walk(name, |current| {
            self.direct_subclasses(current)
                .iter()
                .chain(self.direct_implementors(current))
                .cloned()
                .collect()
        })
    }

    /// All transitive subclasses of `name`, excluding `name` itself
    ///
    /// Follows superclass edges only.
    #[must_use]
    pub fn all_subclasses(&self, name: &TypeName) -> Vec<TypeName> {
        self.walk(name, |current| self.direct_subclasses(current).to_vec())
    }

    /// All transitive supertypes of `name`, excluding `name` itself
    ///
    /// Supertypes absent from the index are reported but end their branch.
    #[must_use]
    pub fn all_supertypes(&self, name: &TypeName) -> Vec<TypeName> {
        self.walk(name, |current| {
            self.class(current)
                .map(|class| {
                    class
                        .super_name()
                        .into_iter()
                        .chain(class.interfaces())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Superclass chain of `name`, nearest first
    #[must_use]
    pub fn superclass_chain(&self, name: &TypeName) -> Vec<Arc<ClassInfo>> {
        let mut chain = Vec::new();
        let mut seen = IndexSet::new();
        seen.insert(name.clone());
        let mut current = self.class(name).and_then(|c| c.super_name().cloned());
        while let Some(super_name) = current {
            if !seen.insert(super_name.clone()) {
                tracing::warn!(class = %name, "cyclic superclass chain");
                break;
            }
            match self.class(&super_name) {
                Some(class) => {
                    current = class.super_name().cloned();
                    chain.push(Arc::clone(class));
                }
                None => break,
            }
        }
        chain
    }

    /// Reflexive subtype check
    #[must_use]
    pub fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        from == to || self.all_supertypes(from).contains(to)
    }

    /// Breadth-first traversal, excluding the start node
    fn walk<F>(&self, start: &TypeName, next: F) -> Vec<TypeName>
    where
        F: Fn(&TypeName) -> Vec<TypeName>,
    {
        let mut seen = IndexSet::new();
        seen.insert(start.clone());
        let mut queue = VecDeque::from([start.clone()]);
        while let Some(current) = queue.pop_front() {
            for found in next(&current) {
                if seen.insert(found.clone()) {
                    queue.push_back(found);
                }
            }
        }
        seen.into_iter().skip(1).collect()
    }
}

fn record_annotations<F>(
    by_annotation: &mut HashMap<TypeName, Vec<DeclarationKey>>,
    annotations: &[AnnotationInstance],
    key: F,
) where
    F: Fn() -> DeclarationKey,
{
    let mut seen = IndexSet::new();
    for annotation in annotations {
        if seen.insert(annotation.name()) {
            by_annotation
                .entry(annotation.name().clone())
                .or_default()
                .push(key());
        }
    }
}

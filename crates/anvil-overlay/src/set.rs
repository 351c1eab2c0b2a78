//! Current annotation set of one declaration

use anvil_model::{AnnotationInstance, AnnotationValue, TypeName, VALUE_MEMBER};
use indexmap::IndexMap;

/// Annotations attached to one declaration, keyed by annotation type
///
/// Iteration follows insertion order. Adding an annotation whose type is
/// already present replaces the earlier instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    entries: IndexMap<TypeName, AnnotationInstance>,
}

impl AnnotationSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check for an annotation type
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &TypeName) -> bool {
        self.entries.contains_key(name)
    }

    /// Lookup by annotation type
    #[inline]
    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&AnnotationInstance> {
        self.entries.get(name)
    }

    /// Add or replace, returning the replaced instance
    pub fn add(&mut self, annotation: AnnotationInstance) -> Option<AnnotationInstance> {
        self.entries.insert(annotation.name().clone(), annotation)
    }

    /// Add unless the type is already present
    pub fn add_if_absent(&mut self, annotation: AnnotationInstance) -> bool {
        if self.contains(annotation.name()) {
            return false;
        }
        self.entries.insert(annotation.name().clone(), annotation);
        true
    }

    /// Remove every annotation matching `predicate`
    ///
    /// Returns true if anything was removed.
    pub fn remove_if<P>(&mut self, predicate: P) -> bool
    where
        P: Fn(&AnnotationInstance) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, annotation| !predicate(annotation));
        self.entries.len() != before
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Annotations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationInstance> {
        self.entries.values()
    }

    /// Annotation type names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.entries.keys()
    }

    /// Number of annotations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instances of a repeatable annotation
    ///
    /// Yields `element` when present directly, followed by the elements
    /// carried in the `value` array of `container`.
    #[must_use]
    pub fn repeatable(&self, container: &TypeName, element: &TypeName) -> Vec<AnnotationInstance> {
        let mut found: Vec<AnnotationInstance> = self.get(element).cloned().into_iter().collect();
        if let Some(values) = self
            .get(container)
            .and_then(|c| c.value(VALUE_MEMBER))
            .and_then(AnnotationValue::as_array)
        {
            found.extend(
                values
                    .iter()
                    .filter_map(AnnotationValue::as_nested)
                    .filter(|nested| nested.name() == element)
                    .cloned(),
            );
        }
        found
    }

    /// Consume into instances
    #[must_use]
    pub fn into_vec(self) -> Vec<AnnotationInstance> {
        self.entries.into_values().collect()
    }
}

impl FromIterator<AnnotationInstance> for AnnotationSet {
    /// First occurrence of each type wins
    fn from_iter<T: IntoIterator<Item = AnnotationInstance>>(iter: T) -> Self {
        let mut set = Self::new();
        for annotation in iter {
            set.add_if_absent(annotation);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a AnnotationInstance;
    type IntoIter = indexmap::map::Values<'a, TypeName, AnnotationInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_model::ValueKind;

    fn name(s: &str) -> TypeName {
        TypeName::new(s)
    }

    #[test]
    fn set_add_replaces_same_type() {
        let mut set = AnnotationSet::new();
        assert!(set.add(AnnotationInstance::new("a.Q").with_value(1)).is_none());
        let replaced = set.add(AnnotationInstance::new("a.Q").with_value(2));
        assert_eq!(replaced, Some(AnnotationInstance::new("a.Q").with_value(1)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&name("a.Q")), Some(&AnnotationInstance::new("a.Q").with_value(2)));
    }

    #[test]
    fn set_remove_if_reports_change() {
        let mut set: AnnotationSet = [AnnotationInstance::new("a.Q"), AnnotationInstance::new("a.R")]
            .into_iter()
            .collect();
        assert!(set.remove_if(|a| a.name().as_str() == "a.Q"));
        assert!(!set.remove_if(|a| a.name().as_str() == "a.Q"));
        assert_eq!(set.names().collect::<Vec<_>>(), vec![&name("a.R")]);
    }

    #[test]
    fn set_from_iter_keeps_first_occurrence() {
        let set: AnnotationSet = [
            AnnotationInstance::new("a.Q").with_value(1),
            AnnotationInstance::new("a.Q").with_value(2),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.get(&name("a.Q")).and_then(|a| a.value("value")), Some(&AnnotationValue::Int(1)));
    }

    #[test]
    fn set_repeatable_reads_container() {
        let tag = |v: &str| AnnotationInstance::new("a.Tag").with_value(v);
        let container = AnnotationInstance::new("a.Tags").with_value(
            AnnotationValue::array(ValueKind::Nested, vec![tag("x").into(), tag("y").into()]).unwrap(),
        );
        let set: AnnotationSet = [tag("direct"), container].into_iter().collect();
        let found = set.repeatable(&name("a.Tags"), &name("a.Tag"));
        assert_eq!(found, vec![tag("direct"), tag("x"), tag("y")]);
    }
}

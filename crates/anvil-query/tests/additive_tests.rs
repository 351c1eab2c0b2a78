use anvil_index::{DeclarationIndex, IndexBuilder};
use anvil_model::{AnnotationInstance, ClassInfo, TypeName};
use anvil_overlay::FrozenAnnotations;
use anvil_query::QueryScope;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

const CLASSES: usize = 8;
const ANNOTATIONS: [&str; 3] = ["p.A", "p.B", "p.C"];

/// `p.C0` is the root; `p.C{n}` extends `p.C{n / 2}`. Annotations follow the
/// bit pattern of the class number.
fn index() -> Arc<DeclarationIndex> {
    let mut builder = IndexBuilder::new();
    for n in 0..CLASSES {
        let mut class = ClassInfo::builder(class_name(n));
        if n > 0 {
            class = class.extends(class_name(n / 2));
        }
        for (bit, annotation) in ANNOTATIONS.iter().enumerate() {
            if n & (1 << bit) != 0 {
                class = class.annotate(AnnotationInstance::new(*annotation));
            }
        }
        builder.add_class(class.build());
    }
    Arc::new(builder.build().unwrap())
}

fn names(found: &[Arc<ClassInfo>]) -> BTreeSet<TypeName> {
    found.iter().map(|c| c.name().clone()).collect()
}

fn class_name(n: usize) -> TypeName {
    TypeName::new(format!("p.C{n}"))
}

proptest! {
    #[test]
    fn prop_exactly_widens(a in 0..CLASSES, b in 0..CLASSES) {
        let annotations = FrozenAnnotations::untransformed(index());
        let scope = QueryScope::new(&annotations);
        let both = names(&scope.classes().exactly(class_name(a)).exactly(class_name(b)).find().unwrap());
        let left = names(&scope.classes().exactly(class_name(a)).find().unwrap());
        let right = names(&scope.classes().exactly(class_name(b)).find().unwrap());
        prop_assert!(both.is_superset(&left.union(&right).cloned().collect()));
    }

    #[test]
    fn prop_annotated_with_never_narrows(x in 0..3usize, y in 0..3usize) {
        let annotations = FrozenAnnotations::untransformed(index());
        let scope = QueryScope::new(&annotations);
        let both = names(&scope.classes().annotated_with(ANNOTATIONS[x]).annotated_with(ANNOTATIONS[y]).find().unwrap());
        let left = names(&scope.classes().annotated_with(ANNOTATIONS[x]).find().unwrap());
        let right = names(&scope.classes().annotated_with(ANNOTATIONS[y]).find().unwrap());
        prop_assert!(both.is_superset(&left));
        prop_assert!(both.is_superset(&right));
    }

    #[test]
    fn prop_hierarchy_queries_are_not_reflexive(n in 0..CLASSES) {
        let annotations = FrozenAnnotations::untransformed(index());
        let scope = QueryScope::new(&annotations);
        let name = class_name(n);
        prop_assert!(!names(&scope.classes().subtype_of(name.clone()).find().unwrap()).contains(&name));
        prop_assert!(!names(&scope.classes().supertype_of(name.clone()).find().unwrap()).contains(&name));
    }

    #[test]
    fn prop_families_intersect(n in 0..CLASSES, x in 0..3usize) {
        let annotations = FrozenAnnotations::untransformed(index());
        let scope = QueryScope::new(&annotations);
        let both = names(&scope.classes().subtype_of(class_name(n)).annotated_with(ANNOTATIONS[x]).find().unwrap());
        let subtypes = names(&scope.classes().subtype_of(class_name(n)).find().unwrap());
        let annotated = names(&scope.classes().annotated_with(ANNOTATIONS[x]).find().unwrap());
        prop_assert_eq!(both, subtypes.intersection(&annotated).cloned().collect::<BTreeSet<_>>());
    }
}

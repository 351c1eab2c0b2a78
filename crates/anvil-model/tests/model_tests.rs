use anvil_model::{AnnotationInstance, AnnotationValue, Type, TypeName};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

proptest! {
    #[test]
    fn prop_package_and_simple_name_rebuild_the_name(
        package in proptest::collection::vec(segment(), 0..4),
        simple in "[A-Z][A-Za-z0-9]{0,8}",
    ) {
        let full = if package.is_empty() { simple.clone() } else { format!("{}.{simple}", package.join(".")) };
        let name = TypeName::new(&full);
        prop_assert_eq!(name.simple_name(), simple.as_str());
        prop_assert_eq!(name.package(), package.join("."));
        prop_assert!(name.is_valid());
    }

    #[test]
    fn prop_erased_name_ignores_type_arguments(depth in 0usize..4) {
        let mut ty = Type::class("m.Box");
        for _ in 0..depth {
            ty = Type::parameterized("m.Box", vec![ty]);
        }
        prop_assert_eq!(ty.name(), TypeName::new("m.Box"));
    }
}

#[test]
fn annotation_display_lists_members_in_order() {
    let instance = AnnotationInstance::new("m.Named")
        .with("value", "main")
        .with("order", AnnotationValue::from(2));
    assert_eq!(instance.to_string(), "@m.Named(value=\"main\", order=2)");
    assert!(!instance.is_marker());
}

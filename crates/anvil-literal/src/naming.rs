//! Generated class names

use anvil_model::{AnnotationInstance, ContentHash, TypeName};
use std::fmt::Write as _;

/// Suffix carried by every generated literal class
pub const LITERAL_SUFFIX: &str = "_AnnotationLiteral";

/// Suffix marker of shared literal classes
pub const SHARED_MARKER: &str = "_Shared";

/// Package receiving literals of `java.lang` annotations
pub const DEFAULT_GENERATED_PACKAGE: &str = "anvil.generated";

/// Superclass of every literal class
pub const LITERAL_SUPERCLASS: &str = "anvil.runtime.AnnotationLiteral";

fn is_protected_package(package: &str) -> bool {
    package == "java.lang" || package.starts_with("java.lang.")
}

/// Name of the shared literal class for `annotation`
///
/// Types in `java.lang` cannot receive new classes, so their literals move to
/// `generated_package` under the simple name.
#[must_use]
pub fn shared_name(annotation: &TypeName, generated_package: &str) -> TypeName {
    let base = if annotation.is_java_lang() {
        format!("{generated_package}.{}", annotation.simple_name())
    } else {
        annotation.as_str().to_owned()
    };
    TypeName::new(format!("{base}{SHARED_MARKER}{LITERAL_SUFFIX}"))
}

/// Name of a one-off literal class for `instance`, placed in `target_package`
#[must_use]
pub fn one_off_name(instance: &AnnotationInstance, target_package: &str, generated_package: &str) -> TypeName {
    let package = if is_protected_package(target_package) {
        generated_package
    } else {
        target_package
    };
    let simple = instance.name().simple_name();
    let hash = instance_hash(instance);
    if package.is_empty() {
        TypeName::new(format!("{simple}{hash}{LITERAL_SUFFIX}"))
    } else {
        TypeName::new(format!("{package}.{simple}{hash}{LITERAL_SUFFIX}"))
    }
}

/// Content hash of the instance with members in name order
///
/// Equal instances hash equally regardless of the order members were set in.
#[must_use]
pub fn instance_hash(instance: &AnnotationInstance) -> ContentHash {
    let mut members: Vec<_> = instance.values().collect();
    members.sort_by(|a, b| a.0.cmp(b.0));
    let mut canonical = format!("@{}(", instance.name());
    for (i, (member, value)) in members.into_iter().enumerate() {
        if i > 0 {
            canonical.push_str(", ");
        }
        let _ = write!(canonical, "{member}={value}");
    }
    canonical.push(')');
    ContentHash::compute(canonical.as_bytes())
}

/// Static field holding the default of a class-typed member
#[must_use]
pub fn default_value_field(member: &str) -> String {
    format!("{member}_default_value")
}

/// Generic signature `AnnotationLiteral<A>` + `A`
#[must_use]
pub fn literal_signature(annotation: &TypeName) -> String {
    let internal = annotation.as_str().replace('.', "/");
    let superclass = LITERAL_SUPERCLASS.replace('.', "/");
    format!("L{superclass}<L{internal};>;L{internal};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shared_names() {
        assert_eq!(
            shared_name(&TypeName::new("com.acme.Named"), DEFAULT_GENERATED_PACKAGE).as_str(),
            "com.acme.Named_Shared_AnnotationLiteral"
        );
        assert_eq!(
            shared_name(&TypeName::new("java.lang.annotation.Retention"), DEFAULT_GENERATED_PACKAGE).as_str(),
            "anvil.generated.Retention_Shared_AnnotationLiteral"
        );
        assert_eq!(
            shared_name(&TypeName::new("java.language.Tag"), DEFAULT_GENERATED_PACKAGE).as_str(),
            "java.language.Tag_Shared_AnnotationLiteral"
        );
    }

    #[test]
    fn one_off_names_ignore_member_order() {
        let a = AnnotationInstance::new("com.acme.Range").with("min", 1).with("max", 5);
        let b = AnnotationInstance::new("com.acme.Range").with("max", 5).with("min", 1);
        let name = one_off_name(&a, "com.app", DEFAULT_GENERATED_PACKAGE);
        assert_eq!(name, one_off_name(&b, "com.app", DEFAULT_GENERATED_PACKAGE));
        assert!(name.as_str().starts_with("com.app.Range"));
        assert!(name.as_str().ends_with(LITERAL_SUFFIX));

        let other = AnnotationInstance::new("com.acme.Range").with("min", 2).with("max", 5);
        assert_ne!(name, one_off_name(&other, "com.app", DEFAULT_GENERATED_PACKAGE));
    }

    #[test]
    fn one_off_names_leave_java_lang() {
        let instance = AnnotationInstance::new("java.lang.Deprecated");
        let name = one_off_name(&instance, "java.lang", DEFAULT_GENERATED_PACKAGE);
        assert!(name.as_str().starts_with("anvil.generated.Deprecated"));
    }

    #[test]
    fn signature_uses_internal_names() {
        assert_eq!(
            literal_signature(&TypeName::new("a.B")),
            "Lanvil/runtime/AnnotationLiteral<La/B;>;La/B;"
        );
    }
}

//! Declarations: classes, methods, fields and parameters
//!
//! Declarations are immutable once built. Member declarations are shared
//! through [`Arc`] so that queries can hand them out cheaply.

use crate::annotation::{AnnotationInstance, AnnotationValue};
use crate::key::{ClassKey, FieldKey, MethodKey, ParameterKey};
use crate::name::TypeName;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Constructor method name
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Static initializer method name
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// Kind of class declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Regular class
    #[default]
    Class,
    /// Interface
    Interface,
    /// Annotation type
    Annotation,
    /// Enum
    Enum,
}

/// A class, interface, enum or annotation type
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    name: TypeName,
    kind: ClassKind,
    super_name: Option<TypeName>,
    interfaces: Vec<TypeName>,
    annotations: Vec<AnnotationInstance>,
    methods: Vec<Arc<MethodInfo>>,
    fields: Vec<Arc<FieldInfo>>,
}

impl ClassInfo {
    /// Start building a class
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<TypeName>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> ClassKey {
        ClassKey::new(self.name.clone())
    }

    /// Fully-qualified name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Declaration kind
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Check if annotation type
    #[inline]
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.kind == ClassKind::Annotation
    }

    /// Direct superclass
    #[inline]
    #[must_use]
    pub fn super_name(&self) -> Option<&TypeName> {
        self.super_name.as_ref()
    }

    /// Directly implemented (or extended, for interfaces) interfaces
    #[inline]
    #[must_use]
    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }

    /// Annotations declared on the class itself
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }

    /// Declared methods, constructors included
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    /// Declared fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        &self.fields
    }

    /// Declared methods that are neither constructors nor initializers
    ///
    /// For annotation types these are the annotation members.
    pub fn regular_methods(&self) -> impl Iterator<Item = &Arc<MethodInfo>> {
        self.methods.iter().filter(|m| m.is_regular())
    }

    /// Lookup method by name and parameter types
    #[must_use]
    pub fn method(&self, name: &str, parameter_types: &[Type]) -> Option<&Arc<MethodInfo>> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.key().parameter_types() == parameter_types)
    }

    /// Lookup field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Check for a directly declared annotation
    #[must_use]
    pub fn has_declared_annotation(&self, name: &TypeName) -> bool {
        self.annotations.iter().any(|a| a.name() == name)
    }
}

/// Builder for [`ClassInfo`]
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: TypeName,
    kind: ClassKind,
    super_name: Option<TypeName>,
    interfaces: Vec<TypeName>,
    annotations: Vec<AnnotationInstance>,
    methods: Vec<MethodBuilder>,
    fields: Vec<FieldBuilder>,
}

impl ClassBuilder {
    /// New builder for a plain class
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            super_name: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Set declaration kind
    #[must_use]
    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set superclass
    #[must_use]
    pub fn extends(mut self, super_name: impl Into<TypeName>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    /// Add implemented interface
    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add class-level annotation
    #[must_use]
    pub fn annotate(mut self, annotation: AnnotationInstance) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add method
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Add field
    #[must_use]
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish the class, binding members to it
    #[must_use]
    pub fn build(self) -> ClassInfo {
        let name = self.name;
        let methods = self
            .methods
            .into_iter()
            .map(|m| Arc::new(m.build(&name)))
            .collect();
        let fields = self
            .fields
            .into_iter()
            .map(|f| Arc::new(f.build(&name)))
            .collect();
        ClassInfo {
            name,
            kind: self.kind,
            super_name: self.super_name,
            interfaces: self.interfaces,
            annotations: self.annotations,
            methods,
            fields,
        }
    }
}

/// A method, constructor or annotation member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    key: MethodKey,
    parameters: Vec<ParameterInfo>,
    return_type: Type,
    annotations: Vec<AnnotationInstance>,
    default_value: Option<AnnotationValue>,
    is_static: bool,
}

impl MethodInfo {
    /// Start building a method
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder::new(name)
    }

    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Declaring class
    #[inline]
    #[must_use]
    pub fn declaring_class(&self) -> &TypeName {
        self.key.class()
    }

    /// Parameters in order
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Return type
    #[inline]
    #[must_use]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Method-level annotations
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }

    /// Default value of an annotation member
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&AnnotationValue> {
        self.default_value.as_ref()
    }

    /// Check if static
    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Check if constructor
    #[inline]
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name() == CONSTRUCTOR_NAME
    }

    /// Neither constructor nor static initializer
    #[inline]
    #[must_use]
    pub fn is_regular(&self) -> bool {
        !self.is_constructor() && self.name() != STATIC_INITIALIZER_NAME
    }
}

/// Builder for [`MethodInfo`]
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    parameters: Vec<(Type, Option<String>, Vec<AnnotationInstance>)>,
    return_type: Type,
    annotations: Vec<AnnotationInstance>,
    default_value: Option<AnnotationValue>,
    is_static: bool,
}

impl MethodBuilder {
    /// New builder for a `void` method
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: Type::Void,
            annotations: Vec::new(),
            default_value: None,
            is_static: false,
        }
    }

    /// Constructor builder
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(CONSTRUCTOR_NAME)
    }

    /// Append unnamed parameter
    #[must_use]
    pub fn parameter(mut self, ty: impl Into<Type>) -> Self {
        self.parameters.push((ty.into(), None, Vec::new()));
        self
    }

    /// Append named parameter with annotations
    #[must_use]
    pub fn annotated_parameter(
        mut self,
        ty: impl Into<Type>,
        name: impl Into<String>,
        annotations: Vec<AnnotationInstance>,
    ) -> Self {
        self.parameters.push((ty.into(), Some(name.into()), annotations));
        self
    }

    /// Set return type
    #[must_use]
    pub fn returns(mut self, ty: impl Into<Type>) -> Self {
        self.return_type = ty.into();
        self
    }

    /// Add method-level annotation
    #[must_use]
    pub fn annotate(mut self, annotation: AnnotationInstance) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Set annotation member default
    #[must_use]
    pub fn default_value(mut self, value: impl Into<AnnotationValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Mark static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    fn build(self, class: &TypeName) -> MethodInfo {
        let parameter_types = self.parameters.iter().map(|(ty, _, _)| ty.clone()).collect();
        let key = MethodKey::new(class.clone(), self.name, parameter_types);
        let parameters = self
            .parameters
            .into_iter()
            .enumerate()
            .map(|(position, (ty, name, annotations))| ParameterInfo {
                // parameter lists never approach u16::MAX
                key: key.parameter(u16::try_from(position).unwrap_or(u16::MAX)),
                ty,
                name,
                annotations,
            })
            .collect();
        MethodInfo {
            key,
            parameters,
            return_type: self.return_type,
            annotations: self.annotations,
            default_value: self.default_value,
            is_static: self.is_static,
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    key: ParameterKey,
    ty: Type,
    name: Option<String>,
    annotations: Vec<AnnotationInstance>,
}

impl ParameterInfo {
    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ParameterKey {
        &self.key
    }

    /// Zero-based position
    #[inline]
    #[must_use]
    pub fn position(&self) -> u16 {
        self.key.position()
    }

    /// Parameter type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Source name, when recorded
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parameter annotations
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }
}

/// A field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    key: FieldKey,
    ty: Type,
    annotations: Vec<AnnotationInstance>,
    is_static: bool,
}

impl FieldInfo {
    /// Start building a field
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<String>, ty: impl Into<Type>) -> FieldBuilder {
        FieldBuilder::new(name, ty)
    }

    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Declaring class
    #[inline]
    #[must_use]
    pub fn declaring_class(&self) -> &TypeName {
        self.key.class()
    }

    /// Field type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Field annotations
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }

    /// Check if static
    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }
}

/// Builder for [`FieldInfo`]
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    ty: Type,
    annotations: Vec<AnnotationInstance>,
    is_static: bool,
}

impl FieldBuilder {
    /// New builder
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            annotations: Vec::new(),
            is_static: false,
        }
    }

    /// Add annotation
    #[must_use]
    pub fn annotate(mut self, annotation: AnnotationInstance) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Mark static
    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    fn build(self, class: &TypeName) -> FieldInfo {
        FieldInfo {
            key: FieldKey::new(class.clone(), self.name),
            ty: self.ty,
            annotations: self.annotations,
            is_static: self.is_static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    #[test]
    fn builder_binds_members_to_class() {
        let class = ClassInfo::builder("com.acme.Greeter")
            .method(MethodBuilder::constructor())
            .method(
                MethodInfo::builder("greet")
                    .annotated_parameter(Type::class("java.lang.String"), "who", vec![])
                    .returns(Type::class("java.lang.String")),
            )
            .field(FieldInfo::builder("count", PrimitiveKind::Int))
            .build();

        assert_eq!(class.methods().len(), 2);
        assert_eq!(class.regular_methods().count(), 1);

        let greet = class.method("greet", &[Type::class("java.lang.String")]).unwrap();
        assert_eq!(greet.declaring_class().as_str(), "com.acme.Greeter");
        assert_eq!(greet.parameters()[0].key().method(), greet.key());
        assert_eq!(greet.parameters()[0].name(), Some("who"));

        let field = class.field("count").unwrap();
        assert_eq!(field.key(), &FieldKey::new("com.acme.Greeter", "count"));
    }

    #[test]
    fn annotation_members_carry_defaults() {
        let class = ClassInfo::builder("com.acme.Named")
            .kind(ClassKind::Annotation)
            .method(
                MethodInfo::builder("value")
                    .returns(Type::class("java.lang.String"))
                    .default_value(""),
            )
            .build();
        assert!(class.is_annotation());
        let member = &class.methods()[0];
        assert_eq!(member.default_value(), Some(&AnnotationValue::string("")));
    }
}

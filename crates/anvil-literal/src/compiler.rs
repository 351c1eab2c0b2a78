//! Annotation literal compiler

use crate::cache::{CacheStats, LiteralCache, LiteralClassData};
use crate::class::{ClassOutput, GeneratedClass, GeneratedField, GeneratedMethod, MethodBody, StaticInit};
use crate::error::LiteralError;
use crate::handle::{Constant, EmptyArrayKind, ValueHandle};
use crate::naming::{
    default_value_field, literal_signature, one_off_name, shared_name, DEFAULT_GENERATED_PACKAGE, LITERAL_SUPERCLASS,
};
use anvil_index::DeclarationIndex;
use anvil_model::{
    AnnotationInstance, AnnotationValue, ClassInfo, MethodInfo, Type, TypeName, ValueKind, CLASS_TYPE, STRING_TYPE,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Predicate deciding whether a shared literal is an application class
pub type ApplicationClassPredicate = Arc<dyn Fn(&TypeName) -> bool + Send + Sync>;

/// Compiler statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStats {
    /// Shared cache statistics (zero when sharing is off)
    pub shared: CacheStats,
    /// One-off classes written
    pub one_off_classes: usize,
    /// Top-level and nested instances materialized
    pub materialized: usize,
}

/// Turns annotation instances into [`ValueHandle`]s
///
/// With sharing on, one literal class per annotation type is synthesized and
/// each instance becomes a constructor call with its member values. With
/// sharing off, each instance gets its own class written immediately to the
/// output, with member values hard-coded.
pub struct LiteralCompiler {
    index: Arc<DeclarationIndex>,
    cache: Option<LiteralCache>,
    application_classes: ApplicationClassPredicate,
    generated_package: String,
    one_off_classes: AtomicUsize,
    materialized: AtomicUsize,
}

impl LiteralCompiler {
    /// Create compiler over `index`
    #[must_use]
    pub fn new(index: Arc<DeclarationIndex>, shared: bool) -> Self {
        Self {
            index,
            cache: shared.then(LiteralCache::new),
            application_classes: Arc::new(|_| true),
            generated_package: DEFAULT_GENERATED_PACKAGE.to_owned(),
            one_off_classes: AtomicUsize::new(0),
            materialized: AtomicUsize::new(0),
        }
    }

    /// Decide per annotation type whether its shared literal is an application class
    #[must_use]
    pub fn with_application_classes(mut self, predicate: impl Fn(&TypeName) -> bool + Send + Sync + 'static) -> Self {
        self.application_classes = Arc::new(predicate);
        self
    }

    /// Package receiving literals that cannot live next to their annotation
    #[must_use]
    pub fn with_generated_package(mut self, package: impl Into<String>) -> Self {
        self.generated_package = package.into();
        self
    }

    /// Whether literal classes are shared per annotation type
    #[inline]
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.cache.is_some()
    }

    /// Index used to resolve annotation types
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<DeclarationIndex> {
        &self.index
    }

    /// Materialize `instance`, resolving its annotation type from the index
    ///
    /// # Errors
    ///
    /// [`LiteralError::MissingAnnotationClass`] if the type is not indexed,
    /// otherwise as [`Self::materialize`].
    pub fn materialize_instance(
        &self,
        output: &dyn ClassOutput,
        instance: &AnnotationInstance,
        target_package: &str,
    ) -> Result<ValueHandle, LiteralError> {
        let class = self
            .index
            .class(instance.name())
            .ok_or_else(|| LiteralError::MissingAnnotationClass {
                annotation: instance.name().clone(),
            })?;
        self.materialize(output, class, instance, target_package)
    }

    /// Produce the instructions that construct `instance` at runtime
    ///
    /// `target_package` is where a one-off literal class is placed.
    ///
    /// # Errors
    ///
    /// - [`LiteralError::AnnotationMismatch`] if `instance` is not of `annotation_class`
    /// - [`LiteralError::MissingValue`] if a member has neither value nor default
    /// - [`LiteralError::MissingNestedAnnotationClass`] if a nested type is not indexed
    /// - [`LiteralError::UnsupportedValue`] if a value does not fit its member type
    pub fn materialize(
        &self,
        output: &dyn ClassOutput,
        annotation_class: &Arc<ClassInfo>,
        instance: &AnnotationInstance,
        target_package: &str,
    ) -> Result<ValueHandle, LiteralError> {
        if annotation_class.name() != instance.name() {
            return Err(LiteralError::AnnotationMismatch {
                class: annotation_class.name().clone(),
                instance: instance.name().clone(),
            });
        }
        self.materialized.fetch_add(1, Ordering::Relaxed);

        if let Some(cache) = &self.cache {
            let literal = cache.get_or_synthesize(annotation_class.name(), || {
                LiteralClassData::new(
                    shared_name(annotation_class.name(), &self.generated_package),
                    (self.application_classes)(annotation_class.name()),
                    Arc::clone(annotation_class),
                )
            });
            let arguments = literal
                .members
                .iter()
                .map(|member| {
                    let value = member_value(&literal, member, instance)?;
                    self.load_value(output, &literal, member, value)
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ValueHandle::NewInstance {
                class: literal.generated_name.clone(),
                constructor: constructor_types(&literal),
                arguments,
            });
        }

        let literal = LiteralClassData::new(
            one_off_name(instance, target_package, &self.generated_package),
            false,
            Arc::clone(annotation_class),
        );
        let class = self.one_off_class(output, &literal, instance)?;
        tracing::trace!(literal = %class.name, annotation = %instance.name(), "Wrote one-off literal class");
        let handle = ValueHandle::NewInstance {
            class: class.name.clone(),
            constructor: Vec::new(),
            arguments: Vec::new(),
        };
        output.write(class);
        self.one_off_classes.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Descriptors of every shared literal class not in `existing`
    ///
    /// Empty when sharing is off; one-off classes are written as they are
    /// materialized.
    #[must_use]
    pub fn generate(&self, existing: &HashSet<TypeName>) -> Vec<GeneratedClass> {
        let Some(cache) = &self.cache else {
            return Vec::new();
        };
        cache
            .synthesized()
            .iter()
            .filter(|literal| {
                let skip = existing.contains(&literal.generated_name);
                if skip {
                    tracing::debug!(literal = %literal.generated_name, "Shared literal class already exists");
                }
                !skip
            })
            .map(|literal| shared_class(literal))
            .collect()
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> LiteralStats {
        LiteralStats {
            shared: self
                .cache
                .as_ref()
                .map_or(CacheStats { entry_count: 0 }, LiteralCache::stats),
            one_off_classes: self.one_off_classes.load(Ordering::Relaxed),
            materialized: self.materialized.load(Ordering::Relaxed),
        }
    }

    fn one_off_class(
        &self,
        output: &dyn ClassOutput,
        literal: &LiteralClassData,
        instance: &AnnotationInstance,
    ) -> Result<GeneratedClass, LiteralError> {
        let methods = literal
            .members
            .iter()
            .map(|member| {
                let value = member_value(literal, member, instance)?;
                Ok(GeneratedMethod {
                    name: member.name().to_owned(),
                    return_type: member.return_type().clone(),
                    body: MethodBody::ReturnValue {
                        value: self.load_value(output, literal, member, value)?,
                    },
                })
            })
            .collect::<Result<Vec<_>, LiteralError>>()?;

        let (fields, static_init) = default_statics(literal);
        Ok(GeneratedClass {
            name: literal.generated_name.clone(),
            application_class: literal.application_class,
            super_class: TypeName::new(LITERAL_SUPERCLASS),
            interfaces: vec![literal.annotation.name().clone()],
            signature: literal_signature(literal.annotation.name()),
            fields,
            constructor: Vec::new(),
            methods,
            static_init,
        })
    }

    fn load_value(
        &self,
        output: &dyn ClassOutput,
        literal: &LiteralClassData,
        member: &MethodInfo,
        value: &AnnotationValue,
    ) -> Result<ValueHandle, LiteralError> {
        if member.return_type().is_class_or_class_array() && member.default_value() == Some(value) {
            return Ok(ValueHandle::ReadStaticField {
                owner: literal.generated_name.clone(),
                field: default_value_field(member.name()),
                field_type: member.return_type().clone(),
            });
        }

        let AnnotationValue::Array { elements, .. } = value else {
            if member.return_type().is_array() {
                return Err(unsupported(literal, member, value));
            }
            return self.load_scalar(output, literal, member, member.return_type(), value);
        };
        let component = member
            .return_type()
            .component()
            .ok_or_else(|| unsupported(literal, member, value))?;
        if elements.is_empty() {
            return Ok(EmptyArrayKind::for_component(component).map_or_else(
                || ValueHandle::NewArray {
                    component: component.clone(),
                    elements: Vec::new(),
                },
                |kind| ValueHandle::EmptyArray { kind },
            ));
        }
        let elements = elements
            .iter()
            .map(|element| self.load_scalar(output, literal, member, component, element))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ValueHandle::NewArray {
            component: component.clone(),
            elements,
        })
    }

    fn load_scalar(
        &self,
        output: &dyn ClassOutput,
        literal: &LiteralClassData,
        member: &MethodInfo,
        expected: &Type,
        value: &AnnotationValue,
    ) -> Result<ValueHandle, LiteralError> {
        if !value_fits(expected, value) {
            return Err(unsupported(literal, member, value));
        }
        let constant = match value {
            AnnotationValue::Boolean(v) => Constant::Boolean(*v),
            AnnotationValue::Byte(v) => Constant::Byte(*v),
            AnnotationValue::Short(v) => Constant::Short(*v),
            AnnotationValue::Int(v) => Constant::Int(*v),
            AnnotationValue::Long(v) => Constant::Long(*v),
            AnnotationValue::Float(v) => Constant::Float(*v),
            AnnotationValue::Double(v) => Constant::Double(*v),
            AnnotationValue::Char(v) => Constant::Char(*v),
            AnnotationValue::String(v) => Constant::String(v.clone()),
            AnnotationValue::Enum { type_name, constant } => {
                return Ok(ValueHandle::EnumConstant {
                    enum_type: type_name.clone(),
                    constant: constant.clone(),
                })
            }
            AnnotationValue::Class(ty) => return Ok(ValueHandle::LoadClass { class: ty.name() }),
            AnnotationValue::Nested(nested) => return self.load_nested(output, nested),
            AnnotationValue::Array { .. } => return Err(unsupported(literal, member, value)),
        };
        Ok(ValueHandle::constant(constant))
    }

    fn load_nested(&self, output: &dyn ClassOutput, nested: &AnnotationInstance) -> Result<ValueHandle, LiteralError> {
        let class = self
            .index
            .class(nested.name())
            .ok_or_else(|| LiteralError::MissingNestedAnnotationClass {
                annotation: nested.to_string(),
            })?;
        self.materialize(output, class, nested, nested.name().package())
    }
}

impl std::fmt::Debug for LiteralCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteralCompiler")
            .field("shared", &self.is_shared())
            .field("generated_package", &self.generated_package)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn member_value<'v>(
    literal: &LiteralClassData,
    member: &'v MethodInfo,
    instance: &'v AnnotationInstance,
) -> Result<&'v AnnotationValue, LiteralError> {
    instance
        .value(member.name())
        .or_else(|| member.default_value())
        .ok_or_else(|| LiteralError::MissingValue {
            annotation: literal.annotation.name().clone(),
            member: member.name().to_owned(),
        })
}

/// Whether a scalar `value` can be stored in a member of type `expected`
///
/// Class-typed members other than `String` and `Class` hold either an enum
/// constant or a nested annotation of exactly that type.
fn value_fits(expected: &Type, value: &AnnotationValue) -> bool {
    if let Type::Primitive { primitive } = expected {
        return value.kind() == ValueKind::of_primitive(*primitive);
    }
    let Some(name) = expected.class_name() else {
        return false;
    };
    match value {
        AnnotationValue::String(_) => name.as_str() == STRING_TYPE,
        AnnotationValue::Class(_) => name.as_str() == CLASS_TYPE,
        AnnotationValue::Enum { type_name, .. } => type_name == name,
        AnnotationValue::Nested(nested) => nested.name() == name,
        _ => false,
    }
}

fn unsupported(literal: &LiteralClassData, member: &MethodInfo, value: &AnnotationValue) -> LiteralError {
    LiteralError::UnsupportedValue {
        annotation: literal.annotation.name().clone(),
        member: member.name().to_owned(),
        value: value.to_string(),
    }
}

fn constructor_types(literal: &LiteralClassData) -> Vec<Type> {
    literal.members.iter().map(|m| m.return_type().clone()).collect()
}

/// Static `<member>_default_value` fields for class-typed members with defaults
fn default_statics(literal: &LiteralClassData) -> (Vec<GeneratedField>, Vec<StaticInit>) {
    literal
        .members
        .iter()
        .filter(|member| member.return_type().is_class_or_class_array())
        .filter_map(|member| {
            let default = member.default_value()?;
            let value = match default {
                AnnotationValue::Class(ty) => ValueHandle::LoadClass { class: ty.name() },
                AnnotationValue::Array { elements, .. } => {
                    let component = member.return_type().component()?.clone();
                    let elements: Vec<_> = elements
                        .iter()
                        .filter_map(|element| match element {
                            AnnotationValue::Class(ty) => Some(ValueHandle::LoadClass { class: ty.name() }),
                            _ => None,
                        })
                        .collect();
                    ValueHandle::NewArray { component, elements }
                }
                _ => return None,
            };
            let field = default_value_field(member.name());
            Some((
                GeneratedField {
                    name: field.clone(),
                    ty: member.return_type().clone(),
                    is_static: true,
                },
                StaticInit { field, value },
            ))
        })
        .unzip()
}

fn shared_class(literal: &LiteralClassData) -> GeneratedClass {
    let (statics, static_init) = default_statics(literal);
    let fields = literal
        .members
        .iter()
        .map(|member| GeneratedField {
            name: member.name().to_owned(),
            ty: member.return_type().clone(),
            is_static: false,
        })
        .chain(statics)
        .collect();
    let methods = literal
        .members
        .iter()
        .map(|member| GeneratedMethod {
            name: member.name().to_owned(),
            return_type: member.return_type().clone(),
            body: MethodBody::ReturnField {
                field: member.name().to_owned(),
            },
        })
        .collect();
    GeneratedClass {
        name: literal.generated_name.clone(),
        application_class: literal.application_class,
        super_class: TypeName::new(LITERAL_SUPERCLASS),
        interfaces: vec![literal.annotation.name().clone()],
        signature: literal_signature(literal.annotation.name()),
        fields,
        constructor: constructor_types(literal),
        methods,
        static_init,
    }
}

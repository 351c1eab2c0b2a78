//! Annotation instances and the recursive annotation value tree

use crate::error::ModelError;
use crate::name::TypeName;
use crate::types::{PrimitiveKind, Type};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter, Write as _};
use std::hash::{Hash, Hasher};

/// Kind tag of an [`AnnotationValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `char`
    Char,
    /// `String`
    String,
    /// Enum constant
    Enum,
    /// Class literal
    Class,
    /// Nested annotation
    Nested,
    /// Array
    Array,
}

impl ValueKind {
    /// Value kind stored for a primitive member type
    #[must_use]
    pub const fn of_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => Self::Boolean,
            PrimitiveKind::Byte => Self::Byte,
            PrimitiveKind::Short => Self::Short,
            PrimitiveKind::Int => Self::Int,
            PrimitiveKind::Long => Self::Long,
            PrimitiveKind::Float => Self::Float,
            PrimitiveKind::Double => Self::Double,
            PrimitiveKind::Char => Self::Char,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Class => "class",
            Self::Nested => "nested",
            Self::Array => "array",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Annotation member value
///
/// Arrays carry their component kind explicitly so that empty arrays keep
/// their declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `char`
    Char(char),
    /// `String`
    String(String),
    /// Enum constant
    Enum {
        /// Enum type
        type_name: TypeName,
        /// Constant name
        constant: String,
    },
    /// Class literal
    Class(Type),
    /// Nested annotation
    Nested(AnnotationInstance),
    /// Homogeneous array
    Array {
        /// Component kind, kept for empty arrays
        component: ValueKind,
        /// Elements in order
        elements: Vec<AnnotationValue>,
    },
}

impl AnnotationValue {
    /// String value
    #[inline]
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Enum constant value
    #[inline]
    #[must_use]
    pub fn enum_constant(type_name: impl Into<TypeName>, constant: impl Into<String>) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            constant: constant.into(),
        }
    }

    /// Class literal naming `name`
    #[inline]
    #[must_use]
    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::Class(Type::class(name))
    }

    /// Array value
    ///
    /// # Errors
    /// Returns error if an element does not match `component`
    pub fn array(component: ValueKind, elements: Vec<Self>) -> Result<Self, ModelError> {
        if let Some(bad) = elements.iter().find(|e| e.kind() != component) {
            return Err(ModelError::HeterogeneousArray {
                expected: component.to_string(),
                actual: bad.kind().to_string(),
            });
        }
        Ok(Self::Array {
            component,
            elements,
        })
    }

    /// Zero-length array of `component`
    #[inline]
    #[must_use]
    pub const fn empty_array(component: ValueKind) -> Self {
        Self::Array {
            component,
            elements: Vec::new(),
        }
    }

    /// Kind tag
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Byte(_) => ValueKind::Byte,
            Self::Short(_) => ValueKind::Short,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
            Self::Enum { .. } => ValueKind::Enum,
            Self::Class(_) => ValueKind::Class,
            Self::Nested(_) => ValueKind::Nested,
            Self::Array { .. } => ValueKind::Array,
        }
    }

    /// String payload
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Nested annotation payload
    #[inline]
    #[must_use]
    pub fn as_nested(&self) -> Option<&AnnotationInstance> {
        match self {
            Self::Nested(value) => Some(value),
            _ => None,
        }
    }

    /// Array elements
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            // bitwise, so NaN == NaN and equality stays total
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (
                Self::Enum {
                    type_name: ta,
                    constant: ca,
                },
                Self::Enum {
                    type_name: tb,
                    constant: cb,
                },
            ) => ta == tb && ca == cb,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a == b,
            (
                Self::Array {
                    component: ca,
                    elements: ea,
                },
                Self::Array {
                    component: cb,
                    elements: eb,
                },
            ) => ca == cb && ea == eb,
            _ => false,
        }
    }
}

impl Eq for AnnotationValue {}

impl Hash for AnnotationValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Boolean(v) => v.hash(state),
            Self::Byte(v) => v.hash(state),
            Self::Short(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::Char(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::Enum {
                type_name,
                constant,
            } => {
                type_name.hash(state);
                constant.hash(state);
            }
            Self::Class(v) => v.hash(state),
            Self::Nested(v) => v.hash(state),
            Self::Array {
                component,
                elements,
            } => {
                component.hash(state);
                elements.hash(state);
            }
        }
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "(byte) {v}"),
            Self::Short(v) => write!(f, "(short) {v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Float(v) => write!(f, "{v:?}f"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Char(v) => write!(f, "'{}'", v.escape_default()),
            Self::String(v) => write!(f, "\"{}\"", v.escape_default()),
            Self::Enum {
                type_name,
                constant,
            } => write!(f, "{type_name}.{constant}"),
            Self::Class(ty) => write!(f, "{ty}.class"),
            Self::Nested(instance) => write!(f, "{instance}"),
            Self::Array { elements, .. } => {
                f.write_char('{')?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for AnnotationValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for AnnotationValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<AnnotationInstance> for AnnotationValue {
    fn from(value: AnnotationInstance) -> Self {
        Self::Nested(value)
    }
}

/// An annotation applied to a declaration
///
/// Equality and hashing are structural and ignore member order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationInstance {
    name: TypeName,
    values: IndexMap<String, AnnotationValue>,
}

impl AnnotationInstance {
    /// Marker annotation without members
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    /// Set member value, returning self for chaining
    #[inline]
    #[must_use]
    pub fn with(mut self, member: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.values.insert(member.into(), value.into());
        self
    }

    /// Set the `value` member
    #[inline]
    #[must_use]
    pub fn with_value(self, value: impl Into<AnnotationValue>) -> Self {
        self.with(crate::VALUE_MEMBER, value)
    }

    /// Annotation type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Explicitly set member value
    #[inline]
    #[must_use]
    pub fn value(&self, member: &str) -> Option<&AnnotationValue> {
        self.values.get(member)
    }

    /// Explicit members in declaration order
    pub fn values(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if no member is set explicitly
    #[inline]
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for AnnotationInstance {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.values == other.values
    }
}

impl Eq for AnnotationInstance {}

impl Hash for AnnotationInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        let mut members: Vec<_> = self.values.iter().collect();
        members.sort_by(|a, b| a.0.cmp(b.0));
        members.hash(state);
    }
}

impl Display for AnnotationInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_char('(')?;
        for (i, (member, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}={value}")?;
        }
        f.write_char(')')
    }
}

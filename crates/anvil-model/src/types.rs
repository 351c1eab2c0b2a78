//! Declared types of members, parameters and annotation values

use crate::error::ModelError;
use crate::name::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Primitive type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
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
}

impl PrimitiveKind {
    /// All primitive kinds in declaration order
    pub const ALL: [Self; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Char,
    ];

    /// Source keyword
    #[inline]
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword() == s)
            .ok_or_else(|| ModelError::UnknownPrimitive { name: s.to_string() })
    }
}

/// A declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    /// `void` return type
    Void,

    /// Primitive type
    Primitive {
        /// Which primitive
        primitive: PrimitiveKind,
    },

    /// Class or interface type
    Class {
        /// Fully-qualified name
        name: TypeName,
    },

    /// Array type
    Array {
        /// Component type
        component: Box<Type>,
    },

    /// Generic type with type arguments
    Parameterized {
        /// Erased type
        raw: TypeName,
        /// Type arguments
        arguments: Vec<Type>,
    },
}

impl Type {
    /// Class type
    #[inline]
    #[must_use]
    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::Class { name: name.into() }
    }

    /// Primitive type
    #[inline]
    #[must_use]
    pub const fn primitive(primitive: PrimitiveKind) -> Self {
        Self::Primitive { primitive }
    }

    /// Array of `component`
    #[inline]
    #[must_use]
    pub fn array_of(component: Self) -> Self {
        Self::Array {
            component: Box::new(component),
        }
    }

    /// Generic type
    #[inline]
    #[must_use]
    pub fn parameterized(raw: impl Into<TypeName>, arguments: Vec<Self>) -> Self {
        Self::Parameterized {
            raw: raw.into(),
            arguments,
        }
    }

    /// Erased name
    ///
    /// Arrays render as the component name followed by `[]`.
    #[must_use]
    pub fn name(&self) -> TypeName {
        match self {
            Self::Void => TypeName::new("void"),
            Self::Primitive { primitive } => TypeName::new(primitive.keyword()),
            Self::Class { name } | Self::Parameterized { raw: name, .. } => name.clone(),
            Self::Array { component } => TypeName::new(format!("{}[]", component.name())),
        }
    }

    /// Component type for arrays
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&Self> {
        match self {
            Self::Array { component } => Some(component),
            _ => None,
        }
    }

    /// Class name for class and parameterized types
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> Option<&TypeName> {
        match self {
            Self::Class { name } | Self::Parameterized { raw: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Check if array type
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// Check if this is `java.lang.Class` or an array of it
    #[must_use]
    pub fn is_class_or_class_array(&self) -> bool {
        let target = self.component().unwrap_or(self);
        target
            .class_name()
            .is_some_and(|name| name.as_str() == crate::CLASS_TYPE)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameterized { raw, arguments } => {
                write!(f, "{raw}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            Self::Array { component } => write!(f, "{component}[]"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl From<PrimitiveKind> for Type {
    fn from(value: PrimitiveKind) -> Self {
        Self::primitive(value)
    }
}

impl From<TypeName> for Type {
    fn from(value: TypeName) -> Self {
        Self::Class { name: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_erased_names() {
        assert_eq!(Type::Void.name().as_str(), "void");
        assert_eq!(Type::primitive(PrimitiveKind::Int).name().as_str(), "int");
        assert_eq!(Type::class("java.lang.String").name().as_str(), "java.lang.String");
        assert_eq!(
            Type::array_of(Type::primitive(PrimitiveKind::Long)).name().as_str(),
            "long[]"
        );
        assert_eq!(
            Type::parameterized("java.util.List", vec![Type::class("java.lang.String")])
                .name()
                .as_str(),
            "java.util.List"
        );
    }

    #[test]
    fn type_display_parameterized() {
        let ty = Type::parameterized(
            "java.util.Map",
            vec![Type::class("java.lang.String"), Type::array_of(Type::primitive(PrimitiveKind::Int))],
        );
        assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, int[]>");
    }

    #[test]
    fn type_class_or_class_array() {
        assert!(Type::class("java.lang.Class").is_class_or_class_array());
        assert!(Type::array_of(Type::class("java.lang.Class")).is_class_or_class_array());
        assert!(!Type::class("java.lang.String").is_class_or_class_array());
    }

    #[test]
    fn primitive_parse() {
        assert_eq!("char".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Char);
        assert!("integer".parse::<PrimitiveKind>().is_err());
    }
}

//! Runtime value instructions handed to the code generator

use anvil_model::{PrimitiveKind, Type, TypeName, CLASS_TYPE, STRING_TYPE};
use serde::Serialize;

/// Constant pool value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
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
}

/// Shared zero-length array constants provided by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyArrayKind {
    /// `boolean[]`
    Boolean,
    /// `byte[]`
    Byte,
    /// `short[]`
    Short,
    /// `int[]`
    Int,
    /// `long[]`
    Long,
    /// `float[]`
    Float,
    /// `double[]`
    Double,
    /// `char[]`
    Char,
    /// `String[]`
    String,
    /// `Class[]`
    Class,
}

impl EmptyArrayKind {
    /// Shared constant for arrays of `component`, if the runtime has one
    #[must_use]
    pub fn for_component(component: &Type) -> Option<Self> {
        match component {
            Type::Primitive { primitive } => Some(match primitive {
                PrimitiveKind::Boolean => Self::Boolean,
                PrimitiveKind::Byte => Self::Byte,
                PrimitiveKind::Short => Self::Short,
                PrimitiveKind::Int => Self::Int,
                PrimitiveKind::Long => Self::Long,
                PrimitiveKind::Float => Self::Float,
                PrimitiveKind::Double => Self::Double,
                PrimitiveKind::Char => Self::Char,
            }),
            other => match other.class_name().map(TypeName::as_str) {
                Some(STRING_TYPE) => Some(Self::String),
                Some(CLASS_TYPE) => Some(Self::Class),
                _ => None,
            },
        }
    }

    /// Name of the runtime constant
    #[must_use]
    pub const fn constant_name(self) -> &'static str {
        match self {
            Self::Boolean => "EMPTY_BOOLEAN_ARRAY",
            Self::Byte => "EMPTY_BYTE_ARRAY",
            Self::Short => "EMPTY_SHORT_ARRAY",
            Self::Int => "EMPTY_INT_ARRAY",
            Self::Long => "EMPTY_LONG_ARRAY",
            Self::Float => "EMPTY_FLOAT_ARRAY",
            Self::Double => "EMPTY_DOUBLE_ARRAY",
            Self::Char => "EMPTY_CHAR_ARRAY",
            Self::String => "EMPTY_STRING_ARRAY",
            Self::Class => "EMPTY_CLASS_ARRAY",
        }
    }
}

/// Instruction tree producing one runtime value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ValueHandle {
    /// Load a constant
    Const {
        /// Constant value
        value: Constant,
    },
    /// Read an enum constant
    EnumConstant {
        /// Enum type
        enum_type: TypeName,
        /// Constant name
        constant: String,
    },
    /// Load a class by name through the context class loader
    LoadClass {
        /// Class to load
        class: TypeName,
    },
    /// Read a static field
    ReadStaticField {
        /// Declaring class
        owner: TypeName,
        /// Field name
        field: String,
        /// Field type
        field_type: Type,
    },
    /// Allocate and fill an array
    NewArray {
        /// Component type
        component: Type,
        /// Element values in order
        elements: Vec<ValueHandle>,
    },
    /// Read a shared empty-array constant
    EmptyArray {
        /// Which constant
        kind: EmptyArrayKind,
    },
    /// Invoke a constructor
    NewInstance {
        /// Class to instantiate
        class: TypeName,
        /// Constructor parameter types
        constructor: Vec<Type>,
        /// Arguments in parameter order
        arguments: Vec<ValueHandle>,
    },
}

impl ValueHandle {
    /// Constant handle
    #[inline]
    #[must_use]
    pub fn constant(value: Constant) -> Self {
        Self::Const { value }
    }

    /// Class instantiated by this handle, if it is a constructor call
    #[must_use]
    pub fn instantiated_class(&self) -> Option<&TypeName> {
        match self {
            Self::NewInstance { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Constructor arguments, if this handle is a constructor call
    #[must_use]
    pub fn arguments(&self) -> Option<&[ValueHandle]> {
        match self {
            Self::NewInstance { arguments, .. } => Some(arguments),
            _ => None,
        }
    }
}

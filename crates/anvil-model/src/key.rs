//! Structural declaration identities
//!
//! Identity is always derived from stable structural data (names and
//! parameter types), never from object identity. Two keys that compare
//! equal denote the same logical declaration, no matter which query or
//! phase produced them.

use crate::name::TypeName;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Class identity: the fully-qualified name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassKey(TypeName);

impl ClassKey {
    /// Create class key
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self(name.into())
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.0
    }
}

/// Method identity: declaring class, name and ordered parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodKey {
    class: TypeName,
    name: String,
    parameter_types: Vec<Type>,
}

impl MethodKey {
    /// Create method key
    #[inline]
    #[must_use]
    pub fn new(class: impl Into<TypeName>, name: impl Into<String>, parameter_types: Vec<Type>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            parameter_types,
        }
    }

    /// Declaring class
    #[inline]
    #[must_use]
    pub fn class(&self) -> &TypeName {
        &self.class
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameter types
    #[inline]
    #[must_use]
    pub fn parameter_types(&self) -> &[Type] {
        &self.parameter_types
    }

    /// Key of the parameter at `position`
    #[inline]
    #[must_use]
    pub fn parameter(&self, position: u16) -> ParameterKey {
        ParameterKey::new(self.clone(), position)
    }
}

/// Field identity: declaring class and field name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    class: TypeName,
    name: String,
}

impl FieldKey {
    /// Create field key
    #[inline]
    #[must_use]
    pub fn new(class: impl Into<TypeName>, name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
        }
    }

    /// Declaring class
    #[inline]
    #[must_use]
    pub fn class(&self) -> &TypeName {
        &self.class
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Parameter identity: owning method and position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterKey {
    method: MethodKey,
    position: u16,
}

impl ParameterKey {
    /// Create parameter key
    #[inline]
    #[must_use]
    pub const fn new(method: MethodKey, position: u16) -> Self {
        Self { method, position }
    }

    /// Owning method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    /// Zero-based position
    #[inline]
    #[must_use]
    pub const fn position(&self) -> u16 {
        self.position
    }
}

/// Identity of any declaration kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum DeclarationKey {
    /// A class
    Class(ClassKey),
    /// A method or constructor
    Method(MethodKey),
    /// A field
    Field(FieldKey),
    /// A method parameter
    Parameter(ParameterKey),
}

impl DeclarationKey {
    /// Class the declaration belongs to (the class itself for class keys)
    #[must_use]
    pub fn declaring_class(&self) -> &TypeName {
        match self {
            Self::Class(key) => key.name(),
            Self::Method(key) => key.class(),
            Self::Field(key) => key.class(),
            Self::Parameter(key) => key.method().class(),
        }
    }

    /// Declaration kind label
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Method(_) => "method",
            Self::Field(_) => "field",
            Self::Parameter(_) => "parameter",
        }
    }
}

impl From<ClassKey> for DeclarationKey {
    fn from(value: ClassKey) -> Self {
        Self::Class(value)
    }
}

impl From<MethodKey> for DeclarationKey {
    fn from(value: MethodKey) -> Self {
        Self::Method(value)
    }
}

impl From<FieldKey> for DeclarationKey {
    fn from(value: FieldKey) -> Self {
        Self::Field(value)
    }
}

impl From<ParameterKey> for DeclarationKey {
    fn from(value: ParameterKey) -> Self {
        Self::Parameter(value)
    }
}

impl Display for ClassKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for MethodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}(", self.class, self.name)?;
        for (i, ty) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.name)
    }
}

impl Display for ParameterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.method, self.position)
    }
}

impl Display for DeclarationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(key) => write!(f, "{key}"),
            Self::Method(key) => write!(f, "{key}"),
            Self::Field(key) => write!(f, "{key}"),
            Self::Parameter(key) => write!(f, "{key}"),
        }
    }
}

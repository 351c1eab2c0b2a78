//! Fully-qualified type names
//!
//! Provides [`TypeName`], the dotted name every declaration and annotation
//! type is addressed by.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Fully-qualified, dot separated type name
///
/// # Examples
/// - `com.acme.Greeter` → package `com.acme`, simple name `Greeter`
/// - `Greeter` → default package, simple name `Greeter`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Create name without validation
    ///
    /// Use [`str::parse`] when the input is untrusted.
    #[inline]
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Name as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package part (empty for the default package)
    #[must_use]
    pub fn package(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(package, _)| package)
    }

    /// Last segment of the name
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let name = self.as_str();
        name.rsplit_once('.').map_or(name, |(_, simple)| simple)
    }

    /// Name segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Check whether this name lives in `package` or one of its subpackages
    #[must_use]
    pub fn is_in_package(&self, package: &str) -> bool {
        if package.is_empty() {
            return true;
        }
        self.0
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// `java.lang` and its subpackages are protected at runtime
    #[inline]
    #[must_use]
    pub fn is_java_lang(&self) -> bool {
        self.is_in_package("java.lang")
    }

    /// Check that every segment is non-empty
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|segment| !segment.is_empty())
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = Self::new(s.trim());
        if name.is_valid() {
            Ok(name)
        } else {
            Err(ModelError::InvalidTypeName {
                name: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for TypeName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.0.to_string()
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&TypeName> for TypeName {
    fn from(value: &TypeName) -> Self {
        value.clone()
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Pipeline configuration

use crate::error::BuildError;
use anvil_literal::naming::DEFAULT_GENERATED_PACKAGE;
use anvil_model::TypeName;
use serde::{Deserialize, Serialize};

/// Build pipeline configuration
///
/// Every field has a default, so a TOML document only needs the keys it
/// overrides:
///
/// ```rust
/// use anvil_core::PipelineConfig;
///
/// let config = PipelineConfig::from_toml_str("fail_on_warnings = true").unwrap();
/// assert!(config.fail_on_warnings);
/// assert!(config.shared_literals);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Share one literal class per annotation type
    pub shared_literals: bool,
    /// Package prefixes of application classes; empty means every class
    pub application_packages: Vec<String>,
    /// Package of generated classes without a natural home
    pub generated_package: String,
    /// Treat warnings like errors at the end of each phase
    pub fail_on_warnings: bool,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] on malformed TOML or mistyped keys.
    pub fn from_toml_str(source: &str) -> Result<Self, BuildError> {
        Ok(toml::from_str(source)?)
    }

    /// With literal sharing on or off
    #[inline]
    #[must_use]
    pub fn with_shared_literals(mut self, shared: bool) -> Self {
        self.shared_literals = shared;
        self
    }

    /// With one more application package prefix
    #[must_use]
    pub fn with_application_package(mut self, package: impl Into<String>) -> Self {
        self.application_packages.push(package.into());
        self
    }

    /// With generated package
    #[must_use]
    pub fn with_generated_package(mut self, package: impl Into<String>) -> Self {
        self.generated_package = package.into();
        self
    }

    /// With warnings failing the build
    #[inline]
    #[must_use]
    pub fn with_fail_on_warnings(mut self, fail: bool) -> Self {
        self.fail_on_warnings = fail;
        self
    }

    /// Check whether `name` belongs to the application
    #[must_use]
    pub fn is_application_class(&self, name: &TypeName) -> bool {
        self.application_packages.is_empty()
            || self.application_packages.iter().any(|prefix| {
                name.as_str()
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
            })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shared_literals: true,
            application_packages: Vec::new(),
            generated_package: DEFAULT_GENERATED_PACKAGE.to_owned(),
            fail_on_warnings: false,
        }
    }
}

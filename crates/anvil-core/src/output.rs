//! Generated output: sinks and class renderers

use crate::components::ComponentsClass;
use anvil_literal::GeneratedClass;
use anvil_model::TypeName;

/// Service interface under which generated components are registered
pub const COMPONENTS_PROVIDER: &str = "anvil.runtime.ComponentsProvider";

/// Receiver of everything a build generates
pub trait OutputSink: Send + Sync {
    /// Write the bytes of class `name`
    ///
    /// # Errors
    ///
    /// Any failure of the underlying storage.
    fn write_class(&self, name: &TypeName, bytes: &[u8]) -> anyhow::Result<()>;

    /// Register `implementation` as a provider of service `interface`
    ///
    /// # Errors
    ///
    /// Any failure of the underlying storage.
    fn write_service_provider(&self, interface: &TypeName, implementation: &TypeName) -> anyhow::Result<()>;
}

/// Renders generated class descriptors to bytes
pub trait ClassGenerator: Send + Sync {
    /// Render an annotation literal class
    ///
    /// # Errors
    ///
    /// Any rendering failure.
    fn literal(&self, class: &GeneratedClass) -> anyhow::Result<Vec<u8>>;

    /// Render the synthetic components class
    ///
    /// # Errors
    ///
    /// Any rendering failure.
    fn components(&self, class: &ComponentsClass) -> anyhow::Result<Vec<u8>>;
}

/// Renders descriptors as JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonClassGenerator {
    pretty: bool,
}

impl JsonClassGenerator {
    /// Compact JSON
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON
    #[inline]
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }
}

impl ClassGenerator for JsonClassGenerator {
    fn literal(&self, class: &GeneratedClass) -> anyhow::Result<Vec<u8>> {
        self.render(class)
    }

    fn components(&self, class: &ComponentsClass) -> anyhow::Result<Vec<u8>> {
        self.render(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_literal::{Constant, GeneratedMethod, MethodBody, ValueHandle};
    use anvil_model::Type;

    fn literal() -> GeneratedClass {
        GeneratedClass {
            name: TypeName::new("com.acme.Named_AnnotationLiteral"),
            application_class: true,
            super_class: TypeName::new("anvil.runtime.AnnotationLiteral"),
            interfaces: vec![TypeName::new("com.acme.Named")],
            signature: String::new(),
            fields: Vec::new(),
            constructor: Vec::new(),
            methods: vec![GeneratedMethod {
                name: "value".into(),
                return_type: Type::class("java.lang.String"),
                body: MethodBody::ReturnValue {
                    value: ValueHandle::constant(Constant::String("main".into())),
                },
            }],
            static_init: Vec::new(),
        }
    }

    #[test]
    fn json_renders_descriptor() {
        let bytes = JsonClassGenerator::new().literal(&literal()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["name"], "com.acme.Named_AnnotationLiteral");
        assert_eq!(json["methods"][0]["body"]["kind"], "return_value");
        assert_eq!(json["methods"][0]["body"]["value"]["value"]["value"], "main");
    }

    #[test]
    fn pretty_output_is_indented() {
        let bytes = JsonClassGenerator::pretty().literal(&literal()).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("\n  \"name\""));
    }
}

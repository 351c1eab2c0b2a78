//! Generated literal class descriptors and their output

use crate::handle::ValueHandle;
use anvil_model::{Type, TypeName};
use parking_lot::Mutex;
use serde::Serialize;

/// A field of a generated class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedField {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: Type,
    /// `public static final` when set, `private final` otherwise
    pub is_static: bool,
}

/// Body of a generated member method
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MethodBody {
    /// Return the instance field of the same name
    ReturnField {
        /// Field to read
        field: String,
    },
    /// Return a hard-coded value
    ReturnValue {
        /// Value to return
        value: ValueHandle,
    },
}

/// A member method of a generated class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMethod {
    /// Method name, identical to the annotation member
    pub name: String,
    /// Return type, identical to the annotation member
    pub return_type: Type,
    /// Body
    pub body: MethodBody,
}

/// Static initializer assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticInit {
    /// Static field assigned
    pub field: String,
    /// Value assigned
    pub value: ValueHandle,
}

/// Descriptor of one generated annotation literal class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedClass {
    /// Fully-qualified generated name
    pub name: TypeName,
    /// Whether the class belongs to the application rather than a library
    pub application_class: bool,
    /// Superclass
    pub super_class: TypeName,
    /// Implemented interfaces (the annotation type)
    pub interfaces: Vec<TypeName>,
    /// Generic signature
    pub signature: String,
    /// Fields
    pub fields: Vec<GeneratedField>,
    /// Constructor parameter types, in member order
    pub constructor: Vec<Type>,
    /// Member methods
    pub methods: Vec<GeneratedMethod>,
    /// Static initializer assignments
    pub static_init: Vec<StaticInit>,
}

/// Receiver of generated classes
pub trait ClassOutput: Send + Sync {
    /// Accept one generated class
    fn write(&self, class: GeneratedClass);
}

/// Output that keeps every written class in memory
#[derive(Debug, Default)]
pub struct CollectedClasses {
    classes: Mutex<Vec<GeneratedClass>>,
}

impl CollectedClasses {
    /// Create empty output
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of classes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Check if nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }

    /// Names of the written classes, in write order
    #[must_use]
    pub fn names(&self) -> Vec<TypeName> {
        self.classes.lock().iter().map(|c| c.name.clone()).collect()
    }

    /// Remove and return everything written so far
    #[must_use]
    pub fn take(&self) -> Vec<GeneratedClass> {
        std::mem::take(&mut *self.classes.lock())
    }
}

impl ClassOutput for CollectedClasses {
    fn write(&self, class: GeneratedClass) {
        self.classes.lock().push(class);
    }
}

//! Extension registration and callback discovery

use crate::error::ConfigurationError;
use crate::extension::Extension;
use crate::method::{ExtensionMethod, Invoker};
use crate::phase::Phase;
use crate::role::ParameterRole;
use crate::argument::Invocation;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// A validated callback ready to run
#[derive(Clone)]
pub struct Callback {
    extension: Arc<dyn Extension>,
    extension_name: Arc<str>,
    method: ExtensionMethod,
    phase: Phase,
    invoker: Invoker,
}

impl Callback {
    /// Declaring extension
    #[must_use]
    pub fn extension(&self) -> &Arc<dyn Extension> {
        &self.extension
    }

    /// Declaring extension's name
    #[must_use]
    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    /// Descriptor
    #[must_use]
    pub fn method(&self) -> &ExtensionMethod {
        &self.method
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// Phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Explicit priority
    #[must_use]
    pub fn priority(&self) -> Option<i32> {
        self.method.explicit_priority()
    }

    /// Query role, if any
    #[must_use]
    pub fn query_role(&self) -> Option<&ParameterRole> {
        self.method.query_role()
    }

    /// Run the body
    ///
    /// # Errors
    ///
    /// Whatever the callback body returns.
    pub fn invoke(&self, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        (self.invoker)(invocation)
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("extension", &self.extension_name)
            .field("method", &self.method.name())
            .field("phase", &self.phase)
            .field("priority", &self.priority())
            .finish()
    }
}

/// Validated callbacks grouped by phase, each group in execution order
#[derive(Debug, Clone, Default)]
pub struct CallbackPlan {
    phases: [Vec<Callback>; 4],
}

impl CallbackPlan {
    /// Callbacks of `phase`, in execution order
    #[must_use]
    pub fn callbacks(&self, phase: Phase) -> &[Callback] {
        &self.phases[phase.ordinal()]
    }

    /// Total number of callbacks
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Check if there are no callbacks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every callback, phase by phase
    pub fn iter(&self) -> impl Iterator<Item = &Callback> {
        self.phases.iter().flatten()
    }
}

/// Registered extensions of one build
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
    types: HashSet<TypeId>,
}

impl ExtensionRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` by type; repeated registrations are ignored
    pub fn register<E: Extension + Default>(&mut self) -> &mut Self {
        if self.types.insert(TypeId::of::<E>()) {
            self.extensions.push(Arc::new(E::default()));
        } else {
            tracing::debug!(extension = std::any::type_name::<E>(), "Extension already registered");
        }
        self
    }

    /// Register `E` by type, returning self for chaining
    #[must_use]
    pub fn with<E: Extension + Default>(mut self) -> Self {
        self.register::<E>();
        self
    }

    /// Register a constructed extension
    pub fn register_instance<E: Extension>(&mut self, extension: E) -> &mut Self {
        self.types.insert(TypeId::of::<E>());
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Register a shared extension
    pub fn register_shared(&mut self, extension: Arc<dyn Extension>) -> &mut Self {
        self.extensions.push(extension);
        self
    }

    /// Registered extensions, in registration order
    #[must_use]
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Number of extensions
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if no extension is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Validate every callback and order them per phase
    ///
    /// Explicit priorities run first, ascending; callbacks without one run
    /// last. Order among equal priorities is unspecified.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn discover(&self) -> Result<CallbackPlan, ConfigurationError> {
        let mut plan = CallbackPlan::default();
        for extension in &self.extensions {
            let extension_name: Arc<str> = Arc::from(extension.name());
            for method in extension.methods() {
                let (phase, invoker) = validate(&extension_name, &method)?;
                tracing::debug!(
                    extension = %extension_name,
                    method = method.name(),
                    %phase,
                    priority = ?method.explicit_priority(),
                    "Callback discovered"
                );
                plan.phases[phase.ordinal()].push(Callback {
                    extension: Arc::clone(extension),
                    extension_name: Arc::clone(&extension_name),
                    method,
                    phase,
                    invoker,
                });
            }
        }
        for callbacks in &mut plan.phases {
            callbacks.sort_by_key(|c| (c.priority().is_none(), c.priority().unwrap_or(0)));
        }
        tracing::info!(extensions = self.extensions.len(), callbacks = plan.len(), "Extension callbacks discovered");
        Ok(plan)
    }
}

impl Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.extensions.iter().map(|e| e.name())).finish()
    }
}

fn validate(extension: &str, method: &ExtensionMethod) -> Result<(Phase, Invoker), ConfigurationError> {
    let names = || (extension.to_owned(), method.name().to_owned());

    let phase = match method.phases() {
        [phase] => *phase,
        markers => {
            let (extension, method) = names();
            return Err(ConfigurationError::PhaseMarkers {
                extension,
                method,
                count: markers.len(),
            });
        }
    };
    if !method.is_public() || method.is_static() {
        let (extension, method) = names();
        return Err(ConfigurationError::Modifiers { extension, method });
    }
    let Some(invoker) = method.invoker().cloned() else {
        let (extension, method) = names();
        return Err(ConfigurationError::MissingInvoker { extension, method });
    };

    for role in method.roles() {
        if let ParameterRole::Unknown(name) = role {
            let (extension, method) = names();
            return Err(ConfigurationError::UnknownRole {
                extension,
                method,
                name: name.clone(),
            });
        }
        if !role.is_legal_in(phase) {
            let (extension, method) = names();
            return Err(ConfigurationError::IllegalRole {
                extension,
                method,
                role: role.clone(),
                phase,
            });
        }
    }

    let queries: Vec<_> = method.roles().iter().filter(|r| r.is_query()).collect();
    match (queries.as_slice(), method.constraints().is_empty()) {
        ([], false) => {
            let (extension, method) = names();
            Err(ConfigurationError::UnexpectedConstraint { extension, method })
        }
        ([role], true) => {
            let (extension, method) = names();
            Err(ConfigurationError::MissingConstraint {
                extension,
                method,
                role: (*role).clone(),
            })
        }
        ([] | [_], _) => Ok((phase, invoker)),
        (many, _) => {
            let (extension, method) = names();
            Err(ConfigurationError::MultipleQueryRoles {
                extension,
                method,
                count: many.len(),
            })
        }
    }
}

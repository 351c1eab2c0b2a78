//! Callback descriptors

use crate::argument::Invocation;
use crate::constraint::Constraint;
use crate::phase::Phase;
use crate::role::ParameterRole;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Typed callback body
pub type Invoker = Arc<dyn Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Descriptor of one extension callback
///
/// Built with chained setters and validated when extensions are
/// discovered. A valid descriptor carries exactly one phase marker, is
/// public and non-static, and has an invoker.
#[derive(Clone)]
#[must_use]
pub struct ExtensionMethod {
    name: String,
    phases: Vec<Phase>,
    priority: Option<i32>,
    roles: Vec<ParameterRole>,
    constraints: Vec<Constraint>,
    public: bool,
    is_static: bool,
    invoker: Option<Invoker>,
}

impl ExtensionMethod {
    /// Public, non-static callback without markers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phases: Vec::new(),
            priority: None,
            roles: Vec::new(),
            constraints: Vec::new(),
            public: true,
            is_static: false,
            invoker: None,
        }
    }

    /// Add phase marker
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Set explicit priority; lower runs earlier
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Append parameter
    pub fn role(mut self, role: ParameterRole) -> Self {
        self.roles.push(role);
        self
    }

    /// Append query constraint
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Set visibility
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Set static-ness
    pub fn static_method(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Attach the callback body
    pub fn invoke<F>(mut self, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.invoker = Some(Arc::new(body));
        self
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase markers
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Explicit priority
    #[must_use]
    pub fn explicit_priority(&self) -> Option<i32> {
        self.priority
    }

    /// Declared parameters
    #[must_use]
    pub fn roles(&self) -> &[ParameterRole] {
        &self.roles
    }

    /// Query constraints
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Visibility
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Static-ness
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Attached body
    #[must_use]
    pub fn invoker(&self) -> Option<&Invoker> {
        self.invoker.as_ref()
    }

    /// The query role, when exactly one is declared
    #[must_use]
    pub fn query_role(&self) -> Option<&ParameterRole> {
        let mut queries = self.roles.iter().filter(|r| r.is_query());
        match (queries.next(), queries.next()) {
            (Some(role), None) => Some(role),
            _ => None,
        }
    }
}

impl Debug for ExtensionMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionMethod")
            .field("name", &self.name)
            .field("phases", &self.phases)
            .field("priority", &self.priority)
            .field("roles", &self.roles)
            .field("constraints", &self.constraints)
            .field("public", &self.public)
            .field("is_static", &self.is_static)
            .field("invoker", &self.invoker.is_some())
            .finish()
    }
}

//! Deployment queries

use anvil_model::Deployment;
use anvil_query::{BeanQuery, DeploymentScope, ObserverQuery};

/// Queries over the resolved beans and observers
#[derive(Debug, Clone, Copy)]
pub struct AppDeployment<'a> {
    scope: DeploymentScope<'a>,
}

impl<'a> AppDeployment<'a> {
    /// View of `deployment`
    #[must_use]
    pub fn new(deployment: &'a Deployment) -> Self {
        Self {
            scope: DeploymentScope::new(deployment),
        }
    }

    /// Bean query
    #[must_use]
    pub fn beans(&self) -> BeanQuery<'a> {
        self.scope.beans()
    }

    /// Observer query
    #[must_use]
    pub fn observers(&self) -> ObserverQuery<'a> {
        self.scope.observers()
    }
}

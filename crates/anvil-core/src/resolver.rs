//! Bean and observer discovery seam

use anvil_model::Deployment;
use anvil_overlay::AnnotationSource;

/// Supplies the beans and observers of the application
///
/// Called once after enhancement against the final annotations, and again
/// after synthesis. The pipeline appends synthetic components to the
/// second result itself.
pub trait DeploymentResolver: Send + Sync {
    /// Resolve the deployment from the current annotations
    ///
    /// # Errors
    ///
    /// Any resolution failure; it aborts the build.
    fn resolve(&self, annotations: &dyn AnnotationSource) -> anyhow::Result<Deployment>;
}

/// Resolver returning a fixed deployment
#[derive(Debug, Clone, Default)]
pub struct StaticDeployment {
    deployment: Deployment,
}

impl StaticDeployment {
    /// Resolve to `deployment` every time
    #[must_use]
    pub fn new(deployment: Deployment) -> Self {
        Self { deployment }
    }

    /// Resolve to an empty deployment
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl DeploymentResolver for StaticDeployment {
    fn resolve(&self, _annotations: &dyn AnnotationSource) -> anyhow::Result<Deployment> {
        Ok(self.deployment.clone())
    }
}

//! Phase execution

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::resolver::DeploymentResolver;
use anvil_extension::api::{ClassConfig, Level, Message};
use anvil_extension::{extension_class, Callback, CallbackPlan, Invocation, Phase};
use std::sync::Arc;

/// Runs the callbacks of one phase at a time against a [`BuildContext`]
pub struct PhaseRunner<'p> {
    plan: &'p CallbackPlan,
    resolver: &'p dyn DeploymentResolver,
}

impl<'p> PhaseRunner<'p> {
    /// Create runner for a validated plan
    #[must_use]
    pub fn new(plan: &'p CallbackPlan, resolver: &'p dyn DeploymentResolver) -> Self {
        Self { plan, resolver }
    }

    /// Run `phase`
    ///
    /// Callbacks run in plan order; a callback with a query role runs once
    /// per match. Enhancement always ends by freezing the transformations
    /// and invalidating the overlay, even when a callback failed.
    ///
    /// # Errors
    ///
    /// - [`BuildError::PhaseOrder`] if `phase` is not next
    /// - [`BuildError::Callback`] on the first failing callback
    /// - [`BuildError::Validation`] if the phase reported errors
    /// - [`BuildError::Synthetic`] for incomplete synthetic components
    /// - lifecycle and resolver errors as they occur
    pub fn run(&self, context: &mut BuildContext, phase: Phase) -> Result<(), BuildError> {
        context.enter(phase)?;
        let callbacks = self.plan.callbacks(phase);
        tracing::info!(%phase, callbacks = callbacks.len(), "Phase started");
        let reported = context.messages().len();

        let result = match phase {
            Phase::Enhancement => {
                let result = configure_meta_annotations(context).and_then(|()| run_callbacks(context, callbacks));
                let frozen = context.registry().freeze();
                context.registry().overlays().invalidate();
                match (result, frozen) {
                    (Err(err), _) => Err(err),
                    (Ok(()), Err(err)) => Err(err.into()),
                    (Ok(()), Ok(frozen)) => {
                        tracing::debug!(transformed = frozen.len(), "Annotations frozen");
                        context.set_frozen(frozen);
                        Ok(())
                    }
                }
            }
            _ => run_callbacks(context, callbacks),
        };
        result?;

        check_messages(context, phase, reported)?;

        match phase {
            Phase::Enhancement => {
                let deployment = self.resolve(context, phase)?;
                context.set_deployment(deployment);
            }
            Phase::Synthesis => {
                let problems = context.synthetic().problems();
                if !problems.is_empty() {
                    return Err(BuildError::Synthetic { problems });
                }
                let mut deployment = self.resolve(context, phase)?;
                deployment.extend(
                    context.synthetic().beans().iter().map(|b| b.to_bean_info()).collect(),
                    context.synthetic().observers().iter().map(|o| o.to_observer_info()).collect(),
                );
                context.set_deployment(deployment);
            }
            Phase::Discovery | Phase::Validation => {}
        }

        tracing::info!(%phase, "Phase finished");
        Ok(())
    }

    fn resolve(&self, context: &BuildContext, phase: Phase) -> Result<anvil_model::Deployment, BuildError> {
        let deployment = self
            .resolver
            .resolve(context.source())
            .map_err(|source| BuildError::Deployment { phase, source })?;
        tracing::debug!(
            %phase,
            beans = deployment.beans().len(),
            observers = deployment.observers().len(),
            "Deployment resolved"
        );
        Ok(deployment)
    }
}

impl std::fmt::Debug for PhaseRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseRunner").field("callbacks", &self.plan.len()).finish()
    }
}

/// Run deferred meta-annotation configuration against each annotation type
fn configure_meta_annotations(context: &BuildContext) -> Result<(), BuildError> {
    for (kind, annotation, configure) in context.meta().take_configurators() {
        let Some(class) = context.index().class(&annotation) else {
            context.messages().warning(
                format!("{kind:?} {annotation} is not indexed; its configuration was skipped"),
                None,
            );
            continue;
        };
        tracing::debug!(?kind, annotation = %annotation, "Configuring meta-annotation");
        configure(&ClassConfig::new(context.registry(), Arc::clone(class))).map_err(|source| BuildError::Callback {
            phase: Phase::Enhancement,
            extension: annotation.to_string(),
            method: "configure".to_owned(),
            source,
        })?;
    }
    Ok(())
}

fn run_callbacks(context: &BuildContext, callbacks: &[Callback]) -> Result<(), BuildError> {
    for callback in callbacks {
        let extension = extension_class(callback.extension_name());
        let invocations = context.invocations(callback, &extension)?;
        tracing::debug!(
            extension = callback.extension_name(),
            method = callback.name(),
            invocations = invocations.len(),
            "Invoking callback"
        );
        for arguments in invocations {
            let invocation = Invocation::new(callback.phase(), callback.extension_name(), callback.name(), arguments);
            callback.invoke(&invocation).map_err(|source| BuildError::Callback {
                phase: callback.phase(),
                extension: callback.extension_name().to_owned(),
                method: callback.name().to_owned(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Fail the phase if it reported errors, or warnings when those are fatal
fn check_messages(context: &BuildContext, phase: Phase, reported: usize) -> Result<(), BuildError> {
    let threshold = if context.config().fail_on_warnings {
        Level::Warning
    } else {
        Level::Error
    };
    let failing: Vec<Message> = context
        .messages()
        .all()
        .into_iter()
        .skip(reported)
        .filter(|m| m.level >= threshold)
        .collect();
    if failing.is_empty() {
        Ok(())
    } else {
        tracing::error!(%phase, problems = failing.len(), "Phase failed");
        Err(BuildError::Validation {
            phase,
            messages: failing,
        })
    }
}

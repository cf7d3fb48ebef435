//! Drives a provisioning engine through a resolved application.

use chrono::Utc;
use stackweave_common::error::Result;
use stackweave_compose::output::OutputEmitter;
use stackweave_compose::template;

use crate::app::App;
use crate::engine::ProvisioningEngine;
use crate::event::{DeploymentEvent, EventListener};

/// Provisions stacks one at a time, dependencies first.
#[derive(Debug)]
pub struct Deployer<E> {
    engine: E,
    listener: EventListener,
}

impl<E: ProvisioningEngine> Deployer<E> {
    /// Creates a deployer with a recording-only listener.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_listener(engine, EventListener::new())
    }

    /// Creates a deployer reporting through `listener`.
    #[must_use]
    pub const fn with_listener(engine: E, listener: EventListener) -> Self {
        Self { engine, listener }
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[DeploymentEvent] {
        self.listener.events()
    }

    /// The wrapped engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Resolves `app` and provisions every stack in emission order.
    ///
    /// Before a stack is provisioned, every import it consumes is read
    /// through the output emitter; its outputs are recorded once the engine
    /// returns. Deployment stops at the first failing stack.
    ///
    /// # Errors
    ///
    /// Returns any resolution error before anything is provisioned, or the
    /// first import, engine, or output recording error.
    pub fn deploy(&mut self, app: &App) -> Result<OutputEmitter> {
        let resolved = app.resolve()?;
        let templates = template::synthesize(&resolved);
        let mut emitter = OutputEmitter::new(&resolved);

        for template in &templates {
            let stack = template.stack.clone();
            let _span = tracing::info_span!("deploy", %stack).entered();
            self.listener.emit(DeploymentEvent::StackStarted {
                stack: stack.clone(),
                at: Utc::now(),
            });

            let outcome = emitter
                .resolve_imports(&stack)
                .and_then(|imports| self.engine.provision(template, &imports))
                .and_then(|values| {
                    emitter.record_provisioned(&stack, &values)?;
                    Ok(values.len())
                });

            match outcome {
                Ok(outputs) => self.listener.emit(DeploymentEvent::StackProvisioned {
                    stack,
                    outputs,
                    at: Utc::now(),
                }),
                Err(err) => {
                    tracing::error!(error = %err, "stack failed");
                    self.listener.emit(DeploymentEvent::StackFailed {
                        stack,
                        reason: err.to_string(),
                        at: Utc::now(),
                    });
                    return Err(err);
                }
            }
        }

        tracing::info!(stacks = templates.len(), "deployment complete");
        Ok(emitter)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use stackweave_common::error::StackweaveError;
    use stackweave_common::types::{Environment, StackName};
    use stackweave_compose::construct::object_store::data_lake_bucket;
    use stackweave_compose::descriptor::OutputRef;
    use stackweave_compose::template::StackTemplate;

    use super::*;
    use crate::builder::StackBuilder;
    use crate::engine::DryRunEngine;

    struct FailingEngine;

    impl ProvisioningEngine for FailingEngine {
        fn provision(
            &mut self,
            template: &StackTemplate,
            _imports: &BTreeMap<OutputRef, String>,
        ) -> Result<BTreeMap<String, String>> {
            Err(StackweaveError::Provisioning {
                stack: template.stack.to_string(),
                message: "quota exceeded".into(),
            })
        }
    }

    fn lake_app() -> App {
        let lake = StackBuilder::new(
            "S3BucketStack",
            Environment::new("123456789012", "us-east-1"),
        )
        .group(data_lake_bucket("lake", "my-lake").expect("bucket"))
        .output("BucketName", "${lake}")
        .build()
        .expect("stack");
        std::iter::once(lake).collect()
    }

    #[test]
    fn dry_run_records_outputs() {
        let mut deployer = Deployer::new(DryRunEngine::new());
        let emitter = deployer.deploy(&lake_app()).expect("deploy");
        let value = emitter
            .read(&OutputRef::new("S3BucketStack", "BucketName"))
            .expect("resolved");
        assert_eq!(value, "S3BucketStack/lake");
        assert_eq!(deployer.events().len(), 2);
    }

    #[test]
    fn engine_failure_stops_and_is_reported() {
        let mut deployer = Deployer::new(FailingEngine);
        let err = deployer.deploy(&lake_app()).unwrap_err();
        assert!(matches!(err, StackweaveError::Provisioning { .. }));
        assert!(matches!(
            deployer.events().last(),
            Some(DeploymentEvent::StackFailed { stack, .. }) if *stack == StackName::new("S3BucketStack")
        ));
    }
}

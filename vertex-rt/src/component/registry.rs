// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Layer 3: Internal module imports
use super::context::Context;
use super::deployment::{DeployedComponent, Deployment, DeploymentState};
use super::error::ComponentError;
use super::traits::{AsyncComponent, Component};
use crate::bus::Bus;
use crate::config::ConfigMap;
use crate::util::DeploymentId;

/// Tracks every currently-deployed [`Component`] instance.
///
/// Locked only for the brief bookkeeping around a deploy/undeploy —
/// `Component::start`/`stop` always run with the lock released, so a
/// slow-starting component never blocks lookups of unrelated
/// deployments.
pub struct DeploymentRegistry {
    bus: Bus,
    deployments: Mutex<HashMap<DeploymentId, Deployment>>,
    self_handle: Weak<DeploymentRegistry>,
}

impl DeploymentRegistry {
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            deployments: Mutex::new(HashMap::new()),
            self_handle: Weak::new(),
        }
    }

    /// Build a registry that can hand components a handle back to
    /// itself via [`Context::registry`] — needed only by components that
    /// deploy children of their own.
    pub fn new_arc(bus: Bus) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            bus,
            deployments: Mutex::new(HashMap::new()),
            self_handle: weak.clone(),
        })
    }

    /// Start `component` and register it under a fresh [`DeploymentId`].
    /// The deployment is only registered once `start` succeeds.
    pub async fn deploy(
        &self,
        component: Arc<dyn Component>,
        config: ConfigMap,
    ) -> Result<DeploymentId, ComponentError> {
        let id = DeploymentId::new();
        let context = Context::new(self.bus.clone(), config, id, self.self_handle.clone());

        component.start(&context).await?;

        let mut deployment = Deployment::new(id, component, context);
        deployment.set_state(DeploymentState::Running);
        info!(deployment = %id, name = deployment.name(), "component deployed");
        self.deployments.lock().insert(id, deployment);
        Ok(id)
    }

    /// Start an [`AsyncComponent`] and register it under a fresh
    /// [`DeploymentId`]. `async_start` is expected to return promptly;
    /// the [`CancellationToken`] it's handed is cancelled by `undeploy`
    /// before `async_stop` runs.
    pub async fn deploy_async(
        &self,
        component: Arc<dyn AsyncComponent>,
        config: ConfigMap,
    ) -> Result<DeploymentId, ComponentError> {
        let id = DeploymentId::new();
        let context = Context::new(self.bus.clone(), config, id, self.self_handle.clone());
        let cancel = CancellationToken::new();

        component.async_start(&context, cancel.clone()).await?;

        let mut deployment = Deployment::new_async(id, component, cancel, context);
        deployment.set_state(DeploymentState::Running);
        info!(deployment = %id, name = deployment.name(), "async component deployed");
        self.deployments.lock().insert(id, deployment);
        Ok(id)
    }

    /// Stop and remove the deployment. If `stop`/`async_stop` fails, the
    /// deployment is left registered in the `Failed` state rather than
    /// silently dropped.
    pub async fn undeploy(&self, id: DeploymentId) -> Result<(), ComponentError> {
        let (component, context) = {
            let mut guard = self.deployments.lock();
            let deployment = guard.get_mut(&id).ok_or(ComponentError::NotFound(id))?;
            deployment.set_state(DeploymentState::Stopping);
            let component = match deployment.component() {
                DeployedComponent::Sync(c) => DeployedComponent::Sync(Arc::clone(c)),
                DeployedComponent::Async(c, cancel) => {
                    DeployedComponent::Async(Arc::clone(c), cancel.clone())
                }
            };
            (component, deployment.context().clone())
        };

        let result = match &component {
            DeployedComponent::Sync(component) => component.stop(&context).await,
            DeployedComponent::Async(component, cancel) => {
                cancel.cancel();
                component.async_stop(&context, cancel.clone()).await
            }
        };

        let mut guard = self.deployments.lock();
        match result {
            Ok(()) => {
                guard.remove(&id);
                info!(deployment = %id, "component undeployed");
                Ok(())
            }
            Err(err) => {
                if let Some(deployment) = guard.get_mut(&id) {
                    deployment.set_state(DeploymentState::Failed);
                }
                warn!(deployment = %id, error = %err, "component failed to stop cleanly");
                Err(err)
            }
        }
    }

    pub fn state(&self, id: DeploymentId) -> Option<DeploymentState> {
        self.deployments.lock().get(&id).map(Deployment::state)
    }

    pub fn list(&self) -> Vec<(DeploymentId, String, DeploymentState)> {
        self.deployments
            .lock()
            .values()
            .map(|d| (d.id(), d.name().to_string(), d.state()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.deployments.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Undeploy every currently-registered deployment (unspecified
    /// order, but never two concurrent `stop` calls for the same id,
    /// since each is awaited to completion before the next starts),
    /// then close the shared [`Bus`].
    ///
    /// A deployment whose `stop` fails is logged and left behind in the
    /// `Failed` state rather than aborting the rest of the shutdown.
    pub async fn close(&self) {
        let ids: Vec<DeploymentId> = self.deployments.lock().keys().copied().collect();
        for id in ids {
            if let Err(err) = self.undeploy(id).await {
                warn!(deployment = %id, error = %err, "deployment failed to stop during registry close");
            }
        }
        self.bus.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Component for Noop {
        fn name(&self) -> &str {
            "noop"
        }
        async fn start(&self, _ctx: &Context) -> Result<(), ComponentError> {
            Ok(())
        }
        async fn stop(&self, _ctx: &Context) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    struct FailsToStop;

    #[async_trait]
    impl Component for FailsToStop {
        fn name(&self) -> &str {
            "fails-to-stop"
        }
        async fn start(&self, _ctx: &Context) -> Result<(), ComponentError> {
            Ok(())
        }
        async fn stop(&self, _ctx: &Context) -> Result<(), ComponentError> {
            Err(ComponentError::StopFailed("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn deploy_then_undeploy_round_trip() {
        let registry = DeploymentRegistry::new(Bus::new(BusConfig::default()));
        let id = registry.deploy(Arc::new(Noop), ConfigMap::new()).await.unwrap();
        assert_eq!(registry.state(id), Some(DeploymentState::Running));
        registry.undeploy(id).await.unwrap();
        assert_eq!(registry.state(id), None);
    }

    #[tokio::test]
    async fn failed_undeploy_leaves_the_deployment_registered_as_failed() {
        let registry = DeploymentRegistry::new(Bus::new(BusConfig::default()));
        let id = registry
            .deploy(Arc::new(FailsToStop), ConfigMap::new())
            .await
            .unwrap();
        assert!(registry.undeploy(id).await.is_err());
        assert_eq!(registry.state(id), Some(DeploymentState::Failed));
    }

    #[tokio::test]
    async fn undeploy_of_unknown_id_is_not_found() {
        let registry = DeploymentRegistry::new(Bus::new(BusConfig::default()));
        let err = registry.undeploy(DeploymentId::new()).await.unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[tokio::test]
    async fn close_undeploys_everything_and_closes_the_bus() {
        let bus = Bus::new(BusConfig::default());
        let registry = DeploymentRegistry::new(bus.clone());
        registry.deploy(Arc::new(Noop), ConfigMap::new()).await.unwrap();
        registry.deploy(Arc::new(Noop), ConfigMap::new()).await.unwrap();

        registry.close().await;

        assert!(registry.is_empty());
        assert!(bus.is_closed());
    }

    struct BackgroundLoop {
        ran: Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait]
    impl AsyncComponent for BackgroundLoop {
        fn name(&self) -> &str {
            "background-loop"
        }

        async fn async_start(
            &self,
            _ctx: &Context,
            cancel: CancellationToken,
        ) -> Result<(), ComponentError> {
            let ran = Arc::clone(&self.ran);
            tokio::spawn(async move {
                cancel.cancelled().await;
                ran.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
            Ok(())
        }

        async fn async_stop(
            &self,
            _ctx: &Context,
            cancel: CancellationToken,
        ) -> Result<(), ComponentError> {
            cancel.cancelled().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn async_components_are_cancelled_on_undeploy() {
        let registry = DeploymentRegistry::new(Bus::new(BusConfig::default()));
        let ran = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let id = registry
            .deploy_async(Arc::new(BackgroundLoop { ran: Arc::clone(&ran) }), ConfigMap::new())
            .await
            .unwrap();
        assert_eq!(registry.state(id), Some(DeploymentState::Running));

        registry.undeploy(id).await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(ran.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(registry.state(id), None);
    }

    #[tokio::test]
    async fn context_exposes_a_registry_handle_only_when_built_via_new_arc() {
        let bus = Bus::new(BusConfig::default());
        let owned = DeploymentRegistry::new(bus.clone());
        let id = owned.deploy(Arc::new(Noop), ConfigMap::new()).await.unwrap();
        let ctx_without_handle = owned.deployments.lock().get(&id).unwrap().context().clone();
        assert!(ctx_without_handle.registry().is_none());

        let shared = DeploymentRegistry::new_arc(bus);
        let id = shared.deploy(Arc::new(Noop), ConfigMap::new()).await.unwrap();
        let ctx_with_handle = shared.deployments.lock().get(&id).unwrap().context().clone();
        assert!(ctx_with_handle.registry().is_some());
    }
}

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tracing::{info, warn};

// Layer 3: Internal module imports
use super::error::SupervisorError;
use super::policy::{BackoffStrategy, RestartPolicy};
use super::strategy::SupervisionStrategy;
use crate::component::{Component, DeploymentRegistry};
use crate::config::ConfigMap;
use crate::monitoring::{Monitor, NoopMonitor, SupervisionEvent};
use crate::util::DeploymentId;

struct ChildSpec {
    name: String,
    component: Arc<dyn Component>,
    config: ConfigMap,
    policy: RestartPolicy,
    backoff: BackoffStrategy,
    deployment_id: Option<DeploymentId>,
    attempt: u32,
}

/// Supervises a set of [`crate::component::Deployment`]s, restarting
/// them on failure according to a [`SupervisionStrategy`] and each
/// child's own [`RestartPolicy`].
///
/// Children are tracked in registration order — `RestForOne` relies on
/// that order to decide which siblings restart alongside the one that
/// failed.
pub struct Supervisor {
    strategy: SupervisionStrategy,
    registry: Arc<DeploymentRegistry>,
    children: Mutex<Vec<ChildSpec>>,
    max_restarts: Option<u32>,
    monitor: Arc<dyn Monitor<SupervisionEvent>>,
}

impl Supervisor {
    pub fn new(
        strategy: SupervisionStrategy,
        registry: Arc<DeploymentRegistry>,
        max_restarts: Option<u32>,
    ) -> Self {
        Self::with_monitor(strategy, registry, max_restarts, Arc::new(NoopMonitor::new()))
    }

    pub fn with_monitor(
        strategy: SupervisionStrategy,
        registry: Arc<DeploymentRegistry>,
        max_restarts: Option<u32>,
        monitor: Arc<dyn Monitor<SupervisionEvent>>,
    ) -> Self {
        Self {
            strategy,
            registry,
            children: Mutex::new(Vec::new()),
            max_restarts,
            monitor,
        }
    }

    /// Deploy `component` and register it as a supervised child named
    /// `name`. Names must be unique within one supervisor.
    pub async fn add_child(
        &self,
        name: impl Into<String>,
        component: Arc<dyn Component>,
        config: ConfigMap,
        policy: RestartPolicy,
        backoff: BackoffStrategy,
    ) -> Result<DeploymentId, SupervisorError> {
        let name = name.into();
        let deployment_id = self
            .registry
            .deploy(Arc::clone(&component), config.clone())
            .await?;

        self.children.lock().push(ChildSpec {
            name,
            component,
            config,
            policy,
            backoff,
            deployment_id: Some(deployment_id),
            attempt: 0,
        });

        Ok(deployment_id)
    }

    /// Report that the child named `name` exited, and let the
    /// supervisor's strategy and restart policies decide what (if
    /// anything) gets restarted.
    ///
    /// `abnormal_exit` distinguishes a crash/failed health check from a
    /// deliberate `undeploy` — it only affects [`RestartPolicy::Transient`]
    /// children; `OneForAll`/`RestForOne` siblings swept up by the
    /// strategy restart unconditionally, since the strategy — not their
    /// own exit — is why they're being restarted.
    pub async fn handle_exit(&self, name: &str, abnormal_exit: bool) -> Result<(), SupervisorError> {
        let failed_index = {
            let children = self.children.lock();
            children
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| SupervisorError::UnknownChild(name.to_string()))?
        };

        let targets: Vec<usize> = match self.strategy {
            SupervisionStrategy::OneForOne => vec![failed_index],
            SupervisionStrategy::OneForAll => {
                let len = self.children.lock().len();
                (0..len).collect()
            }
            SupervisionStrategy::RestForOne => {
                let len = self.children.lock().len();
                (failed_index..len).collect()
            }
        };

        for index in targets {
            let force = index != failed_index;
            self.restart_child(index, abnormal_exit || force).await?;
        }
        Ok(())
    }

    async fn restart_child(&self, index: usize, abnormal_exit: bool) -> Result<(), SupervisorError> {
        let (name, component, config, should_restart, attempt, delay, old_id) = {
            let mut children = self.children.lock();
            let child = &mut children[index];
            let should_restart = child.policy.should_restart(abnormal_exit);
            child.attempt += 1;
            (
                child.name.clone(),
                Arc::clone(&child.component),
                child.config.clone(),
                should_restart,
                child.attempt,
                child.backoff.delay_with_jitter(child.attempt),
                child.deployment_id.take(),
            )
        };

        if !should_restart {
            info!(child = %name, "supervisor leaving child stopped per its restart policy");
            return Ok(());
        }

        if let Some(limit) = self.max_restarts {
            if attempt > limit {
                warn!(child = %name, attempts = attempt, "child exceeded its restart budget");
                self.monitor.record(SupervisionEvent::DeploymentGaveUp {
                    occurred_at: chrono::Utc::now(),
                    deployment: name.clone(),
                });
                return Err(SupervisorError::RestartBudgetExhausted { name });
            }
        }

        if let Some(old_id) = old_id {
            let _ = self.registry.undeploy(old_id).await;
        }

        tokio::time::sleep(delay).await;

        let new_id = self.registry.deploy(component, config).await?;
        self.children.lock()[index].deployment_id = Some(new_id);

        info!(child = %name, attempt, "supervisor restarted child");
        self.monitor.record(SupervisionEvent::DeploymentRestarted {
            occurred_at: chrono::Utc::now(),
            deployment: name,
            attempt,
        });
        Ok(())
    }

    pub fn deployment_id(&self, name: &str) -> Option<DeploymentId> {
        self.children
            .lock()
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.deployment_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bus::{Bus, BusConfig};
    use crate::component::{ComponentError, Context};
    use async_trait::async_trait;
    use std::time::Duration;

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

    fn registry() -> Arc<DeploymentRegistry> {
        Arc::new(DeploymentRegistry::new(Bus::new(BusConfig::default())))
    }

    #[tokio::test]
    async fn one_for_one_restarts_only_the_failed_child() {
        let registry = registry();
        let supervisor = Supervisor::new(SupervisionStrategy::OneForOne, Arc::clone(&registry), None);

        let a = supervisor
            .add_child("a", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Permanent, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();
        let b = supervisor
            .add_child("b", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Permanent, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();

        supervisor.handle_exit("a", true).await.unwrap();

        assert_ne!(supervisor.deployment_id("a"), Some(a));
        assert_eq!(supervisor.deployment_id("b"), Some(b));
    }

    #[tokio::test]
    async fn one_for_all_restarts_every_child() {
        let registry = registry();
        let supervisor = Supervisor::new(SupervisionStrategy::OneForAll, Arc::clone(&registry), None);

        let a = supervisor
            .add_child("a", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Permanent, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();
        let b = supervisor
            .add_child("b", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Permanent, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();

        supervisor.handle_exit("a", true).await.unwrap();

        assert_ne!(supervisor.deployment_id("a"), Some(a));
        assert_ne!(supervisor.deployment_id("b"), Some(b));
    }

    #[tokio::test]
    async fn never_policy_leaves_the_child_stopped() {
        let registry = registry();
        let supervisor = Supervisor::new(SupervisionStrategy::OneForOne, Arc::clone(&registry), None);

        supervisor
            .add_child("a", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Never, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();

        supervisor.handle_exit("a", true).await.unwrap();
        assert_eq!(supervisor.deployment_id("a"), None);
    }

    #[tokio::test]
    async fn restart_budget_is_enforced() {
        let registry = registry();
        let supervisor = Supervisor::new(SupervisionStrategy::OneForOne, Arc::clone(&registry), Some(1));

        supervisor
            .add_child("a", Arc::new(Noop), ConfigMap::new(), RestartPolicy::Permanent, BackoffStrategy::Fixed(Duration::ZERO))
            .await
            .unwrap();

        supervisor.handle_exit("a", true).await.unwrap();
        let err = supervisor.handle_exit("a", true).await.unwrap_err();
        assert!(matches!(err, SupervisorError::RestartBudgetExhausted { .. }));
    }
}

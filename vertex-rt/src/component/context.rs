// Layer 1: Standard library imports
use std::sync::Weak;

// Layer 3: Internal module imports
use super::registry::DeploymentRegistry;
use crate::bus::Bus;
use crate::config::ConfigMap;
use crate::util::DeploymentId;

/// The capability handle a [`crate::component::Component`] receives on
/// `start`/`stop`: bus access and its own configuration, scoped to one
/// deployment. A component never reaches for global state directly — it
/// only gets what its `Context` hands it.
#[derive(Clone)]
pub struct Context {
    bus: Bus,
    config: ConfigMap,
    deployment_id: DeploymentId,
    registry: Weak<DeploymentRegistry>,
}

impl Context {
    pub(crate) fn new(
        bus: Bus,
        config: ConfigMap,
        deployment_id: DeploymentId,
        registry: Weak<DeploymentRegistry>,
    ) -> Self {
        Self {
            bus,
            config,
            deployment_id,
            registry,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn deployment_id(&self) -> DeploymentId {
        self.deployment_id
    }

    /// The deployment registry this component was deployed through, for
    /// components that need to deploy children of their own. `None` if
    /// the registry wasn't constructed as a shared [`std::sync::Arc`]
    /// (via [`DeploymentRegistry::new_arc`]).
    pub fn registry(&self) -> Option<std::sync::Arc<DeploymentRegistry>> {
        self.registry.upgrade()
    }
}

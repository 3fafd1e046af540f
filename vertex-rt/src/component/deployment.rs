// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

// Layer 3: Internal module imports
use super::context::Context;
use super::traits::{AsyncComponent, Component};
use crate::util::DeploymentId;

/// Where a [`Deployment`] sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Either half of the `Component`/`AsyncComponent` split, so a single
/// [`Deployment`] type can track both kinds uniformly.
pub(crate) enum DeployedComponent {
    Sync(Arc<dyn Component>),
    Async(Arc<dyn AsyncComponent>, CancellationToken),
}

impl DeployedComponent {
    fn name(&self) -> &str {
        match self {
            Self::Sync(c) => c.name(),
            Self::Async(c, _) => c.name(),
        }
    }
}

/// One running instance of a [`Component`] or [`AsyncComponent`], tracked
/// by the [`crate::component::DeploymentRegistry`].
pub struct Deployment {
    id: DeploymentId,
    component: DeployedComponent,
    context: Context,
    state: DeploymentState,
    deployed_at: DateTime<Utc>,
}

impl Deployment {
    pub(crate) fn new(id: DeploymentId, component: Arc<dyn Component>, context: Context) -> Self {
        Self::with_component(id, DeployedComponent::Sync(component), context)
    }

    pub(crate) fn new_async(
        id: DeploymentId,
        component: Arc<dyn AsyncComponent>,
        cancel: CancellationToken,
        context: Context,
    ) -> Self {
        Self::with_component(id, DeployedComponent::Async(component, cancel), context)
    }

    fn with_component(id: DeploymentId, component: DeployedComponent, context: Context) -> Self {
        Self {
            id,
            component,
            context,
            state: DeploymentState::Starting,
            deployed_at: Utc::now(),
        }
    }

    pub fn id(&self) -> DeploymentId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.component.name()
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: DeploymentState) {
        self.state = state;
    }

    pub fn deployed_at(&self) -> DateTime<Utc> {
        self.deployed_at
    }

    pub(crate) fn component(&self) -> &DeployedComponent {
        &self.component
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

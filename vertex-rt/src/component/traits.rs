// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// Layer 3: Internal module imports
use super::context::Context;
use super::error::ComponentError;

/// A unit of deployable application logic.
///
/// A component registers its own consumers against `ctx.bus()` in
/// `start` and unregisters them in `stop` — the runtime doesn't track
/// which addresses a component claimed; the component is responsible
/// for its own cleanup.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Human-readable name, used in deployment listings and log output.
    fn name(&self) -> &str;

    async fn start(&self, ctx: &Context) -> Result<(), ComponentError>;

    async fn stop(&self, ctx: &Context) -> Result<(), ComponentError>;
}

/// A [`Component`] whose `start` must kick off work that runs for the
/// whole lifetime of the deployment — a blocking `listen_and_serve` loop,
/// say — without blocking the caller of `deploy_async`.
///
/// `async_start` is expected to return promptly: submit the long-running
/// work as a task of its own (respecting `cancel`) rather than running it
/// inline. `async_stop` is handed the same token, already cancelled by
/// the registry, to await whatever orderly shutdown the component needs
/// beyond the cancellation itself (e.g. waiting for a listener socket to
/// drop).
#[async_trait]
pub trait AsyncComponent: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn async_start(&self, ctx: &Context, cancel: CancellationToken) -> Result<(), ComponentError>;

    async fn async_stop(&self, ctx: &Context, cancel: CancellationToken) -> Result<(), ComponentError>;
}

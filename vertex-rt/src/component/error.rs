/// Errors surfaced by component lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("component failed to start: {0}")]
    StartFailed(String),

    #[error("component failed to stop: {0}")]
    StopFailed(String),

    #[error("no deployment registered with id {0}")]
    NotFound(crate::util::DeploymentId),
}

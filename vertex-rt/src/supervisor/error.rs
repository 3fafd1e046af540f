/// Errors surfaced by [`crate::supervisor::Supervisor`].
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("no child named {0} is registered with this supervisor")]
    UnknownChild(String),

    #[error("child {name} exceeded its restart budget and will not be restarted again")]
    RestartBudgetExhausted { name: String },

    #[error(transparent)]
    Component(#[from] crate::component::ComponentError),
}

//! Components: the unit of deployable application logic, and the
//! registry tracking which are currently running.

mod context;
mod deployment;
mod error;
mod registry;
mod traits;

pub use context::Context;
pub use deployment::{Deployment, DeploymentState};
pub use error::ComponentError;
pub use registry::DeploymentRegistry;
pub use traits::{AsyncComponent, Component};

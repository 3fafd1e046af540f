//! Small standalone identifiers shared across every subsystem.

mod address;
mod ids;

pub use address::{Address, AddressError};
pub use ids::{CorrelationId, DeploymentId};

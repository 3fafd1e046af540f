//! The HTTP-agnostic admission front end: a two-stage backpressure
//! gate (a capacity token, then a bounded request queue) sitting in
//! front of whatever HTTP library a deployment chooses to use.
//!
//! This module never depends on a concrete HTTP server — it exposes
//! [`HttpRequestContext`]/[`ResponseWriter`] traits an adapter crate
//! implements against axum, hyper, or anything else.

mod backpressure;
mod config;
mod error;
mod http;
mod layer;

pub use backpressure::BackpressureController;
pub use config::AdmissionConfig;
pub use error::AdmissionError;
pub use http::{HttpRequestContext, ResponseWriter};
pub use layer::AdmissionLayer;

//! DigitalOcean API plumbing
//!
//! Everything beneath the resource clients: the HTTP SDK wrapper, the wire
//! types, the pagination driver and the action-wait controller.

pub mod error;
pub mod http;
pub mod paginate;
pub mod types;
pub mod wait;

pub use error::ApiError;
pub use http::Sdk;

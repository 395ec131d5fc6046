//! HTTP API.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod status;
pub mod stories;

pub use routes::*;

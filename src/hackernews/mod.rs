//! Client for the Hacker News Firebase API.

pub mod api;
pub mod errors;
pub mod json;
pub mod models;

pub use api::*;
pub use errors::*;
pub use models::*;

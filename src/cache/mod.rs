//! In-memory caching for upstream fetches.

mod key;
mod singleflight;

pub use key::CacheKey;
pub use singleflight::{LoadError, Loading, SingleFlightCache};

//! Generic read-through caching.
//!
//! This module is catalog-agnostic. It:
//! - Serves whatever the local store already holds without touching the network
//! - On a miss, fetches once, persists, then answers from a fresh store query
//! - Passes remote failures through untouched and writes nothing on failure

mod layer;
mod traits;

pub use layer::CacheLayer;
pub use traits::{CachePolicy, CacheResult, CacheSource};

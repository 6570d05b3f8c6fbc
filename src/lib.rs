//! Local-first hero catalog.
//!
//! Heroes, their locations and their transformations are served from a local
//! SQLite store and filled from the remote API only when the store has nothing
//! for the request.

pub mod cache;
pub mod config;
pub mod heroes;
pub mod store;

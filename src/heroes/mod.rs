pub mod api_types;
pub mod catalog;
pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use catalog::HeroCatalog;
pub use client::{HeroApiClient, HeroSource};
pub use credentials::{KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use error::{CacheError, RemoteError};

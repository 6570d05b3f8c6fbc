//! Core types for the caching system.

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  /// Data that was already in the local store.
  pub fn from_store(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Store,
    }
  }

  /// Data fetched remotely, persisted, then re-read from the store.
  pub fn from_remote(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Remote,
    }
  }

  /// Skipped the remote because an earlier fetch for this key came back empty.
  pub fn known_empty(data: T) -> Self {
    Self {
      data,
      source: CacheSource::KnownEmpty,
    }
  }

  pub fn into_data(self) -> T {
    self.data
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Local store hit, no remote call
  Store,
  /// Local miss, filled from the remote source
  Remote,
  /// Local miss for a key already known to be empty remotely
  KnownEmpty,
}

/// Behaviour switches for the read-through policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
  /// Re-fetch on every load while the local result stays empty, even when the
  /// remote already answered with nothing for the same key
  pub refetch_when_empty: bool,
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self {
      refetch_when_empty: true,
    }
  }
}

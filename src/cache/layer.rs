//! Cache layer that orchestrates the read-through policy over a store.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::traits::{CachePolicy, CacheResult};

/// Read-through coordinator for one entity family.
///
/// The layer does not know what is stored; callers hand it a query, a fetcher
/// and a persist step. It owns the order of those steps and nothing else.
pub struct CacheLayer<S> {
  storage: Arc<S>,
  policy: CachePolicy,
  /// Keys whose remote fetch returned nothing (only tracked when the policy
  /// disables re-fetching)
  known_empty: Arc<Mutex<HashSet<String>>>,
}

impl<S> CacheLayer<S> {
  /// Create a new cache layer over a shared store.
  pub fn new(storage: Arc<S>) -> Self {
    Self {
      storage,
      policy: CachePolicy::default(),
      known_empty: Arc::new(Mutex::new(HashSet::new())),
    }
  }

  pub fn with_policy(mut self, policy: CachePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Forget which keys were remotely empty.
  pub fn reset(&self) {
    if let Ok(mut keys) = self.known_empty.lock() {
      keys.clear();
    }
  }

  fn is_known_empty(&self, key: &str) -> bool {
    !self.policy.refetch_when_empty
      && self
        .known_empty
        .lock()
        .map(|keys| keys.contains(key))
        .unwrap_or(false)
  }

  fn remember_empty(&self, key: &str) {
    if self.policy.refetch_when_empty {
      return;
    }
    match self.known_empty.lock() {
      Ok(mut keys) => {
        keys.insert(key.to_string());
      }
      Err(e) => warn!(key, error = %e, "Failed to record empty fetch"),
    }
  }

  /// Fetch a list with a store-first strategy.
  ///
  /// 1. Query the store - if anything is there, return it, no remote call
  /// 2. Otherwise call the fetcher once
  /// 3. On success, persist the records and return a fresh store query
  /// 4. On failure, return the error; nothing has been written
  ///
  /// The `key` identifies the request for logging and empty-result tracking
  /// (e.g., "locations:<hero id>").
  pub async fn read_through<T, R, E, Q, F, Fut, P>(
    &self,
    key: &str,
    query: Q,
    fetcher: F,
    persist: P,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    Q: Fn(&S) -> Vec<T>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<R>, E>>,
    P: FnOnce(&S, &[R]),
  {
    let storage: &S = &self.storage;

    let cached = query(storage);
    if !cached.is_empty() {
      debug!(key, count = cached.len(), "Cache hit");
      return Ok(CacheResult::from_store(cached));
    }

    if self.is_known_empty(key) {
      debug!(key, "Remote already returned nothing for this key");
      return Ok(CacheResult::known_empty(cached));
    }

    debug!(key, "Cache miss, fetching from remote");
    let records = fetcher().await?;
    debug!(key, count = records.len(), "Fetched from remote");

    if records.is_empty() {
      self.remember_empty(key);
    }

    // The store lock is only taken from here on; the fetch above ran without it
    persist(storage, records.as_slice());
    Ok(CacheResult::from_remote(query(storage)))
  }
}

impl<S> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      policy: self.policy,
      known_empty: Arc::clone(&self.known_empty),
    }
  }
}

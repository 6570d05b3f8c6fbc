//! Durable local storage for heroes, locations and transformations.
//!
//! The store is the only shared mutable resource in the crate. Reads come in
//! two flavours:
//! - `query_*` is the fallible primitive and reports storage faults
//! - `fetch_*` is what callers use; a fault is logged and turned into an empty
//!   result, so it looks exactly like "nothing cached yet"
//!
//! Writes never fail from the caller's point of view; errors are logged.

mod filter;
mod resolver;
mod schema;
mod sqlite;

pub use filter::HeroFilter;
pub use resolver::{HeroRef, OwnerLookup, RelationshipResolver};
pub use sqlite::{ClearMode, SqliteStore};

use thiserror::Error;
use tracing::warn;

use crate::heroes::api_types::{HeroRecord, LocationRecord, TransformationRecord};
use crate::heroes::types::{Hero, Location, Transformation};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("SQLite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("Failed to prepare store location: {0}")]
  Io(#[from] std::io::Error),

  #[error("Store lock poisoned")]
  LockPoisoned,

  #[error("Could not determine data directory")]
  NoDataDir,
}

/// Persistence contract for the hero catalog.
pub trait HeroStore: Send + Sync {
  /// Heroes matching `filter`, ordered by name then insertion order.
  fn query_heroes(&self, filter: Option<&HeroFilter>, ascending: bool) -> StoreResult<Vec<Hero>>;

  /// Locations owned by `hero_id`, in insertion order.
  fn query_locations(&self, hero_id: &str) -> StoreResult<Vec<Location>>;

  /// Transformations owned by `hero_id`, in insertion order.
  fn query_transformations(&self, hero_id: &str) -> StoreResult<Vec<Transformation>>;

  /// Merge-or-create each record by id, one property at a time.
  fn insert_heroes(&self, records: &[HeroRecord]);

  /// Append locations, attaching each to its hero when the hero is known.
  fn insert_locations(&self, records: &[LocationRecord]);

  /// Append transformations, attaching each to its hero when the hero is known.
  fn insert_transformations(&self, records: &[TransformationRecord]);

  /// Empty all three collections.
  fn clear_all(&self);

  /// Flush pending writes. Does nothing when nothing is pending.
  fn save(&self);

  fn fetch_heroes(&self, filter: Option<&HeroFilter>, ascending: bool) -> Vec<Hero> {
    self.query_heroes(filter, ascending).unwrap_or_else(|e| {
      warn!(error = %e, "Failed to load heroes");
      Vec::new()
    })
  }

  fn fetch_locations(&self, hero_id: &str) -> Vec<Location> {
    self.query_locations(hero_id).unwrap_or_else(|e| {
      warn!(hero_id, error = %e, "Failed to load locations");
      Vec::new()
    })
  }

  fn fetch_transformations(&self, hero_id: &str) -> Vec<Transformation> {
    self.query_transformations(hero_id).unwrap_or_else(|e| {
      warn!(hero_id, error = %e, "Failed to load transformations");
      Vec::new()
    })
  }

  /// Look up a single hero by exact id.
  fn find_hero(&self, id: &str) -> Option<Hero> {
    self
      .fetch_heroes(Some(&HeroFilter::id(id)), true)
      .into_iter()
      .next()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Store whose query path always faults; writes go to a real store.
  pub(crate) struct FaultyStore(pub SqliteStore);

  fn fault() -> StoreError {
    StoreError::Sqlite(rusqlite::Error::InvalidQuery)
  }

  impl HeroStore for FaultyStore {
    fn query_heroes(&self, _: Option<&HeroFilter>, _: bool) -> StoreResult<Vec<Hero>> {
      Err(fault())
    }

    fn query_locations(&self, _: &str) -> StoreResult<Vec<Location>> {
      Err(fault())
    }

    fn query_transformations(&self, _: &str) -> StoreResult<Vec<Transformation>> {
      Err(fault())
    }

    fn insert_heroes(&self, records: &[HeroRecord]) {
      self.0.insert_heroes(records)
    }

    fn insert_locations(&self, records: &[LocationRecord]) {
      self.0.insert_locations(records)
    }

    fn insert_transformations(&self, records: &[TransformationRecord]) {
      self.0.insert_transformations(records)
    }

    fn clear_all(&self) {
      self.0.clear_all()
    }

    fn save(&self) {
      self.0.save()
    }
  }

  fn hero_record(id: &str, name: &str) -> HeroRecord {
    HeroRecord {
      id: Some(id.to_string()),
      name: Some(name.to_string()),
      info: Some("description".to_string()),
      photo: Some("photo".to_string()),
      favorite: Some(true),
    }
  }

  #[test]
  fn test_fetch_heroes_fault_returns_empty() {
    let store = FaultyStore(SqliteStore::in_memory().unwrap());

    store.insert_heroes(&[hero_record("123", "Luis")]);

    assert!(store.fetch_heroes(None, true).is_empty());
    assert!(store.find_hero("123").is_none());
    // The write itself went through
    assert_eq!(store.0.fetch_heroes(None, true).len(), 1);
  }

  #[test]
  fn test_fetch_children_fault_returns_empty() {
    let store = FaultyStore(SqliteStore::in_memory().unwrap());
    store.insert_heroes(&[hero_record("123", "Goku")]);
    store.insert_locations(&[LocationRecord {
      id: Some("L1".to_string()),
      hero: Some(crate::heroes::api_types::ParentRef {
        id: Some("123".to_string()),
      }),
      ..Default::default()
    }]);

    assert!(store.fetch_locations("123").is_empty());
    assert!(store.fetch_transformations("123").is_empty());
  }
}

//! Read-through access to the hero catalog.

use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{CacheLayer, CachePolicy, CacheResult};
use crate::store::{HeroFilter, HeroStore};

use super::api_types::{HeroRecord, LocationRecord, TransformationRecord};
use super::client::HeroSource;
use super::error::CacheError;
use super::types::{Hero, Location, Transformation};

/// Hero catalog with transparent local caching.
///
/// Holds one cache layer per entity family. All of them share the same store
/// instance, injected at construction.
pub struct HeroCatalog<S, R> {
  remote: Arc<R>,
  heroes: CacheLayer<S>,
  locations: CacheLayer<S>,
  transformations: CacheLayer<S>,
}

impl<S, R> Clone for HeroCatalog<S, R> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      heroes: self.heroes.clone(),
      locations: self.locations.clone(),
      transformations: self.transformations.clone(),
    }
  }
}

impl<S: HeroStore, R: HeroSource> HeroCatalog<S, R> {
  pub fn new(store: Arc<S>, remote: Arc<R>) -> Self {
    Self::with_policy(store, remote, CachePolicy::default())
  }

  pub fn with_policy(store: Arc<S>, remote: Arc<R>, policy: CachePolicy) -> Self {
    Self {
      remote,
      heroes: CacheLayer::new(Arc::clone(&store)).with_policy(policy),
      locations: CacheLayer::new(Arc::clone(&store)).with_policy(policy),
      transformations: CacheLayer::new(store).with_policy(policy),
    }
  }

  pub fn store(&self) -> &S {
    self.heroes.storage()
  }

  /// Heroes matching `filter`, sorted by name.
  ///
  /// On a local miss the remote search runs with the name implied by the
  /// filter (all heroes when it implies none).
  pub async fn load_heroes(
    &self,
    filter: Option<HeroFilter>,
  ) -> Result<CacheResult<Vec<Hero>>, CacheError> {
    let name = filter
      .as_ref()
      .map(HeroFilter::remote_name)
      .unwrap_or("")
      .to_string();
    let key = format!("heroes:{:?}", filter);

    let result = self
      .heroes
      .read_through(
        &key,
        |store: &S| store.fetch_heroes(filter.as_ref(), true),
        || {
          let remote = Arc::clone(&self.remote);
          async move { remote.fetch_heroes(&name).await }
        },
        |store: &S, records: &[HeroRecord]| store.insert_heroes(records),
      )
      .await?;

    Ok(result)
  }

  /// Locations of a hero that is already in the store.
  pub async fn load_locations(
    &self,
    hero_id: &str,
  ) -> Result<CacheResult<Vec<Location>>, CacheError> {
    self.require_hero(hero_id)?;
    let key = format!("locations:{}", hero_id);

    let result = self
      .locations
      .read_through(
        &key,
        |store: &S| store.fetch_locations(hero_id),
        || {
          let remote = Arc::clone(&self.remote);
          let hero_id = hero_id.to_string();
          async move { remote.fetch_locations(&hero_id).await }
        },
        |store: &S, records: &[LocationRecord]| store.insert_locations(records),
      )
      .await?;

    Ok(result)
  }

  /// Transformations of a hero that is already in the store.
  pub async fn load_transformations(
    &self,
    hero_id: &str,
  ) -> Result<CacheResult<Vec<Transformation>>, CacheError> {
    self.require_hero(hero_id)?;
    let key = format!("transformations:{}", hero_id);

    let result = self
      .transformations
      .read_through(
        &key,
        |store: &S| store.fetch_transformations(hero_id),
        || {
          let remote = Arc::clone(&self.remote);
          let hero_id = hero_id.to_string();
          async move { remote.fetch_transformations(&hero_id).await }
        },
        |store: &S, records: &[TransformationRecord]| {
          store.insert_transformations(records)
        },
      )
      .await?;

    Ok(result)
  }

  /// Drop every cached entity, e.g. when a session ends.
  pub fn clear_all(&self) {
    self.store().clear_all();
    self.heroes.reset();
    self.locations.reset();
    self.transformations.reset();
    info!("Catalog cleared");
  }

  /// Child families only make sense for a hero we already know about.
  fn require_hero(&self, hero_id: &str) -> Result<Hero, CacheError> {
    self.store().find_hero(hero_id).ok_or_else(|| {
      debug!(hero_id, "Parent hero not in store");
      CacheError::NotFound {
        hero_id: hero_id.to_string(),
      }
    })
  }
}

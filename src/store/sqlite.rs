//! SQLite implementation of the hero store.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::filter::HeroFilter;
use super::resolver::{HeroRef, OwnerLookup, RelationshipResolver};
use super::schema::{SCHEMA, TABLES};
use super::{HeroStore, StoreError, StoreResult};
use crate::heroes::api_types::{HeroRecord, LocationRecord, TransformationRecord};
use crate::heroes::types::{Hero, Location, Transformation};

const HERO_SELECT_SQL: &str = "SELECT id, name, info, photo, favorite FROM heroes";

/// How `clear_all` treats a failure on one of the tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearMode {
  /// Keep going; deletions already applied stay applied
  #[default]
  BestEffort,
  /// All three tables in one transaction, rolled back on any failure
  Atomic,
}

/// SQLite-backed store.
///
/// The connection sits behind a single mutex: every read and write runs while
/// holding it, which makes the mutex the one confinement context for the data.
pub struct SqliteStore {
  inner: Mutex<Inner>,
  clear_mode: ClearMode,
}

struct Inner {
  conn: Connection,
  /// A write transaction is open and not yet committed
  dirty: bool,
}

impl Inner {
  fn mark_dirty(&mut self) -> rusqlite::Result<()> {
    if !self.dirty {
      self.conn.execute_batch("BEGIN")?;
      self.dirty = true;
    }
    Ok(())
  }

  fn flush(&mut self) {
    if !self.dirty {
      return;
    }
    self.dirty = false;

    if let Err(e) = self.conn.execute_batch("COMMIT") {
      warn!(error = %e, "Failed to save pending writes");
      if let Err(e) = self.conn.execute_batch("ROLLBACK") {
        debug!(error = %e, "Rollback after failed save");
      }
    }
  }
}

impl SqliteStore {
  /// Open (or create) the store at `path`.
  pub fn open(path: &Path) -> StoreResult<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "Opened hero store");
    Self::from_connection(conn)
  }

  /// Open the store at the default location.
  pub fn open_default() -> StoreResult<Self> {
    Self::open(&Self::default_path()?)
  }

  /// A store that lives only as long as this value.
  pub fn in_memory() -> StoreResult<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  /// Get the default database path.
  pub fn default_path() -> StoreResult<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(StoreError::NoDataDir)?;

    Ok(data_dir.join("herocache").join("store.db"))
  }

  pub fn with_clear_mode(mut self, clear_mode: ClearMode) -> Self {
    self.clear_mode = clear_mode;
    self
  }

  fn from_connection(conn: Connection) -> StoreResult<Self> {
    conn.execute_batch(SCHEMA)?;

    Ok(Self {
      inner: Mutex::new(Inner { conn, dirty: false }),
      clear_mode: ClearMode::default(),
    })
  }

  fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
    self.inner.lock().map_err(|_| StoreError::LockPoisoned)
  }

  /// Lock and open a write transaction, logging instead of failing.
  fn lock_for_write(&self, what: &str) -> Option<MutexGuard<'_, Inner>> {
    let mut inner = match self.lock() {
      Ok(inner) => inner,
      Err(e) => {
        warn!(error = %e, "Failed to insert {}", what);
        return None;
      }
    };

    if let Err(e) = inner.mark_dirty() {
      warn!(error = %e, "Failed to begin write for {}", what);
      return None;
    }
    Some(inner)
  }
}

impl HeroStore for SqliteStore {
  fn query_heroes(&self, filter: Option<&HeroFilter>, ascending: bool) -> StoreResult<Vec<Hero>> {
    let inner = self.lock()?;
    Ok(select_heroes(&inner.conn, filter, ascending)?)
  }

  fn query_locations(&self, hero_id: &str) -> StoreResult<Vec<Location>> {
    let inner = self.lock()?;

    let mut stmt = inner.conn.prepare(
      "SELECT id, date, latitude, longitude, hero_id FROM locations
       WHERE hero_id = ?
       ORDER BY row_id",
    )?;
    let rows = stmt.query_map(params![hero_id], location_from_row)?;
    let locations = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(locations)
  }

  fn query_transformations(&self, hero_id: &str) -> StoreResult<Vec<Transformation>> {
    let inner = self.lock()?;

    let mut stmt = inner.conn.prepare(
      "SELECT id, name, info, photo, hero_id FROM transformations
       WHERE hero_id = ?
       ORDER BY row_id",
    )?;
    let rows = stmt.query_map(params![hero_id], transformation_from_row)?;
    let transformations = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(transformations)
  }

  fn insert_heroes(&self, records: &[HeroRecord]) {
    let Some(mut inner) = self.lock_for_write("heroes") else {
      return;
    };

    for record in records {
      match merge_hero(&inner.conn, record) {
        Ok(MergeOutcome::Created) | Ok(MergeOutcome::Merged) => {}
        Ok(MergeOutcome::Skipped) => warn!("Skipping hero record without id"),
        Err(e) => warn!(id = ?record.id, error = %e, "Failed to store hero"),
      }
    }

    inner.flush();
    debug!(count = records.len(), "Inserted heroes");
  }

  fn insert_locations(&self, records: &[LocationRecord]) {
    let Some(mut inner) = self.lock_for_write("locations") else {
      return;
    };

    for record in records {
      let owner = RelationshipResolver::new(&inner.conn).resolve(record.parent_id());
      if owner.is_none() {
        debug!(id = ?record.id, parent = ?record.parent_id(), "Location has no known owner");
      }
      if let Err(e) = insert_location(&inner.conn, record, owner.as_ref()) {
        warn!(id = ?record.id, error = %e, "Failed to store location");
      }
    }

    inner.flush();
    debug!(count = records.len(), "Inserted locations");
  }

  fn insert_transformations(&self, records: &[TransformationRecord]) {
    let Some(mut inner) = self.lock_for_write("transformations") else {
      return;
    };

    for record in records {
      let owner = RelationshipResolver::new(&inner.conn).resolve(record.parent_id());
      if owner.is_none() {
        debug!(id = ?record.id, parent = ?record.parent_id(), "Transformation has no known owner");
      }
      if let Err(e) = insert_transformation(&inner.conn, record, owner.as_ref()) {
        warn!(id = ?record.id, error = %e, "Failed to store transformation");
      }
    }

    inner.flush();
    debug!(count = records.len(), "Inserted transformations");
  }

  fn clear_all(&self) {
    let mut inner = match self.lock() {
      Ok(inner) => inner,
      Err(e) => {
        warn!(error = %e, "Failed to clear store");
        return;
      }
    };
    inner.flush();

    match self.clear_mode {
      ClearMode::BestEffort => {
        for table in TABLES {
          if let Err(e) = inner.conn.execute(&format!("DELETE FROM {}", table), []) {
            warn!(table, error = %e, "Failed to clear table");
          }
        }
      }
      ClearMode::Atomic => {
        if let Err(e) = clear_atomically(&mut inner.conn) {
          warn!(error = %e, "Failed to clear store, nothing was deleted");
          return;
        }
      }
    }

    info!(mode = ?self.clear_mode, "Cleared local store");
  }

  fn save(&self) {
    match self.lock() {
      Ok(mut inner) => inner.flush(),
      Err(e) => warn!(error = %e, "Failed to save store"),
    }
  }
}

impl OwnerLookup for Connection {
  fn heroes_with_id(&self, id: &str) -> Vec<Hero> {
    select_heroes(self, Some(&HeroFilter::id(id)), true).unwrap_or_else(|e| {
      warn!(id, error = %e, "Failed to look up owning hero");
      Vec::new()
    })
  }
}

fn select_heroes(
  conn: &Connection,
  filter: Option<&HeroFilter>,
  ascending: bool,
) -> rusqlite::Result<Vec<Hero>> {
  let mut values = Vec::new();
  let mut sql = String::from(HERO_SELECT_SQL);

  if let Some(filter) = filter {
    sql.push_str(" WHERE ");
    sql.push_str(&filter.to_sql(&mut values));
  }
  sql.push_str(if ascending {
    " ORDER BY name ASC, rowid ASC"
  } else {
    " ORDER BY name DESC, rowid ASC"
  });

  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt.query_map(params_from_iter(values.iter()), hero_from_row)?;
  rows.collect()
}

fn hero_from_row(row: &Row) -> rusqlite::Result<Hero> {
  Ok(Hero {
    id: row.get(0)?,
    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    info: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    photo: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    favorite: row.get(4)?,
  })
}

fn location_from_row(row: &Row) -> rusqlite::Result<Location> {
  Ok(Location {
    id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
    date: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    latitude: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    longitude: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    hero_id: row.get(4)?,
  })
}

fn transformation_from_row(row: &Row) -> rusqlite::Result<Transformation> {
  Ok(Transformation {
    id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    info: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    photo: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    hero_id: row.get(4)?,
  })
}

enum MergeOutcome {
  Created,
  Merged,
  Skipped,
}

/// Stored hero columns, before domain defaults are applied.
#[derive(Default)]
struct StoredHero {
  name: Option<String>,
  info: Option<String>,
  photo: Option<String>,
  favorite: bool,
}

impl StoredHero {
  /// Overwrite every property the record carries; keep the rest.
  fn apply(&mut self, record: &HeroRecord) {
    if let Some(name) = &record.name {
      self.name = Some(name.clone());
    }
    if let Some(info) = &record.info {
      self.info = Some(info.clone());
    }
    if let Some(photo) = &record.photo {
      self.photo = Some(photo.clone());
    }
    if let Some(favorite) = record.favorite {
      self.favorite = favorite;
    }
  }
}

fn merge_hero(conn: &Connection, record: &HeroRecord) -> rusqlite::Result<MergeOutcome> {
  let Some(id) = record.id.as_deref() else {
    return Ok(MergeOutcome::Skipped);
  };

  let existing = conn
    .query_row(
      "SELECT name, info, photo, favorite FROM heroes WHERE id = ?",
      params![id],
      |row| {
        Ok(StoredHero {
          name: row.get(0)?,
          info: row.get(1)?,
          photo: row.get(2)?,
          favorite: row.get(3)?,
        })
      },
    )
    .optional()?;

  match existing {
    Some(mut stored) => {
      stored.apply(record);
      conn.execute(
        "UPDATE heroes SET name = ?2, info = ?3, photo = ?4, favorite = ?5 WHERE id = ?1",
        params![id, stored.name, stored.info, stored.photo, stored.favorite],
      )?;
      Ok(MergeOutcome::Merged)
    }
    None => {
      let mut stored = StoredHero::default();
      stored.apply(record);
      conn.execute(
        "INSERT INTO heroes (id, name, info, photo, favorite) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, stored.name, stored.info, stored.photo, stored.favorite],
      )?;
      Ok(MergeOutcome::Created)
    }
  }
}

fn insert_location(
  conn: &Connection,
  record: &LocationRecord,
  owner: Option<&HeroRef>,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO locations (id, date, latitude, longitude, hero_id) VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      record.id,
      record.date,
      record.latitude,
      record.longitude,
      owner.map(|o| o.id.as_str())
    ],
  )?;
  Ok(())
}

fn insert_transformation(
  conn: &Connection,
  record: &TransformationRecord,
  owner: Option<&HeroRef>,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO transformations (id, name, info, photo, hero_id) VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      record.id,
      record.name,
      record.info,
      record.photo,
      owner.map(|o| o.id.as_str())
    ],
  )?;
  Ok(())
}

fn clear_atomically(conn: &mut Connection) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  for table in TABLES {
    tx.execute(&format!("DELETE FROM {}", table), [])?;
  }
  tx.commit()
}

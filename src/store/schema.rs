/// Schema for the hero store. Safe to run on every open.
pub const SCHEMA: &str = r#"
-- Heroes are keyed by their API id; rowid keeps insertion order for ties
CREATE TABLE IF NOT EXISTS heroes (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT,
    info TEXT,
    photo TEXT,
    favorite INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_heroes_name ON heroes(name);

-- Children are append-only; hero_id is NULL when the owner was unknown
CREATE TABLE IF NOT EXISTS locations (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT,
    date TEXT,
    latitude TEXT,
    longitude TEXT,
    hero_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_locations_hero ON locations(hero_id);

CREATE TABLE IF NOT EXISTS transformations (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT,
    name TEXT,
    info TEXT,
    photo TEXT,
    hero_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_transformations_hero ON transformations(hero_id);
"#;

/// Tables emptied by a clear, in deletion order.
pub const TABLES: [&str; 3] = ["heroes", "locations", "transformations"];

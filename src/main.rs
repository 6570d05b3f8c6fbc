use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use herocache::config::Config;
use herocache::heroes::{
  HeroApiClient, HeroCatalog, KeyringTokenStore, MemoryTokenStore, TokenStore,
};
use herocache::store::{HeroFilter, HeroStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "herocache")]
#[command(about = "Browse the hero catalog through a local cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/herocache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List heroes
  Heroes {
    /// Exact name
    #[arg(long, conflicts_with = "contains")]
    name: Option<String>,
    /// Name substring (ASCII letters match in any case)
    #[arg(long)]
    contains: Option<String>,
    /// Only favorites
    #[arg(long)]
    favorites: bool,
    /// Sort by name descending
    #[arg(long)]
    desc: bool,
  },
  /// List the locations of a hero
  Locations { hero_id: String },
  /// List the transformations of a hero
  Transformations { hero_id: String },
  /// Log in and keep the session token (password from HEROCACHE_PASSWORD)
  Login { user: String },
  /// Forget the session token and everything cached
  Logout,
  /// Drop everything cached
  Clear,
}

/// Log to a file in the data directory; stdout is for results.
fn init_tracing() -> Option<WorkerGuard> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("herocache=info"));
  let log_dir = dirs::data_dir()?.join("herocache");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::never(log_dir, "herocache.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(filter)
    .init();

  Some(guard)
}

fn open_store(config: &Config) -> Result<SqliteStore> {
  let store = if config.storage.in_memory {
    SqliteStore::in_memory()?
  } else if let Some(path) = &config.storage.path {
    SqliteStore::open(path)?
  } else {
    SqliteStore::open_default()?
  };
  Ok(store.with_clear_mode(config.storage.clear_mode()))
}

fn hero_filter(
  name: Option<String>,
  contains: Option<String>,
  favorites: bool,
) -> Option<HeroFilter> {
  let mut parts = Vec::new();
  if let Some(name) = name {
    parts.push(HeroFilter::Name(name));
  }
  if let Some(fragment) = contains {
    parts.push(HeroFilter::NameContains(fragment));
  }
  if favorites {
    parts.push(HeroFilter::Favorite(true));
  }

  match parts.len() {
    0 => None,
    1 => parts.pop(),
    _ => Some(HeroFilter::All(parts)),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_tracing();

  let config = Config::load(args.config.as_deref())?;
  info!(api = %config.api.url, "herocache starting");

  let tokens: Arc<dyn TokenStore> = match Config::get_api_token() {
    Some(token) => Arc::new(MemoryTokenStore::with_token(token)),
    None => Arc::new(KeyringTokenStore::new()),
  };

  let store = Arc::new(open_store(&config)?);
  let client = Arc::new(HeroApiClient::new(&config, Arc::clone(&tokens))?);
  let catalog = HeroCatalog::with_policy(
    Arc::clone(&store),
    Arc::clone(&client),
    config.cache.policy(),
  );

  match args.command {
    Command::Heroes {
      name,
      contains,
      favorites,
      desc,
    } => {
      let filter = hero_filter(name, contains, favorites);
      let mut heroes = catalog.load_heroes(filter.clone()).await?.into_data();
      if desc {
        heroes = store.fetch_heroes(filter.as_ref(), false);
      }
      for hero in heroes {
        let star = if hero.favorite { "*" } else { " " };
        println!("{} {}  {}", star, hero.id, hero.name);
      }
    }
    Command::Locations { hero_id } => {
      for location in catalog.load_locations(&hero_id).await?.into_data() {
        match location.coordinate() {
          Some(c) => println!(
            "{}  {}  ({}, {})",
            location.id, location.date, c.latitude, c.longitude
          ),
          None => println!("{}  {}  no coordinate", location.id, location.date),
        }
      }
    }
    Command::Transformations { hero_id } => {
      for transformation in catalog.load_transformations(&hero_id).await?.into_data() {
        println!("{}  {}", transformation.id, transformation.name);
      }
    }
    Command::Login { user } => {
      let password = Config::get_password()?;
      let token = client.login(&user, &password).await?;
      if token.is_empty() {
        return Err(eyre!("Login succeeded but the server returned no token"));
      }
      tokens.set_token(&token);
      println!("Logged in as {}", user);
    }
    Command::Logout => {
      tokens.delete_token();
      catalog.clear_all();
      println!("Logged out");
    }
    Command::Clear => {
      catalog.clear_all();
      println!("Cache cleared");
    }
  }

  store.save();
  Ok(())
}

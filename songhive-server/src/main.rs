//! songhive-server - SongHive HTTP/JSON backend
//!
//! Serves songs, users, liked songs and playlists from a MongoDB database
//! (or an in-memory store for development), seeding empty collections from
//! a JSON snapshot at startup.

use anyhow::{Context, Result};
use clap::Parser;
use songhive_common::config::{ConfigOverrides, StoreBackend, TomlConfig, DEFAULT_CONFIG_FILE};
use songhive_common::credentials::PasswordMode;
use songhive_common::store::{MemoryStore, MongoStore};
use songhive_common::DocumentStore;
use songhive_server::seed::{seed_store, SeedData};
use songhive_server::{build_router, cors_layer, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// SongHive music library backend
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file (default: ./songhive.toml if present)
    #[arg(long, env = "SONGHIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, env = "SONGHIVE_BIND")]
    bind: Option<String>,

    /// Document store backend: mongodb or memory
    #[arg(long, env = "SONGHIVE_STORE")]
    store: Option<StoreBackend>,

    /// MongoDB connection string
    #[arg(long, env = "SONGHIVE_MONGODB_URI")]
    mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "SONGHIVE_DATABASE")]
    database: Option<String>,

    /// JSON snapshot used to fill empty collections
    #[arg(long, env = "SONGHIVE_SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// Skip seeding at startup
    #[arg(long)]
    no_seed: bool,

    /// Password storage: hashed or plaintext
    #[arg(long, env = "SONGHIVE_PASSWORD_MODE")]
    password_mode: Option<PasswordMode>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "SONGHIVE_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            store: self.store,
            mongodb_uri: self.mongodb_uri.clone(),
            database: self.database.clone(),
            seed_file: self.seed_file.clone(),
            no_seed: self.no_seed,
            password_mode: self.password_mode,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.overrides());

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting SongHive server (songhive-server) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &args.config {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Loaded configuration from {}", DEFAULT_CONFIG_FILE)
        }
        None => warn!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE),
    }
    info!(
        "Store backend: {}, password mode: {}",
        config.store.backend, config.auth.password_mode
    );

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Mongodb => {
            let store = MongoStore::connect(&config.store.mongodb_uri, &config.store.database)
                .await
                .context("Failed to connect to MongoDB")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store: data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed.enabled {
        seed(store.as_ref(), &config).await;
    } else {
        info!("Seeding disabled");
    }

    let state = AppState::new(store, config.auth.password_mode);
    let app = build_router(state).layer(cors_layer(&config.cors));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("songhive-server listening on http://{}", config.server.bind);
    info!("Health check: http://{}/health", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed empty collections; failures are logged, never fatal
async fn seed(store: &dyn DocumentStore, config: &TomlConfig) {
    let path = &config.seed.file;
    if !path.exists() {
        warn!("Seed file {} not found, skipping seeding", path.display());
        return;
    }

    let data = match SeedData::from_file(path) {
        Ok(data) => data,
        Err(e) => {
            error!("Error reading seed file {}: {}", path.display(), e);
            return;
        }
    };

    match seed_store(store, data, config.auth.password_mode).await {
        Ok(report) => info!(
            "Seeding finished: {} documents inserted",
            report.total_inserted()
        ),
        Err(e) => error!("Error initializing database: {}", e),
    }
}

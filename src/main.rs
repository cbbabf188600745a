//! Recipes: a recipe manager backed by MySQL.
//!
//! This is the application entry point. It loads configuration from a TOML file
//! and the environment, initializes tracing, makes sure the `recipes` table exists,
//! sets up the Axum router with all routes, and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recipes::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use recipes::http::start_server;
use recipes::routes::create_router;
use recipes::state::AppState;
use recipes::store::{MySqlStore, RecipeStore};
use recipes::templates::init_templates;

/// Recipes: a web interface for managing recipes
#[derive(Parser, Debug)]
#[command(name = "recipes", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "recipes=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // DB_* variables may come from a .env file during development
    let dotenv = dotenvy::dotenv();

    // Configuration decides the log format, so it is loaded before tracing
    let config = AppConfig::load_or_default(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
    tracing::info!(config = %args.config, "Loaded configuration");

    // Missing DB_USER / DB_PASSWORD / DB_NAME stop the process here
    let store = MySqlStore::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Database configuration incomplete");
    })?;

    let database = store.database_config();
    tracing::info!(
        host = %database.host,
        port = database.port,
        database = %database.name,
        user = %database.user,
        "Database configured"
    );

    store.init_schema().await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database schema");
    })?;
    tracing::info!("Ensured recipes table exists");

    let tera = init_templates(&config.theme)?;
    tracing::info!(theme = %config.theme.dir, "Initialized templates");

    let http_config = config.http.clone();
    let state = AppState::new(config, tera, Arc::new(store));
    let app = create_router(state);

    start_server(app, &http_config).await?;

    Ok(())
}

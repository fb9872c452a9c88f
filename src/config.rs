use anyhow::Result;
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::TokenIssuer;
use crate::schemas::AppState;

const DEFAULT_JWT_SECRET: &str = "dinefund-development-secret";

/// Runtime settings.
///
/// Resolved from built-in defaults, then an optional `dinefund.toml` in the
/// working directory, then environment variables (`DATABASE_URL`,
/// `BIND_ADDRESS`, `JWT_SECRET`, `TOKEN_TTL_HOURS`, `CLIENT_URL`). A `.env`
/// file is loaded into the environment first.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub client_url: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .set_default("database_url", "sqlite://dinefund.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("token_ttl_hours", 24)?
            .add_source(File::with_name("dinefund").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET is not set, using the development secret");
        }
        debug!(
            bind_address = %settings.bind_address,
            token_ttl_hours = settings.token_ttl_hours,
            "Settings loaded"
        );

        Ok(settings)
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }
}

/// Initialize application state from settings
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    // Roles never change, so entries only expire to bound memory
    let cache = Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(3600))
        .build();

    Ok(AppState {
        db,
        cache,
        tokens: TokenIssuer::new(&settings.jwt_secret, settings.token_ttl_hours),
        cors_origin: settings.client_url.clone(),
    })
}

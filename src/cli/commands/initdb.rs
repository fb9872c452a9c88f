use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, debug, trace, error};

/// Connects to `database_url` and applies every pending migration.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection> {
    trace!("Entering init_database function");
    debug!("Database URL: {}", database_url);

    let db = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    Ok(db)
}

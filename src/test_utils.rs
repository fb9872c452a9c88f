use crate::auth::TokenIssuer;
use crate::router::create_router;
use crate::schemas::AppState;
use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum::Router;
use migration::{Migrator, MigratorTrait};
use model::entities::{restaurant, user, user::UserRole};
use moka::future::Cache;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const TEST_SECRET: &str = "test-secret";

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;

    AppState {
        db,
        cache: Cache::new(100),
        tokens: TokenIssuer::new(TEST_SECRET, 1),
        cors_origin: None,
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from `RUST_LOG`, defaulting to WARN.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing, returning the state so tests can seed data
pub async fn setup_test_app() -> (Router, AppState) {
    let state = setup_test_app_state().await;
    let router = create_router(state.clone());
    (router, state)
}

/// Insert a user directly, skipping password hashing
pub async fn create_user(state: &AppState, email: &str, role: UserRole) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("unused".to_string()),
        role: Set(role),
        full_name: Set(Some(format!("{} name", email.split('@').next().unwrap_or(email)))),
        phone: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("Failed to create test user")
}

pub async fn create_restaurant(state: &AppState, owner: &user::Model, name: &str) -> restaurant::Model {
    restaurant::ActiveModel {
        owner_id: Set(owner.id),
        name: Set(name.to_string()),
        cuisine_type: Set("Italian".to_string()),
        location: Set("Chicago".to_string()),
        address: Set(None),
        description: Set("Family trattoria".to_string()),
        image_url: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("Failed to create test restaurant")
}

/// `Authorization` header carrying a fresh token for `user`
pub fn bearer(state: &AppState, user: &user::Model) -> (HeaderName, HeaderValue) {
    let token = state
        .tokens
        .issue(user.id, user.role)
        .expect("Failed to issue token");
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header value"),
    )
}

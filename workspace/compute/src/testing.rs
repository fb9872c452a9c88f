//! Database fixtures shared by the compute tests.

use std::sync::atomic::{AtomicU64, Ordering};

use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use model::entities::{
    campaign::{self, CampaignStatus},
    restaurant,
    user::{self, UserRole},
};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// File-backed database, so the pool hands out more than one connection.
pub async fn setup_file_db(path: &std::path::Path) -> Result<DatabaseConnection> {
    let db = Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await?;
    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

pub async fn new_user(db: &DatabaseConnection, role: UserRole) -> Result<user::Model> {
    static USER_ID: AtomicU64 = AtomicU64::new(0);
    let current_id = USER_ID.fetch_add(1, Ordering::SeqCst);

    user::ActiveModel {
        email: Set(format!("{role}_{current_id}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(role),
        full_name: Set(Some(format!("User {current_id}"))),
        phone: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_restaurant(
    db: &DatabaseConnection,
    owner: &user::Model,
    name: &str,
) -> Result<restaurant::Model> {
    restaurant::ActiveModel {
        owner_id: Set(owner.id),
        name: Set(name.to_string()),
        cuisine_type: Set("Italian".to_string()),
        location: Set("Brooklyn".to_string()),
        address: Set(None),
        description: Set(format!("{name} description")),
        image_url: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Campaign with the given goal and rate, already holding `current`.
pub async fn new_campaign(
    db: &DatabaseConnection,
    restaurant: &restaurant::Model,
    goal: i64,
    current: i64,
    rate: i64,
) -> Result<campaign::Model> {
    campaign::ActiveModel {
        restaurant_id: Set(restaurant.id),
        title: Set(format!("Round for {}", restaurant.name)),
        description: Set("Kitchen upgrade".to_string()),
        funding_goal: Set(Decimal::new(goal, 0)),
        current_funding: Set(Decimal::new(current, 0)),
        interest_rate: Set(Decimal::new(rate, 0)),
        duration_months: Set(12),
        status: Set(CampaignStatus::Active),
        end_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn set_status(
    db: &DatabaseConnection,
    campaign: campaign::Model,
    status: CampaignStatus,
) -> Result<campaign::Model> {
    let mut active: campaign::ActiveModel = campaign.into();
    active.status = Set(status);
    active.update(db).await
}

use model::entities::campaign::CampaignStatus;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Investment amounts must be strictly positive whole cents that fit
    /// the money columns
    #[error("Investment amount must be a positive amount in whole cents, got {0}")]
    InvalidAmount(Decimal),

    #[error("Campaign {0} not found")]
    CampaignNotFound(Uuid),

    #[error("Restaurant {0} not found")]
    RestaurantNotFound(Uuid),

    /// Campaign is funded or closed
    #[error("Campaign {campaign_id} is not accepting investments (status: {status})")]
    CampaignNotActive {
        campaign_id: Uuid,
        status: CampaignStatus,
    },

    /// Investment would push the campaign over its goal
    #[error("Investment of {requested} exceeds remaining funding needed ({remaining})")]
    ExceedsCapacity { requested: Decimal, remaining: Decimal },

    /// Campaign row changed between the read and the guarded update
    #[error("Campaign {0} was modified concurrently, retry the investment")]
    ConcurrentUpdate(Uuid),

    #[error("User {user_id} does not own restaurant {restaurant_id}")]
    NotOwner { user_id: Uuid, restaurant_id: Uuid },
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;

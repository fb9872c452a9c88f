//! Ownership checks for restaurant-owner operations.
//!
//! A campaign belongs to whoever owns its restaurant, so both checks end at
//! `restaurants.owner_id`.

use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use model::entities::{campaign, restaurant};

use crate::error::{ComputeError, Result};

/// Loads a restaurant and confirms `user_id` owns it.
#[instrument(skip(db))]
pub async fn owned_restaurant<C: ConnectionTrait>(
    db: &C,
    restaurant_id: Uuid,
    user_id: Uuid,
) -> Result<restaurant::Model> {
    let restaurant = restaurant::Entity::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or(ComputeError::RestaurantNotFound(restaurant_id))?;

    if restaurant.owner_id != user_id {
        warn!(owner_id = %restaurant.owner_id, "Restaurant is owned by someone else");
        return Err(ComputeError::NotOwner {
            user_id,
            restaurant_id,
        });
    }

    debug!("Ownership confirmed");
    Ok(restaurant)
}

/// Loads a campaign with its restaurant and confirms `user_id` owns the
/// restaurant.
#[instrument(skip(db))]
pub async fn owned_campaign<C: ConnectionTrait>(
    db: &C,
    campaign_id: Uuid,
    user_id: Uuid,
) -> Result<(campaign::Model, restaurant::Model)> {
    let (campaign, restaurant) = campaign::Entity::find_by_id(campaign_id)
        .find_also_related(restaurant::Entity)
        .one(db)
        .await?
        .ok_or(ComputeError::CampaignNotFound(campaign_id))?;

    let restaurant = restaurant.ok_or(ComputeError::RestaurantNotFound(campaign.restaurant_id))?;

    if restaurant.owner_id != user_id {
        warn!(owner_id = %restaurant.owner_id, "Campaign belongs to another owner's restaurant");
        return Err(ComputeError::NotOwner {
            user_id,
            restaurant_id: restaurant.id,
        });
    }

    debug!("Ownership confirmed");
    Ok((campaign, restaurant))
}

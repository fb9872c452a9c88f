use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::campaigns::CampaignResponse;
use crate::handlers::contains_ignore_case;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use compute::ownership::owned_restaurant;
use compute::portfolio::restaurant_rollups;
use model::entities::{campaign, restaurant, user, user::UserRole};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a restaurant
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub cuisine_type: String,
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub location: String,
    pub address: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

/// Request body for updating a restaurant. Missing fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub cuisine_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

/// Filters for the public restaurant listing
#[derive(Debug, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RestaurantQuery {
    /// Case-insensitive substring of the cuisine type
    #[validate(length(max = 100))]
    pub cuisine_type: Option<String>,
    /// Case-insensitive substring of the location
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

/// Restaurant response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub cuisine_type: String,
    pub location: String,
    pub address: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<restaurant::Model> for RestaurantResponse {
    fn from(model: restaurant::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            cuisine_type: model.cuisine_type,
            location: model.location,
            address: model.address,
            description: model.description,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Entry of the public restaurant listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantListItem {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub owner_name: Option<String>,
    pub campaign_count: u64,
}

/// Restaurant with its owner's contact and all its campaigns
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub owner_name: Option<String>,
    pub owner_email: String,
    pub campaigns: Vec<CampaignResponse>,
}

/// Restaurant as seen by its owner
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnedRestaurant {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub campaign_count: u64,
    /// Sum of current funding over all campaigns
    #[schema(value_type = String)]
    pub total_funding: Decimal,
}

/// Create a restaurant owned by the caller
#[utoipa::path(
    post,
    path = "/api/restaurants",
    tag = "restaurants",
    security(("bearer_auth" = [])),
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created successfully", body = ApiResponse<RestaurantResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a restaurant owner", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantResponse>>), ApiError> {
    trace!("Entering create_restaurant function");
    auth.require(UserRole::RestaurantOwner)?;
    request.validate()?;

    let new_restaurant = restaurant::ActiveModel {
        owner_id: Set(auth.id),
        name: Set(request.name),
        cuisine_type: Set(request.cuisine_type),
        location: Set(request.location),
        address: Set(request.address),
        description: Set(request.description),
        image_url: Set(request.image_url),
        ..Default::default()
    };

    let restaurant = new_restaurant.insert(&state.db).await?;
    info!("Restaurant created successfully with ID: {}, name: {}", restaurant.id, restaurant.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            RestaurantResponse::from(restaurant),
            "Restaurant created successfully",
        )),
    ))
}

/// List restaurants
#[utoipa::path(
    get,
    path = "/api/restaurants",
    tag = "restaurants",
    params(RestaurantQuery),
    responses(
        (status = 200, description = "Restaurants retrieved successfully", body = ApiResponse<Vec<RestaurantListItem>>),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_restaurants(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<RestaurantQuery>>,
) -> Result<Json<ApiResponse<Vec<RestaurantListItem>>>, ApiError> {
    trace!("Entering get_restaurants function");

    let mut select = restaurant::Entity::find();
    if let Some(cuisine_type) = query.cuisine_type.as_deref() {
        select = select.filter(contains_ignore_case(
            (restaurant::Entity, restaurant::Column::CuisineType),
            cuisine_type,
        ));
    }
    if let Some(location) = query.location.as_deref() {
        select = select.filter(contains_ignore_case(
            (restaurant::Entity, restaurant::Column::Location),
            location,
        ));
    }

    let rows = select
        .order_by_desc(restaurant::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = rows.iter().map(|(r, _)| r.id).collect();
    let rollups = restaurant_rollups(&state.db, &ids).await?;

    let items: Vec<RestaurantListItem> = rows
        .into_iter()
        .map(|(restaurant, owner)| RestaurantListItem {
            campaign_count: rollups.get(&restaurant.id).map_or(0, |r| r.campaign_count),
            owner_name: owner.and_then(|o| o.full_name),
            restaurant: RestaurantResponse::from(restaurant),
        })
        .collect();

    debug!("Retrieved {} restaurants", items.len());
    Ok(Json(ApiResponse::ok(
        items,
        "Restaurants retrieved successfully",
    )))
}

/// List the caller's restaurants with campaign totals
#[utoipa::path(
    get,
    path = "/api/restaurants/my/restaurants",
    tag = "restaurants",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Restaurants retrieved successfully", body = ApiResponse<Vec<OwnedRestaurant>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a restaurant owner", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_my_restaurants(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<OwnedRestaurant>>>, ApiError> {
    auth.require(UserRole::RestaurantOwner)?;

    let restaurants = restaurant::Entity::find()
        .filter(restaurant::Column::OwnerId.eq(auth.id))
        .order_by_desc(restaurant::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = restaurants.iter().map(|r| r.id).collect();
    let rollups = restaurant_rollups(&state.db, &ids).await?;

    let items: Vec<OwnedRestaurant> = restaurants
        .into_iter()
        .map(|restaurant| {
            let rollup = rollups.get(&restaurant.id).cloned().unwrap_or_default();
            OwnedRestaurant {
                restaurant: RestaurantResponse::from(restaurant),
                campaign_count: rollup.campaign_count,
                total_funding: rollup.total_funding,
            }
        })
        .collect();

    debug!("Owner {} has {} restaurants", auth.id, items.len());
    Ok(Json(ApiResponse::ok(
        items,
        "Restaurants retrieved successfully",
    )))
}

/// Get a restaurant with its owner and campaigns
#[utoipa::path(
    get,
    path = "/api/restaurants/{restaurant_id}",
    tag = "restaurants",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Restaurant retrieved successfully", body = ApiResponse<RestaurantDetail>),
        (status = 404, description = "Restaurant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RestaurantDetail>>, ApiError> {
    let (restaurant, owner) = restaurant::Entity::find_by_id(restaurant_id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

    let owner = owner.ok_or_else(|| {
        ApiError::Internal(format!("Restaurant {} has no owner row", restaurant.id))
    })?;

    let campaigns = restaurant
        .find_related(campaign::Entity)
        .order_by_desc(campaign::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let detail = RestaurantDetail {
        owner_name: owner.full_name,
        owner_email: owner.email,
        campaigns: campaigns.into_iter().map(CampaignResponse::from).collect(),
        restaurant: RestaurantResponse::from(restaurant),
    };

    Ok(Json(ApiResponse::ok(
        detail,
        "Restaurant retrieved successfully",
    )))
}

/// Update a restaurant owned by the caller
#[utoipa::path(
    put,
    path = "/api/restaurants/{restaurant_id}",
    tag = "restaurants",
    security(("bearer_auth" = [])),
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID")
    ),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated successfully", body = ApiResponse<RestaurantResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the restaurant", body = ErrorResponse),
        (status = 404, description = "Restaurant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(request): Json<UpdateRestaurantRequest>,
) -> Result<Json<ApiResponse<RestaurantResponse>>, ApiError> {
    trace!("Entering update_restaurant function");
    auth.require(UserRole::RestaurantOwner)?;
    request.validate()?;

    let restaurant = owned_restaurant(&state.db, restaurant_id, auth.id).await?;
    let mut active: restaurant::ActiveModel = restaurant.into();

    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(cuisine_type) = request.cuisine_type {
        active.cuisine_type = Set(cuisine_type);
    }
    if let Some(location) = request.location {
        active.location = Set(location);
    }
    if let Some(address) = request.address {
        active.address = Set(Some(address));
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(image_url) = request.image_url {
        active.image_url = Set(Some(image_url));
    }

    let updated = active.update(&state.db).await?;
    info!("Restaurant {} updated", updated.id);

    Ok(Json(ApiResponse::ok(
        RestaurantResponse::from(updated),
        "Restaurant updated successfully",
    )))
}

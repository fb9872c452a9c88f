use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::investments::InvestmentResponse;
use crate::handlers::restaurants::RestaurantResponse;
use crate::handlers::{contains_ignore_case, require_at_least, require_column_fit};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use common::{CampaignProgress, MONEY_PRECISION, MONEY_SCALE, RATE_PRECISION, RATE_SCALE};
use compute::ownership::{owned_campaign, owned_restaurant};
use compute::portfolio::investor_counts;
use model::entities::{
    campaign::{self, CampaignStatus},
    investment, restaurant, user,
    user::UserRole,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a campaign
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCampaignRequest {
    /// Restaurant the campaign raises money for; must be owned by the caller
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    /// At least 1, whole cents, below 10 000 000 000
    #[schema(value_type = String, example = "10000.00")]
    pub funding_goal: Decimal,
    /// Annual percent, at least 0 and below 1000, two decimal places
    #[schema(value_type = String, example = "8.5")]
    pub interest_rate: Decimal,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_months: i32,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request body for updating a campaign. Missing fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCampaignRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    /// Only `active -> closed` can be requested; `funded` is reached by investing
    pub status: Option<CampaignStatus>,
}

/// Filters for the public campaign listing
#[derive(Debug, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CampaignQuery {
    pub status: Option<CampaignStatus>,
    /// Case-insensitive substring of the restaurant's cuisine type
    #[validate(length(max = 100))]
    pub cuisine_type: Option<String>,
    /// Case-insensitive substring of the restaurant's location
    #[validate(length(max = 255))]
    pub location: Option<String>,
    /// Lower bound on the funding goal
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_funding: Option<Decimal>,
    /// Upper bound on the funding goal
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_funding: Option<Decimal>,
}

/// Campaign response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub funding_goal: Decimal,
    #[schema(value_type = String)]
    pub current_funding: Decimal,
    #[schema(value_type = String)]
    pub interest_rate: Decimal,
    pub duration_months: i32,
    pub status: CampaignStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: CampaignProgress,
}

impl From<campaign::Model> for CampaignResponse {
    fn from(model: campaign::Model) -> Self {
        Self {
            progress: CampaignProgress::new(model.current_funding, model.funding_goal),
            id: model.id,
            restaurant_id: model.restaurant_id,
            title: model.title,
            description: model.description,
            funding_goal: model.funding_goal,
            current_funding: model.current_funding,
            interest_rate: model.interest_rate,
            duration_months: model.duration_months,
            status: model.status,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// The restaurant fields shown next to a campaign in listings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantSummary {
    pub id: Uuid,
    pub name: String,
    pub cuisine_type: String,
    pub location: String,
    pub image_url: Option<String>,
}

impl From<restaurant::Model> for RestaurantSummary {
    fn from(model: restaurant::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            cuisine_type: model.cuisine_type,
            location: model.location,
            image_url: model.image_url,
        }
    }
}

/// Entry of the public campaign listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub restaurant: RestaurantSummary,
    /// Distinct investors
    pub investor_count: u64,
}

/// A campaign with its full restaurant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub restaurant: RestaurantResponse,
    /// Distinct investors
    pub investor_count: u64,
}

/// An investment in one of the caller's campaigns, with the investor's contact
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignInvestmentEntry {
    #[serde(flatten)]
    pub investment: InvestmentResponse,
    pub investor_name: Option<String>,
    pub investor_email: String,
}

/// Create a campaign for a restaurant owned by the caller
#[utoipa::path(
    post,
    path = "/api/campaigns",
    tag = "campaigns",
    security(("bearer_auth" = [])),
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the restaurant", body = ErrorResponse),
        (status = 404, description = "Restaurant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignResponse>>), ApiError> {
    trace!("Entering create_campaign function");
    auth.require(UserRole::RestaurantOwner)?;
    request.validate()?;
    require_at_least("funding_goal", request.funding_goal, Decimal::ONE)?;
    require_at_least("interest_rate", request.interest_rate, Decimal::ZERO)?;
    require_column_fit("funding_goal", request.funding_goal, MONEY_PRECISION, MONEY_SCALE)?;
    require_column_fit("interest_rate", request.interest_rate, RATE_PRECISION, RATE_SCALE)?;

    let restaurant = owned_restaurant(&state.db, request.restaurant_id, auth.id).await?;
    debug!("Creating campaign '{}' for restaurant {}", request.title, restaurant.id);

    let new_campaign = campaign::ActiveModel {
        restaurant_id: Set(restaurant.id),
        title: Set(request.title),
        description: Set(request.description),
        funding_goal: Set(request.funding_goal),
        current_funding: Set(Decimal::ZERO),
        interest_rate: Set(request.interest_rate),
        duration_months: Set(request.duration_months),
        status: Set(CampaignStatus::Active),
        end_date: Set(request.end_date),
        ..Default::default()
    };

    let campaign = new_campaign.insert(&state.db).await?;
    info!("Campaign created successfully with ID: {}", campaign.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            CampaignResponse::from(campaign),
            "Campaign created successfully",
        )),
    ))
}

/// List campaigns
#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "campaigns",
    params(CampaignQuery),
    responses(
        (status = 200, description = "Campaigns retrieved successfully", body = ApiResponse<Vec<CampaignSummary>>),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_campaigns(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<CampaignQuery>>,
) -> Result<Json<ApiResponse<Vec<CampaignSummary>>>, ApiError> {
    trace!("Entering get_campaigns function");

    let mut select = campaign::Entity::find().find_also_related(restaurant::Entity);

    if let Some(status) = query.status {
        select = select.filter(campaign::Column::Status.eq(status));
    }
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
    if let Some(min_funding) = query.min_funding {
        select = select.filter(campaign::Column::FundingGoal.gte(min_funding));
    }
    if let Some(max_funding) = query.max_funding {
        select = select.filter(campaign::Column::FundingGoal.lte(max_funding));
    }

    let rows = select
        .order_by_desc(campaign::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = rows.iter().map(|(c, _)| c.id).collect();
    let counts = investor_counts(&state.db, &ids).await?;

    let mut items = Vec::with_capacity(rows.len());
    for (campaign, restaurant) in rows {
        let Some(restaurant) = restaurant else {
            warn!("Campaign {} has no restaurant row, skipping", campaign.id);
            continue;
        };
        items.push(CampaignSummary {
            investor_count: counts.get(&campaign.id).copied().unwrap_or(0),
            campaign: CampaignResponse::from(campaign),
            restaurant: RestaurantSummary::from(restaurant),
        });
    }

    debug!("Retrieved {} campaigns", items.len());
    Ok(Json(ApiResponse::ok(
        items,
        "Campaigns retrieved successfully",
    )))
}

/// Get a campaign with its restaurant and investor count
#[utoipa::path(
    get,
    path = "/api/campaigns/{campaign_id}",
    tag = "campaigns",
    params(
        ("campaign_id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Campaign retrieved successfully", body = ApiResponse<CampaignDetail>),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CampaignDetail>>, ApiError> {
    let (campaign, restaurant) = campaign::Entity::find_by_id(campaign_id)
        .find_also_related(restaurant::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Campaign not found".to_string()))?;

    let restaurant = restaurant.ok_or_else(|| {
        ApiError::Internal(format!("Campaign {} has no restaurant row", campaign.id))
    })?;

    let counts = investor_counts(&state.db, &[campaign.id]).await?;

    let detail = CampaignDetail {
        investor_count: counts.get(&campaign.id).copied().unwrap_or(0),
        campaign: CampaignResponse::from(campaign),
        restaurant: RestaurantResponse::from(restaurant),
    };

    Ok(Json(ApiResponse::ok(
        detail,
        "Campaign retrieved successfully",
    )))
}

/// Update a campaign of a restaurant owned by the caller
#[utoipa::path(
    put,
    path = "/api/campaigns/{campaign_id}",
    tag = "campaigns",
    security(("bearer_auth" = [])),
    params(
        ("campaign_id" = Uuid, Path, description = "Campaign ID")
    ),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "Campaign updated successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Invalid request or status transition", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the campaign", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<UpdateCampaignRequest>,
) -> Result<Json<ApiResponse<CampaignResponse>>, ApiError> {
    trace!("Entering update_campaign function");
    auth.require(UserRole::RestaurantOwner)?;
    request.validate()?;

    let (campaign, _) = owned_campaign(&state.db, campaign_id, auth.id).await?;

    if let Some(next) = request.status {
        check_requested_status(campaign.status, next)?;
    }

    let mut active: campaign::ActiveModel = campaign.into();
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(end_date) = request.end_date {
        active.end_date = Set(Some(end_date));
    }

    let updated = match request.status {
        Some(next) => {
            active.status = Set(next);
            active.updated_at = Set(Utc::now());
            // Funding may have moved the status since it was read
            let guarded = campaign::Entity::update(active)
                .filter(campaign::Column::Status.eq(current_status_for(next)))
                .exec(&state.db)
                .await;
            match guarded {
                Ok(model) => model,
                Err(sea_orm::DbErr::RecordNotUpdated) => {
                    warn!("Campaign {} changed status concurrently", campaign_id);
                    return Err(ApiError::ConcurrentUpdate(
                        "Campaign status changed, please reload".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => active.update(&state.db).await?,
    };

    info!("Campaign {} updated (status: {})", updated.id, updated.status);
    Ok(Json(ApiResponse::ok(
        CampaignResponse::from(updated),
        "Campaign updated successfully",
    )))
}

/// Owners may keep a campaign's status or close an active one. `funded` is
/// only ever set by the funding transaction.
fn check_requested_status(current: CampaignStatus, next: CampaignStatus) -> Result<(), ApiError> {
    if current.is_terminal() && next != current {
        return Err(ApiError::InvalidStatusTransition(format!(
            "Campaign is {current} and can no longer change status"
        )));
    }
    if next == CampaignStatus::Funded && current != CampaignStatus::Funded {
        return Err(ApiError::InvalidStatusTransition(
            "A campaign becomes funded only by reaching its goal".to_string(),
        ));
    }
    if !current.can_transition_to(next) {
        return Err(ApiError::InvalidStatusTransition(format!(
            "Cannot change campaign status from {current} to {next}"
        )));
    }
    Ok(())
}

/// Status the row must still have for a requested status change to apply.
fn current_status_for(next: CampaignStatus) -> CampaignStatus {
    match next {
        CampaignStatus::Closed => CampaignStatus::Active,
        same => same,
    }
}

/// List investments in a campaign owned by the caller
#[utoipa::path(
    get,
    path = "/api/campaigns/{campaign_id}/investments",
    tag = "campaigns",
    security(("bearer_auth" = [])),
    params(
        ("campaign_id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Investments retrieved successfully", body = ApiResponse<Vec<CampaignInvestmentEntry>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the campaign", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_campaign_investments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CampaignInvestmentEntry>>>, ApiError> {
    auth.require(UserRole::RestaurantOwner)?;
    let (campaign, _) = owned_campaign(&state.db, campaign_id, auth.id).await?;

    let rows = investment::Entity::find()
        .filter(investment::Column::CampaignId.eq(campaign.id))
        .order_by_desc(investment::Column::InvestmentDate)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let entries: Vec<CampaignInvestmentEntry> = rows
        .into_iter()
        .filter_map(|(investment, investor)| {
            let investor = investor?;
            Some(CampaignInvestmentEntry {
                investment: InvestmentResponse::from(investment),
                investor_name: investor.full_name,
                investor_email: investor.email,
            })
        })
        .collect();

    debug!("Campaign {} has {} investments", campaign.id, entries.len());
    Ok(Json(ApiResponse::ok(
        entries,
        "Investments retrieved successfully",
    )))
}

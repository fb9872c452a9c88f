use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::campaigns::CampaignResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use compute::portfolio::{self, Holding, InvestorStats, PortfolioSummary};
use model::entities::{
    campaign::CampaignStatus,
    investment::{self, InvestmentStatus},
    user::UserRole,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request body for investing in a campaign
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateInvestmentRequest {
    pub campaign_id: Uuid,
    /// Greater than zero in whole cents, and at most the campaign's remaining need
    #[schema(value_type = String, example = "250.00")]
    pub amount: Decimal,
}

/// Investment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvestmentResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub investor_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub status: InvestmentStatus,
    pub investment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<investment::Model> for InvestmentResponse {
    fn from(model: investment::Model) -> Self {
        Self {
            id: model.id,
            campaign_id: model.campaign_id,
            investor_id: model.investor_id,
            amount: model.amount,
            status: model.status,
            investment_date: model.investment_date,
            created_at: model.created_at,
        }
    }
}

/// Accepted investment and the campaign after funding
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvestmentReceipt {
    pub investment: InvestmentResponse,
    pub campaign: CampaignResponse,
}

/// One line of an investor's portfolio
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortfolioEntry {
    #[serde(flatten)]
    pub investment: InvestmentResponse,
    pub campaign_title: String,
    pub campaign_status: CampaignStatus,
    #[schema(value_type = String)]
    pub interest_rate: Decimal,
    pub duration_months: i32,
    #[schema(value_type = String)]
    pub funding_goal: Decimal,
    #[schema(value_type = String)]
    pub current_funding: Decimal,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub cuisine_type: String,
    pub location: String,
    /// Amount plus promised interest
    #[schema(value_type = String)]
    pub projected_return: Decimal,
}

impl From<Holding> for PortfolioEntry {
    fn from(holding: Holding) -> Self {
        let projected_return = holding.projected_return();
        let Holding {
            investment,
            campaign,
            restaurant,
        } = holding;

        Self {
            investment: InvestmentResponse::from(investment),
            campaign_title: campaign.title,
            campaign_status: campaign.status,
            interest_rate: campaign.interest_rate,
            duration_months: campaign.duration_months,
            funding_goal: campaign.funding_goal,
            current_funding: campaign.current_funding,
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name,
            cuisine_type: restaurant.cuisine_type,
            location: restaurant.location,
            projected_return,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSummaryResponse {
    pub total_investments: u64,
    #[schema(value_type = String)]
    pub total_invested: Decimal,
    #[schema(value_type = String)]
    pub potential_returns: Decimal,
}

impl From<PortfolioSummary> for PortfolioSummaryResponse {
    fn from(summary: PortfolioSummary) -> Self {
        Self {
            total_investments: summary.total_investments,
            total_invested: summary.total_invested,
            potential_returns: summary.potential_returns,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortfolioResponse {
    pub investments: Vec<PortfolioEntry>,
    pub summary: PortfolioSummaryResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvestorStatsResponse {
    /// Distinct campaigns backed
    pub campaigns_invested: u64,
    pub total_investments: u64,
    #[schema(value_type = String)]
    pub total_invested: Decimal,
    /// Mean over investments, in percent
    #[schema(value_type = String)]
    pub avg_interest_rate: Decimal,
    /// Investments in campaigns that reached their goal
    pub successful_campaigns: u64,
    /// Investments in campaigns still raising
    pub active_campaigns: u64,
}

impl From<InvestorStats> for InvestorStatsResponse {
    fn from(stats: InvestorStats) -> Self {
        Self {
            campaigns_invested: stats.campaigns_invested,
            total_investments: stats.total_investments,
            total_invested: stats.total_invested,
            avg_interest_rate: stats.avg_interest_rate,
            successful_campaigns: stats.successful_campaigns,
            active_campaigns: stats.active_campaigns,
        }
    }
}

/// Invest in an active campaign
#[utoipa::path(
    post,
    path = "/api/investments",
    tag = "investments",
    security(("bearer_auth" = [])),
    request_body = CreateInvestmentRequest,
    responses(
        (status = 201, description = "Investment recorded", body = ApiResponse<InvestmentReceipt>),
        (status = 400, description = "Amount is not positive", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an investor", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 409, description = "Campaign not active, over capacity, or modified concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateInvestmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InvestmentReceipt>>), ApiError> {
    trace!("Entering create_investment function");
    auth.require(UserRole::Investor)?;

    let outcome = compute::invest(&state.db, request.campaign_id, auth.id, request.amount).await?;
    info!(
        "Investor {} put {} into campaign {}",
        auth.id, outcome.investment.amount, outcome.campaign.id
    );

    let receipt = InvestmentReceipt {
        investment: InvestmentResponse::from(outcome.investment),
        campaign: CampaignResponse::from(outcome.campaign),
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(receipt, "Investment successful")),
    ))
}

/// The caller's investments with projected returns
#[utoipa::path(
    get,
    path = "/api/investments/my-investments",
    tag = "investments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Portfolio retrieved successfully", body = ApiResponse<PortfolioResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an investor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_my_investments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<PortfolioResponse>>, ApiError> {
    auth.require(UserRole::Investor)?;

    let holdings = portfolio::investor_holdings(&state.db, auth.id).await?;
    let summary = portfolio::summarize(&holdings);
    debug!("Investor {} holds {} investments", auth.id, holdings.len());

    let response = PortfolioResponse {
        investments: holdings.into_iter().map(PortfolioEntry::from).collect(),
        summary: PortfolioSummaryResponse::from(summary),
    };
    Ok(Json(ApiResponse::ok(
        response,
        "Investments retrieved successfully",
    )))
}

/// Aggregate statistics over the caller's investments
#[utoipa::path(
    get,
    path = "/api/investments/stats",
    tag = "investments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<InvestorStatsResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an investor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_investor_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<InvestorStatsResponse>>, ApiError> {
    auth.require(UserRole::Investor)?;

    let holdings = portfolio::investor_holdings(&state.db, auth.id).await?;
    let stats = portfolio::investor_stats(&holdings);

    Ok(Json(ApiResponse::ok(
        InvestorStatsResponse::from(stats),
        "Statistics retrieved successfully",
    )))
}

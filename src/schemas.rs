use model::entities::{
    campaign::CampaignStatus,
    investment::InvestmentStatus,
    user::UserRole,
};
use moka::future::Cache;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::handlers::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    campaigns::{
        CampaignDetail, CampaignInvestmentEntry, CampaignQuery, CampaignResponse, CampaignSummary,
        CreateCampaignRequest, RestaurantSummary, UpdateCampaignRequest,
    },
    investments::{
        CreateInvestmentRequest, InvestmentReceipt, InvestmentResponse, InvestorStatsResponse,
        PortfolioEntry, PortfolioResponse, PortfolioSummaryResponse,
    },
    restaurants::{
        CreateRestaurantRequest, OwnedRestaurant, RestaurantDetail, RestaurantListItem,
        RestaurantQuery, RestaurantResponse, UpdateRestaurantRequest,
    },
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// User roles by id, filled by the auth extractor
    pub cache: Cache<Uuid, UserRole>,
    /// Token signer and verifier
    pub tokens: TokenIssuer,
    /// Allowed CORS origin, any when unset
    pub cors_origin: Option<String>,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Funding still needed, only set for `FUNDING_CAPACITY_EXCEEDED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub remaining: Option<Decimal>,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::restaurants::create_restaurant,
        crate::handlers::restaurants::get_restaurants,
        crate::handlers::restaurants::get_my_restaurants,
        crate::handlers::restaurants::get_restaurant,
        crate::handlers::restaurants::update_restaurant,
        crate::handlers::campaigns::create_campaign,
        crate::handlers::campaigns::get_campaigns,
        crate::handlers::campaigns::get_campaign,
        crate::handlers::campaigns::update_campaign,
        crate::handlers::campaigns::get_campaign_investments,
        crate::handlers::investments::create_investment,
        crate::handlers::investments::get_my_investments,
        crate::handlers::investments::get_investor_stats,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            UserRole,
            CampaignStatus,
            InvestmentStatus,
            common::CampaignProgress,
            RegisterRequest,
            LoginRequest,
            UserResponse,
            AuthResponse,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            RestaurantQuery,
            RestaurantResponse,
            RestaurantListItem,
            RestaurantDetail,
            OwnedRestaurant,
            CreateCampaignRequest,
            UpdateCampaignRequest,
            CampaignQuery,
            CampaignResponse,
            RestaurantSummary,
            CampaignSummary,
            CampaignDetail,
            CampaignInvestmentEntry,
            CreateInvestmentRequest,
            InvestmentResponse,
            InvestmentReceipt,
            PortfolioEntry,
            PortfolioSummaryResponse,
            PortfolioResponse,
            InvestorStatsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and the current user"),
        (name = "restaurants", description = "Restaurant listings and owner management"),
        (name = "campaigns", description = "Funding campaigns"),
        (name = "investments", description = "Investing and investor portfolios"),
    ),
    info(
        title = "DineFund API",
        description = "Restaurant crowdfunding marketplace connecting restaurant owners with investors",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

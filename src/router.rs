use crate::handlers::{
    auth::{login, me, register},
    campaigns::{
        create_campaign, get_campaign, get_campaign_investments, get_campaigns, update_campaign,
    },
    health::health_check,
    investments::{create_investment, get_investor_stats, get_my_investments},
    restaurants::{
        create_restaurant, get_my_restaurants, get_restaurant, get_restaurants, update_restaurant,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Restrict CORS to the configured client origin, or allow any origin
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(e)) => {
            warn!("Ignoring invalid CLIENT_URL: {}", e);
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin.as_deref());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        // Restaurants
        .route("/api/restaurants", post(create_restaurant).get(get_restaurants))
        .route("/api/restaurants/my/restaurants", get(get_my_restaurants))
        .route(
            "/api/restaurants/:restaurant_id",
            get(get_restaurant).put(update_restaurant),
        )
        // Campaigns
        .route("/api/campaigns", post(create_campaign).get(get_campaigns))
        .route(
            "/api/campaigns/:campaign_id",
            get(get_campaign).put(update_campaign),
        )
        .route(
            "/api/campaigns/:campaign_id/investments",
            get(get_campaign_investments),
        )
        // Investments
        .route("/api/investments", post(create_investment))
        .route("/api/investments/my-investments", get(get_my_investments))
        .route("/api/investments/stats", get(get_investor_stats))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(cors),
        )
        .with_state(state)
}

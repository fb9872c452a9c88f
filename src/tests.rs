use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::test_utils::{bearer, create_restaurant, create_user, init_test_tracing, setup_test_app};
use axum::http::StatusCode;
use axum_test::TestServer;
use model::entities::{campaign, restaurant, user, user::UserRole};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

async fn server() -> (TestServer, AppState) {
    let (app, state) = setup_test_app().await;
    (TestServer::new(app).unwrap(), state)
}

fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal should be a string")).unwrap()
}

/// Creates a campaign through the API and returns its id
async fn post_campaign(
    server: &TestServer,
    state: &AppState,
    owner: &user::Model,
    restaurant: &restaurant::Model,
    goal: &str,
    rate: &str,
) -> Uuid {
    let (name, value) = bearer(state, owner);
    let response = server
        .post("/api/campaigns")
        .add_header(name, value)
        .json(&json!({
            "restaurant_id": restaurant.id,
            "title": "Wood-fired oven",
            "description": "A new oven for the back kitchen",
            "funding_goal": goal,
            "interest_rate": rate,
            "duration_months": 12
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    Uuid::parse_str(body.data["id"].as_str().unwrap()).unwrap()
}

async fn post_investment(
    server: &TestServer,
    state: &AppState,
    investor: &user::Model,
    campaign_id: Uuid,
    amount: &str,
) -> axum_test::TestResponse {
    let (name, value) = bearer(state, investor);
    server
        .post("/api/investments")
        .add_header(name, value)
        .json(&json!({ "campaign_id": campaign_id, "amount": amount }))
        .await
}

#[tokio::test]
async fn test_health_check() {
    let _guard = init_test_tracing();
    let (server, _) = server().await;

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let (server, _) = server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "Chef@Example.com",
            "password": "secret1",
            "role": "restaurant_owner",
            "full_name": "Chef Boyardee"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    assert!(body.success);
    assert_eq!(body.data["user"]["email"], "chef@example.com");
    assert_eq!(body.data["user"]["role"], "restaurant_owner");
    assert!(body.data["user"].get("password_hash").is_none());

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "chef@example.com", "password": "secret1" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    let token = body.data["token"].as_str().unwrap().to_string();

    let response = server
        .get("/api/auth/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["full_name"], "Chef Boyardee");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_short_passwords() {
    let (server, _) = server().await;
    let request = json!({
        "email": "dup@example.com",
        "password": "secret1",
        "role": "investor"
    });

    server
        .post("/api/auth/register")
        .json(&request)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/api/auth/register").json(&request).await;
    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "EMAIL_TAKEN");
    assert!(!error.success);

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "short@example.com", "password": "12345", "role": "investor" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (server, _) = server().await;
    server
        .post("/api/auth/register")
        .json(&json!({ "email": "who@example.com", "password": "right-one", "role": "investor" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "who@example.com", "password": "wrong-one" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let (server, _) = server().await;

    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "UNAUTHORIZED");

    let response = server
        .get("/api/investments/my-investments")
        .add_header(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer not-a-token"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_creates_restaurant_and_investor_cannot() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let investor = create_user(&state, "investor@example.com", UserRole::Investor).await;
    let request = json!({
        "name": "Sushi Zen",
        "cuisine_type": "Japanese",
        "location": "Seattle",
        "description": "Omakase counter"
    });

    let (name, value) = bearer(&state, &owner);
    let response = server
        .post("/api/restaurants")
        .add_header(name, value)
        .json(&request)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["owner_id"], owner.id.to_string());
    assert_eq!(body.message, "Restaurant created successfully");

    let (name, value) = bearer(&state, &investor);
    let response = server
        .post("/api/restaurants")
        .add_header(name, value)
        .json(&request)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "FORBIDDEN");

    let (name, value) = bearer(&state, &owner);
    let response = server
        .post("/api/restaurants")
        .add_header(name, value)
        .json(&json!({ "name": "", "cuisine_type": "Thai", "location": "Austin", "description": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_restaurant_listing_filters_and_detail() {
    let (server, state) = server().await;
    let owner = create_user(&state, "mario@example.com", UserRole::RestaurantOwner).await;
    let trattoria = create_restaurant(&state, &owner, "Trattoria").await;
    create_restaurant(&state, &owner, "Pizzeria").await;
    post_campaign(&server, &state, &owner, &trattoria, "5000", "7").await;

    let response = server.get("/api/restaurants").await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 2);

    let response = server
        .get("/api/restaurants")
        .add_query_param("location", "CHIC")
        .add_query_param("cuisine_type", "ital")
        .await;
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 2);

    let response = server
        .get("/api/restaurants")
        .add_query_param("cuisine_type", "thai")
        .await;
    let body: ApiResponse<Vec<Value>> = response.json();
    assert!(body.data.is_empty());

    let response = server.get(&format!("/api/restaurants/{}", trattoria.id)).await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["name"], "Trattoria");
    assert_eq!(body.data["owner_email"], "mario@example.com");
    assert_eq!(body.data["campaigns"].as_array().unwrap().len(), 1);

    let response = server.get(&format!("/api/restaurants/{}", Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_owner_cannot_update_restaurant() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let rival = create_user(&state, "rival@example.com", UserRole::RestaurantOwner).await;
    let restaurant = create_restaurant(&state, &owner, "Original Name").await;

    let (name, value) = bearer(&state, &rival);
    let response = server
        .put(&format!("/api/restaurants/{}", restaurant.id))
        .add_header(name, value)
        .json(&json!({ "name": "Hijacked" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let stored = restaurant::Entity::find_by_id(restaurant.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Original Name");
    assert_eq!(stored.updated_at, restaurant.updated_at);

    // The owner's partial update keeps the other fields
    let (name, value) = bearer(&state, &owner);
    let response = server
        .put(&format!("/api/restaurants/{}", restaurant.id))
        .add_header(name, value)
        .json(&json!({ "name": "New Name" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["name"], "New Name");
    assert_eq!(body.data["cuisine_type"], "Italian");
}

#[tokio::test]
async fn test_campaign_creation_rules() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let rival = create_user(&state, "rival@example.com", UserRole::RestaurantOwner).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;

    let base = json!({
        "restaurant_id": restaurant.id,
        "title": "Patio",
        "description": "Outdoor seating",
        "funding_goal": "0",
        "interest_rate": "5",
        "duration_months": 6
    });

    let (name, value) = bearer(&state, &owner);
    let response = server
        .post("/api/campaigns")
        .add_header(name, value)
        .json(&base)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let mut zero_months = base.clone();
    zero_months["funding_goal"] = json!("1000");
    zero_months["duration_months"] = json!(0);
    let (name, value) = bearer(&state, &owner);
    server
        .post("/api/campaigns")
        .add_header(name, value)
        .json(&zero_months)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Values the money and rate columns cannot store exactly
    for (field, bad) in [
        ("funding_goal", "10000000000"),
        ("funding_goal", "1000.005"),
        ("interest_rate", "1000"),
        ("interest_rate", "8.125"),
    ] {
        let mut request = base.clone();
        request["funding_goal"] = json!("1000");
        request[field] = json!(bad);
        let (name, value) = bearer(&state, &owner);
        let response = server
            .post("/api/campaigns")
            .add_header(name, value)
            .json(&request)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.error.starts_with(field));
    }

    let mut valid = base.clone();
    valid["funding_goal"] = json!("1000");
    let (name, value) = bearer(&state, &rival);
    server
        .post("/api/campaigns")
        .add_header(name, value)
        .json(&valid)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = bearer(&state, &owner);
    let response = server
        .post("/api/campaigns")
        .add_header(name, value)
        .json(&valid)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["status"], "active");
    assert_eq!(dec(&body.data["current_funding"]), Decimal::ZERO);
    assert_eq!(dec(&body.data["progress"]["funding_percentage"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_investment_capacity_and_funding() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let investor = create_user(&state, "investor@example.com", UserRole::Investor).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let campaign_id = post_campaign(&server, &state, &owner, &restaurant, "1000", "8").await;

    post_investment(&server, &state, &investor, campaign_id, "900")
        .await
        .assert_status(StatusCode::CREATED);

    // Over the remaining 100
    let response = post_investment(&server, &state, &investor, campaign_id, "150").await;
    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "FUNDING_CAPACITY_EXCEEDED");
    assert_eq!(error.remaining, Some(Decimal::new(100, 0)));

    let stored = campaign::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_funding, Decimal::new(900, 0));

    let response = post_investment(&server, &state, &investor, campaign_id, "100").await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["campaign"]["status"], "funded");
    assert_eq!(dec(&body.data["campaign"]["current_funding"]), Decimal::new(1000, 0));
    assert_eq!(dec(&body.data["campaign"]["progress"]["funding_percentage"]), Decimal::new(100, 0));
    assert_eq!(body.data["investment"]["status"], "completed");

    let response = post_investment(&server, &state, &investor, campaign_id, "1").await;
    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "CAMPAIGN_NOT_ACTIVE");
}

#[tokio::test]
async fn test_investment_rejections() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let investor = create_user(&state, "investor@example.com", UserRole::Investor).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let campaign_id = post_campaign(&server, &state, &owner, &restaurant, "1000", "8").await;

    let response = post_investment(&server, &state, &investor, campaign_id, "0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "VALIDATION_ERROR");

    // Sub-cent and out-of-range amounts never reach the store
    for amount in ["0.005", "79228162514264337593543950335"] {
        let response = post_investment(&server, &state, &investor, campaign_id, amount).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    post_investment(&server, &state, &investor, Uuid::new_v4(), "10")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Owners do not invest
    post_investment(&server, &state, &owner, campaign_id, "10")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let stored = campaign::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_funding, Decimal::ZERO);
}

#[tokio::test]
async fn test_campaign_status_updates() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let rival = create_user(&state, "rival@example.com", UserRole::RestaurantOwner).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let campaign_id = post_campaign(&server, &state, &owner, &restaurant, "1000", "8").await;
    let path = format!("/api/campaigns/{campaign_id}");

    let (name, value) = bearer(&state, &rival);
    server
        .put(&path)
        .add_header(name, value)
        .json(&json!({ "title": "Stolen", "status": "closed" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = bearer(&state, &owner);
    let response = server
        .put(&path)
        .add_header(name, value)
        .json(&json!({ "status": "funded" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "INVALID_STATUS_TRANSITION");

    let stored = campaign::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Wood-fired oven");
    assert_eq!(stored.status, campaign::CampaignStatus::Active);

    let (name, value) = bearer(&state, &owner);
    let response = server
        .put(&path)
        .add_header(name, value)
        .json(&json!({ "title": "Oven, closed early", "status": "closed" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["status"], "closed");
    assert_eq!(body.data["title"], "Oven, closed early");

    let (name, value) = bearer(&state, &owner);
    server
        .put(&path)
        .add_header(name, value)
        .json(&json!({ "status": "active" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_campaign_listing_and_investor_counts() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let alice = create_user(&state, "alice@example.com", UserRole::Investor).await;
    let bob = create_user(&state, "bob@example.com", UserRole::Investor).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let small = post_campaign(&server, &state, &owner, &restaurant, "500", "5").await;
    let large = post_campaign(&server, &state, &owner, &restaurant, "50000", "9").await;

    post_investment(&server, &state, &alice, large, "100").await.assert_status(StatusCode::CREATED);
    post_investment(&server, &state, &alice, large, "200").await.assert_status(StatusCode::CREATED);
    post_investment(&server, &state, &bob, large, "300").await.assert_status(StatusCode::CREATED);
    post_investment(&server, &state, &bob, small, "500").await.assert_status(StatusCode::CREATED);

    let response = server
        .get("/api/campaigns")
        .add_query_param("status", "active")
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 1);
    assert_eq!(body.data[0]["id"], large.to_string());
    assert_eq!(body.data[0]["investor_count"], 2);
    assert_eq!(body.data[0]["restaurant"]["name"], "Bistro");

    let response = server
        .get("/api/campaigns")
        .add_query_param("max_funding", "1000")
        .await;
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 1);
    assert_eq!(body.data[0]["id"], small.to_string());
    assert_eq!(body.data[0]["status"], "funded");

    let response = server
        .get("/api/campaigns")
        .add_query_param("min_funding", "1000")
        .add_query_param("location", "chicago")
        .await;
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 1);

    let response = server.get(&format!("/api/campaigns/{large}")).await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["investor_count"], 2);
    assert_eq!(dec(&body.data["current_funding"]), Decimal::new(600, 0));
    assert_eq!(body.data["restaurant"]["owner_id"], owner.id.to_string());
}

#[tokio::test]
async fn test_campaign_investments_are_owner_only() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let rival = create_user(&state, "rival@example.com", UserRole::RestaurantOwner).await;
    let investor = create_user(&state, "backer@example.com", UserRole::Investor).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let campaign_id = post_campaign(&server, &state, &owner, &restaurant, "1000", "8").await;
    post_investment(&server, &state, &investor, campaign_id, "250")
        .await
        .assert_status(StatusCode::CREATED);

    let path = format!("/api/campaigns/{campaign_id}/investments");

    let (name, value) = bearer(&state, &owner);
    let response = server.get(&path).add_header(name, value).await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 1);
    assert_eq!(body.data[0]["investor_email"], "backer@example.com");
    assert_eq!(dec(&body.data[0]["amount"]), Decimal::new(250, 0));

    let (name, value) = bearer(&state, &rival);
    server
        .get(&path)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_portfolio_and_stats() {
    let (server, state) = server().await;
    let owner = create_user(&state, "owner@example.com", UserRole::RestaurantOwner).await;
    let investor = create_user(&state, "investor@example.com", UserRole::Investor).await;
    let restaurant = create_restaurant(&state, &owner, "Bistro").await;
    let ten = post_campaign(&server, &state, &owner, &restaurant, "1000", "10").await;
    let five = post_campaign(&server, &state, &owner, &restaurant, "200", "5").await;

    post_investment(&server, &state, &investor, ten, "400").await.assert_status(StatusCode::CREATED);
    post_investment(&server, &state, &investor, five, "200").await.assert_status(StatusCode::CREATED);

    let (name, value) = bearer(&state, &investor);
    let response = server
        .get("/api/investments/my-investments")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    let investments = body.data["investments"].as_array().unwrap();
    assert_eq!(investments.len(), 2);
    assert!(investments.iter().all(|i| i["restaurant_name"] == "Bistro"));
    assert_eq!(body.data["summary"]["total_investments"], 2);
    assert_eq!(dec(&body.data["summary"]["total_invested"]), Decimal::new(600, 0));
    assert_eq!(dec(&body.data["summary"]["potential_returns"]), Decimal::new(650, 0));

    let (name, value) = bearer(&state, &investor);
    let response = server
        .get("/api/investments/stats")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["campaigns_invested"], 2);
    assert_eq!(body.data["successful_campaigns"], 1);
    assert_eq!(body.data["active_campaigns"], 1);
    assert_eq!(dec(&body.data["avg_interest_rate"]), Decimal::new(75, 1));

    // Owners see their restaurants with totals
    let (name, value) = bearer(&state, &owner);
    let response = server
        .get("/api/restaurants/my/restaurants")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Vec<Value>> = response.json();
    assert_eq!(body.data.len(), 1);
    assert_eq!(body.data[0]["campaign_count"], 2);
    assert_eq!(dec(&body.data[0]["total_funding"]), Decimal::new(600, 0));

    // And investors are not owners
    let (name, value) = bearer(&state, &investor);
    server
        .get("/api/restaurants/my/restaurants")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

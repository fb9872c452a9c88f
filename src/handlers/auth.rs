use crate::auth::{AuthUser, hash_password, verify_password};
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// At least 6 characters
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    /// Fixed at registration
    pub role: UserRole,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            full_name: model.full_name,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub user: UserResponse,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new restaurant owner or investor
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    trace!("Entering register function");
    request.validate()?;

    let email = normalize_email(&request.email);
    debug!("Registering {} as {}", email, request.role);

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        warn!("Registration rejected, email already in use");
        return Err(ApiError::EmailTaken);
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {e}")))??;

    let new_user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(request.role),
        full_name: Set(request.full_name),
        phone: Set(request.phone),
        ..Default::default()
    };

    // A concurrent registration can still win the unique index
    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::EmailTaken,
        _ => ApiError::Database(e),
    })?;

    state.cache.insert(user.id, user.role).await;
    let token = state.tokens.issue(user.id, user.role)?;
    info!("User registered with ID: {}", user.id);

    let response = ApiResponse::ok(
        AuthResponse {
            token,
            user: UserResponse::from(user),
        },
        "User registered successfully",
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for a token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    trace!("Entering login function");
    request.validate()?;

    let email = normalize_email(&request.email);
    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?
    else {
        warn!("Login failed, unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let password = request.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password verification task failed: {e}")))?;
    if !valid {
        warn!("Login failed for user {}", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;
    info!("User {} logged in", user.id);

    Ok(Json(ApiResponse::ok(
        AuthResponse {
            token,
            user: UserResponse::from(user),
        },
        "Login successful",
    )))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = user::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "User retrieved successfully",
    )))
}

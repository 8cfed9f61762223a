use axum::{
    extract::{Form, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, SignupRequest, TokenResponse};
use crate::schemas::user::UserResponse;
use crate::services::FieldErrors;

/// Max attempts per window for auth endpoints (login/signup/token).
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
struct OAuth2PasswordForm {
    username: String,
    password: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/me", get(me))
}

async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.full_name = payload.full_name.trim().to_string();

    let mut errors = match payload.validate() {
        Ok(()) => FieldErrors::default(),
        Err(validation_errors) => FieldErrors::from(validation_errors),
    };
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        );
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    enforce_rate_limit(&state, "signup", &payload.email).await?;

    let exists = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if exists {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &payload.email,
            full_name: &payload.full_name,
            hashed_password,
            is_active: true,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if crate::db::is_unique_violation(&e) {
            ApiError::Conflict("User with this email already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    enforce_rate_limit(&state, "login", &payload.email).await?;
    let user = authenticate(&state, &payload.email, &payload.password).await?;
    Ok(Json(issue_token(&state, user)?))
}

async fn token(
    State(state): State<AppState>,
    Form(payload): Form<OAuth2PasswordForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    enforce_rate_limit(&state, "token", &payload.username).await?;
    let user = authenticate(&state, &payload.username, &payload.password).await?;
    Ok(Json(issue_token(&state, user)?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn enforce_rate_limit(state: &AppState, action: &str, email: &str) -> Result<(), ApiError> {
    let rate_key = format!("rl:{action}:{}", email.trim().to_lowercase());
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);

    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests("Too many attempts, try again later"))
    }
}

async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, ApiError> {
    let user = repositories::users::find_by_email(state.db(), email.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    let verified = security::verify_password(password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;
    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    Ok(user)
}

fn issue_token(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let access_token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    })
}

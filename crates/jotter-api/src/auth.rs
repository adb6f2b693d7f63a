use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use jotter_db::models::UserRow;
use jotter_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserResponse};

use crate::error::ApiError;
use crate::non_empty;
use crate::state::{AppState, blocking};

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(full_name), Some(email), Some(password)) = (
        non_empty(req.full_name),
        non_empty(req.email),
        non_empty(req.password),
    ) else {
        return Err(ApiError::MissingField(
            "Full Name, Email, and Password are required.",
        ));
    };

    let row = UserRow {
        id: Uuid::new_v4().to_string(),
        full_name,
        email,
        password,
        created_at: Utc::now().to_rfc3339(),
    };

    // The email uniqueness check happens inside the insert.
    let db = state.clone();
    let (created, row) = blocking(move || {
        let created = db.db.create_user(&row)?;
        Ok((created, row))
    })
    .await?;

    if !created {
        return Err(ApiError::DuplicateEmail);
    }

    let user = row.into_user();
    let access_token = state.tokens.issue(&user)?;
    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            error: false,
            message: "Registration successful.".to_string(),
            user,
            access_token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(ApiError::MissingField("Email and Password are required."));
    };

    let db = state.clone();
    let row = blocking(move || db.db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::UserNotFound("User not found. Please register first."))?;

    if row.password != password {
        warn!("Failed login for user {}", row.id);
        return Err(ApiError::InvalidCredentials);
    }

    let user = row.into_user();
    let access_token = state.tokens.issue(&user)?;

    Ok(Json(AuthResponse {
        error: false,
        message: "Login successful.".to_string(),
        user,
        access_token,
    }))
}

/// Current account, read fresh from the store rather than from the token.
/// Unlike register and login, the password is left out.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let row = blocking(move || db.db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::UserNotFound("User not found."))?;

    Ok(Json(UserResponse {
        error: false,
        message: "User fetched successfully.".to_string(),
        user: row.into_user().without_password(),
    }))
}

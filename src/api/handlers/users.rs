//! User handlers: signup and reads.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{SignupRequest, UserDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users/signup` — Register a user if the username is free.
///
/// Idempotent: an existing user with the same username is returned as-is.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] for a blank username.
#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    tag = "Users",
    summary = "Register a user",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Existing or newly created user", body = UserDto),
        (status = 400, description = "Blank username", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.parking_service.register_user(&req.username).await?;
    Ok(Json(UserDto::from(&user)))
}

/// `GET /users` — List all registered users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    responses(
        (status = 200, description = "All registered users", body = Vec<UserDto>),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let users = state.parking_service.users().list().await;
    let dtos: Vec<UserDto> = users.iter().map(UserDto::from).collect();
    Json(dtos)
}

/// `GET /users/name/{username}` — Get a user by username.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown username.
#[utoipa::path(
    get,
    path = "/api/v1/users/name/{username}",
    tag = "Users",
    summary = "Get user by username",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user_by_name(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .parking_service
        .users()
        .get_by_username(&username)
        .await?;
    Ok(Json(UserDto::from(&user)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/signup", post(signup))
        .route("/users/name/{username}", get(get_user_by_name))
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::UserId;
use crate::services::{NewUser, UserUpdate};

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.shared.user_service.list().await?;
    let users = users.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::success("Success get users", users)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = UserId::new(parse_id(&id)?);
    let user = state.shared.user_service.get(id).await?;
    Ok(Json(ApiResponse::success("Success get user", user.into())))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state.shared.user_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Success create user", user.into())),
    ))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = UserId::new(parse_id(&id)?);
    let user = state.shared.user_service.update(id, payload).await?;
    Ok(Json(ApiResponse::success("Success update user", user.into())))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = UserId::new(parse_id(&id)?);
    state.shared.user_service.delete(id).await?;
    Ok(Json(ApiResponse::message("Success delete user")))
}

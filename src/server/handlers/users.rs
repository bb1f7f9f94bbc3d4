use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::users;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::user_service::{ChangePassword, EditUser, NewUser, ProfileFields};

pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<users::Model>> {
    Ok(Json(state.users.profile(&user.actor).await?))
}

pub async fn complete_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProfileFields>,
) -> ApiResult<Json<users::Model>> {
    Ok(Json(state.users.complete_profile(&user.actor, payload).await?))
}

pub async fn edit_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProfileFields>,
) -> ApiResult<Json<users::Model>> {
    Ok(Json(state.users.edit_profile(&user.actor, payload).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ChangePassword>,
) -> ApiResult<StatusCode> {
    state.users.change_password(&user.actor, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    Ok(Json(state.users.list_users(&user.actor).await?))
}

pub async fn add_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    let created = state.users.add_user(&user.actor, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn edit_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<EditUser>,
) -> ApiResult<Json<users::Model>> {
    Ok(Json(state.users.edit_user(&user.actor, id, payload).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.users.delete_user(&user.actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

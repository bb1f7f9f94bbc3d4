use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::today;
use crate::database::entities::cattle;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::cattle_service::{CattlePage, CattleQuery, RegisterCattle, UpdateCattle};

#[derive(Deserialize, Default)]
pub struct ArchiveRequest {
    pub remark: Option<String>,
}

pub async fn list_cattle(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CattleQuery>,
) -> ApiResult<Json<CattlePage>> {
    Ok(Json(state.cattle.list(&query).await?))
}

pub async fn get_cattle(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<cattle::Model>> {
    Ok(Json(state.cattle.get(id).await?))
}

pub async fn register_cattle(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<RegisterCattle>,
) -> ApiResult<(StatusCode, Json<cattle::Model>)> {
    let animal = state.cattle.register(&user.actor, payload, today()).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

pub async fn update_cattle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCattle>,
) -> ApiResult<Json<cattle::Model>> {
    Ok(Json(state.cattle.update(&user.actor, id, payload).await?))
}

pub async fn archive_cattle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    payload: Option<Json<ArchiveRequest>>,
) -> ApiResult<Json<cattle::Model>> {
    let remark = payload.and_then(|Json(p)| p.remark);
    Ok(Json(state.cattle.archive(&user.actor, id, remark).await?))
}

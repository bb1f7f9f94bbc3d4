use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::cattle::ArchiveRequest;
use super::today;
use crate::database::entities::calving;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::calving_service::{CalvingOutcome, EligibleDam, NewCalving};

pub async fn list_calvings(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<calving::Model>>> {
    Ok(Json(state.calving.list().await?))
}

pub async fn eligible_dams(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<EligibleDam>>> {
    Ok(Json(state.calving.eligible_dams(today()).await?))
}

pub async fn add_calving(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewCalving>,
) -> ApiResult<(StatusCode, Json<CalvingOutcome>)> {
    let outcome = state.calving.add(&user.actor, payload, today()).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn archive_calving(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    payload: Option<Json<ArchiveRequest>>,
) -> ApiResult<Json<calving::Model>> {
    let remark = payload.and_then(|Json(p)| p.remark);
    Ok(Json(state.calving.archive(&user.actor, id, remark).await?))
}

pub async fn delete_calving(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.calving.delete(&user.actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

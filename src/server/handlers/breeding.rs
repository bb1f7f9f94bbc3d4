use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::today;
use crate::database::entities::breeding_records;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::breeding_service::{BreedingRecordView, EligibleAnimal, NewBreeding};

#[derive(Deserialize)]
pub struct PregnancyResultRequest {
    pub result: String,
}

pub async fn list_breeding(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<BreedingRecordView>>> {
    Ok(Json(state.breeding.list().await?))
}

pub async fn eligible_animals(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<EligibleAnimal>>> {
    Ok(Json(state.breeding.eligible(today()).await?))
}

pub async fn add_breeding(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewBreeding>,
) -> ApiResult<(StatusCode, Json<breeding_records::Model>)> {
    let record = state.breeding.add(&user.actor, payload, today()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_pregnancy_result(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<PregnancyResultRequest>,
) -> ApiResult<Json<breeding_records::Model>> {
    let record = state
        .breeding
        .update_pregnancy_result(&user.actor, id, &payload.result, today())
        .await?;
    Ok(Json(record))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::today;
use crate::database::entities::milk_production;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::milk_service::{
    DailySheetRow, EditMilk, MilkFilter, MilkRecordView, MilkTotals, RecordMilk,
};
use crate::status::parse_record_date;

#[derive(Deserialize, Default)]
pub struct DailySheetQuery {
    pub date: Option<String>,
}

pub async fn record_milk(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<RecordMilk>,
) -> ApiResult<Json<milk_production::Model>> {
    Ok(Json(state.milk.record(&user.actor, payload, today()).await?))
}

pub async fn daily_sheet(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<DailySheetQuery>,
) -> ApiResult<Json<Vec<DailySheetRow>>> {
    let day = match query.date.as_deref() {
        Some(raw) => parse_record_date(raw).ok_or_else(|| {
            CoreError::invalid_field("date", format!("Invalid date: {}, expected YYYY-MM-DD", raw))
        })?,
        None => today(),
    };
    Ok(Json(state.milk.daily_sheet(day).await?))
}

pub async fn list_milk(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<MilkFilter>,
) -> ApiResult<Json<Vec<MilkRecordView>>> {
    Ok(Json(state.milk.list(&filter).await?))
}

pub async fn totals(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<MilkTotals>> {
    Ok(Json(state.milk.totals(today()).await?))
}

pub async fn edit_milk(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<EditMilk>,
) -> ApiResult<Json<milk_production::Model>> {
    Ok(Json(state.milk.edit(&user.actor, id, payload).await?))
}

pub async fn delete_milk(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.milk.delete(&user.actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

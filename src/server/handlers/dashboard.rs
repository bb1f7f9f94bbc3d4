use axum::{extract::State, response::Json};

use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::dashboard_service::HerdSummary;

pub async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<HerdSummary>> {
    Ok(Json(state.dashboard.summary().await?))
}

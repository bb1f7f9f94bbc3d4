use axum::{extract::State, response::Json};
use tracing::info;

use super::today;
use crate::auth::require_admin;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::{StatusTrigger, SweepReport};

/// Reclassify the whole herd now instead of waiting for the next scheduled run.
pub async fn run_sweep(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SweepReport>> {
    require_admin(&user.actor, "run a status sweep")?;
    let report = state.status.sweep(today()).await?;
    info!(
        "{} sweep by {}: updated {} of {}",
        StatusTrigger::Manual.as_str(),
        user.actor.username,
        report.updated,
        report.examined
    );
    Ok(Json(report))
}

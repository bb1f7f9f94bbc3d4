use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::today;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::CurrentUser;
use crate::services::auth_service::LoginOutcome;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    /// Email address or phone number on the account.
    pub identifier: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    let outcome = state
        .auth
        .login(&payload.username, &payload.password, today())
        .await?;
    Ok(Json(outcome))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> ApiResult<StatusCode> {
    state.auth.logout(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state.auth.forgot_password(&payload.identifier).await?;
    Ok(Json(json!({
        "message": "A password reset link has been sent"
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .auth
        .reset_password(&payload.token, &payload.password, &payload.confirm_password)
        .await?;
    Ok(Json(json!({
        "message": "Password has been reset, please log in"
    })))
}

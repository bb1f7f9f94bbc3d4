use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::Actor;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// The signed-in user behind a request, resolved from `Authorization: Bearer`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub actor: Actor,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| CoreError::unauthorized("Please log in to continue"))?;
        let actor = state.auth.authenticate(&token).await?;
        Ok(Self { actor, token })
    }
}

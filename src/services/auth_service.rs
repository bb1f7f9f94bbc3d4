use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{Actor, UserRole};
use crate::database::entities::{user_sessions, users};
use crate::database::SeaOrmHerdRepository;
use crate::errors::{CoreError, CoreResult};
use crate::services::status_service::{StatusService, StatusTrigger};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Delivers password reset links to users.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(&self, user: &users::Model, link: &str) -> CoreResult<()>;
}

/// Writes the reset link to the log instead of sending mail.
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_link(&self, user: &users::Model, link: &str) -> CoreResult<()> {
        info!(
            "Password reset link for {} ({}): {}",
            user.username,
            user.email.as_deref().unwrap_or("no email"),
            link
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub session_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub public_base_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24,
            reset_token_ttl_minutes: 60,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: users::Model,
    pub profile_complete: bool,
}

/// Service for handling authentication operations
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    status: StatusService<SeaOrmHerdRepository>,
    notifier: Arc<dyn ResetNotifier>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn ResetNotifier>,
        settings: AuthSettings,
    ) -> Self {
        let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
        Self {
            db,
            status,
            notifier,
            settings,
        }
    }

    /// Hash a password using bcrypt
    pub fn hash_password(password: &str) -> CoreResult<String> {
        Self::validate_password(password)?;
        hash(password, DEFAULT_COST)
            .map_err(|e| CoreError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
        verify(password, hash)
            .map_err(|e| CoreError::internal(format!("Failed to verify password: {}", e)))
    }

    /// At least six characters, one of them a digit.
    pub fn validate_password(password: &str) -> CoreResult<()> {
        if password.chars().count() < MIN_PASSWORD_LENGTH
            || !password.chars().any(|c| c.is_ascii_digit())
        {
            return Err(CoreError::invalid_field(
                "password",
                "Password must be at least 6 characters and include a number",
            ));
        }
        Ok(())
    }

    pub fn validate_new_password(password: &str, confirm: &str) -> CoreResult<()> {
        if password != confirm {
            return Err(CoreError::invalid_field(
                "confirm_password",
                "Passwords do not match",
            ));
        }
        Self::validate_password(password)
    }

    /// Check credentials, open a session and run the login status sweep.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        today: NaiveDate,
    ) -> CoreResult<LoginOutcome> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;

        let verified = match &user {
            Some(user) => Self::verify_password(password, &user.password_hash)?,
            None => false,
        };
        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("Failed login attempt for {}", username);
                return Err(CoreError::unauthorized("Invalid credentials"));
            }
        };
        if !user.is_active {
            return Err(CoreError::forbidden("Account is deactivated"));
        }

        let session = user_sessions::ActiveModel::new(user.id, self.settings.session_ttl_hours)
            .insert(&self.db)
            .await?;

        let active: users::ActiveModel = user.into();
        let user = active.set_last_login().update(&self.db).await?;
        info!("User {} logged in", user.username);

        self.status.sweep_after(StatusTrigger::Login, today).await;

        Ok(LoginOutcome {
            token: session.token,
            expires_at: session.expires_at,
            profile_complete: user.profile_complete(),
            user,
        })
    }

    pub async fn logout(&self, token: &str) -> CoreResult<()> {
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::Token.eq(token))
            .filter(user_sessions::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired session"))?;

        let active: user_sessions::ActiveModel = session.into();
        active.deactivate().update(&self.db).await?;
        Ok(())
    }

    /// Resolve a bearer token to the acting user.
    pub async fn authenticate(&self, token: &str) -> CoreResult<Actor> {
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::Token.eq(token))
            .filter(user_sessions::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired session"))?;

        if session.is_expired() {
            return Err(CoreError::unauthorized("Session expired"));
        }

        let user = users::Entity::find_by_id(session.user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired session"))?;

        if !user.is_active {
            return Err(CoreError::forbidden("Account is deactivated"));
        }

        let role = UserRole::from_str(&user.role)?;
        Ok(Actor::new(user.id, user.username, role))
    }

    /// Issue a reset token for the account matching an email or phone number.
    pub async fn forgot_password(&self, identifier: &str) -> CoreResult<()> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CoreError::invalid_field(
                "identifier",
                "Email or phone is required",
            ));
        }

        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                            .eq(identifier.to_lowercase()),
                    )
                    .add(users::Column::Phone.eq(identifier)),
            )
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("user", identifier))?;

        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::minutes(self.settings.reset_token_ttl_minutes);

        let mut active: users::ActiveModel = user.clone().into();
        active.reset_token = Set(Some(token.clone()));
        active.reset_token_expires_at = Set(Some(expires_at));
        active.set_updated_at().update(&self.db).await?;

        let link = format!(
            "{}/reset-password/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            token
        );
        self.notifier.send_reset_link(&user, &link).await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> CoreResult<()> {
        let user = users::Entity::find()
            .filter(users::Column::ResetToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired token"))?;

        match user.reset_token_expires_at {
            Some(expires_at) if expires_at > Utc::now() => {}
            _ => {
                return Err(CoreError::unauthorized(
                    "Reset link has expired. Please request a new one",
                ))
            }
        }

        Self::validate_new_password(password, confirm_password)?;
        let password_hash = Self::hash_password(password)?;

        let username = user.username.clone();
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.reset_token = Set(None);
        active.reset_token_expires_at = Set(None);
        active.set_updated_at().update(&self.db).await?;

        info!("Password reset for {}", username);
        Ok(())
    }
}

use crate::errors::{CoreError, CoreResult};

/// Farm account role.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UserRole {
    Admin,
    Worker,
}

impl UserRole {
    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "worker" => Ok(UserRole::Worker),
            _ => Err(CoreError::invalid_field(
                "role",
                format!("Invalid role: {}", s),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Worker => "worker",
        }
    }
}

/// The authenticated caller of a service operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: i32, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub trait Authorizer {
    fn authorize(&self, actor: &Actor, action: &str) -> Result<(), CoreError>;
}

/// Admin-only actions are gated by role; everything else is open to any
/// signed-in user.
pub struct AdminOnly;

impl Authorizer for AdminOnly {
    fn authorize(&self, actor: &Actor, action: &str) -> Result<(), CoreError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(CoreError::forbidden(format!(
                "Only administrators can {}",
                action
            )))
        }
    }
}

pub fn require_admin(actor: &Actor, action: &str) -> CoreResult<()> {
    AdminOnly.authorize(actor, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn role_parsing() {
        assert_eq!(UserRole::from_str("Admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("worker").unwrap(), UserRole::Worker);
        assert!(UserRole::from_str("owner").is_err());
    }

    #[test]
    fn workers_are_refused_admin_actions() {
        let worker = Actor::new(2, "milker", UserRole::Worker);
        let err = require_admin(&worker, "archive cattle").unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Forbidden);
        assert!(err.message().contains("archive cattle"));

        let admin = Actor::new(1, "admin", UserRole::Admin);
        assert!(require_admin(&admin, "archive cattle").is_ok());
    }
}

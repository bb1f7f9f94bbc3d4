use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{require_admin, Actor, UserRole};
use crate::database::entities::users;
use crate::errors::{CoreError, CoreResult};
use crate::services::auth_service::AuthService;

/// Every profile field; all are required when completing a profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub qualification: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditUser {
    pub username: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_username(username: &str) -> CoreResult<String> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(CoreError::invalid_field(
            "username",
            "Username must be between 3 and 50 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(CoreError::invalid_field(
            "username",
            "Username can only contain letters, numbers, dots, underscores and hyphens",
        ));
    }
    Ok(username.to_string())
}

fn validate_age(age: Option<i32>) -> CoreResult<()> {
    match age {
        Some(age) if !(1..=150).contains(&age) => {
            Err(CoreError::invalid_field("age", "Age must be between 1 and 150"))
        }
        _ => Ok(()),
    }
}

/// Copies the provided profile fields onto the row. Blank strings clear.
fn apply_profile(active: &mut users::ActiveModel, profile: ProfileFields) -> CoreResult<()> {
    validate_age(profile.age)?;
    if let Some(v) = profile.first_name {
        active.first_name = Set(clean(Some(v)));
    }
    if let Some(v) = profile.last_name {
        active.last_name = Set(clean(Some(v)));
    }
    if profile.age.is_some() {
        active.age = Set(profile.age);
    }
    if let Some(v) = profile.national_id {
        active.national_id = Set(clean(Some(v)));
    }
    if let Some(v) = profile.address {
        active.address = Set(clean(Some(v)));
    }
    if let Some(v) = profile.qualification {
        active.qualification = Set(clean(Some(v)));
    }
    if let Some(v) = profile.email {
        active.email = Set(clean(Some(v)));
    }
    if let Some(v) = profile.phone {
        active.phone = Set(clean(Some(v)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, user_id: i32) -> CoreResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("user", user_id.to_string()))
    }

    async fn ensure_username_free(&self, username: &str, except: Option<i32>) -> CoreResult<()> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(CoreError::conflict(format!(
                "Username {} is already taken",
                username
            )));
        }
        Ok(())
    }

    /// Insert an account without an acting user. Used for bootstrapping the
    /// first administrator.
    pub async fn create_user(&self, input: NewUser) -> CoreResult<users::Model> {
        let username = validate_username(&input.username)?;
        let role = UserRole::from_str(&input.role)?;
        self.ensure_username_free(&username, None).await?;

        let mut user = users::ActiveModel::new();
        user.username = Set(username);
        user.password_hash = Set(AuthService::hash_password(&input.password)?);
        user.role = Set(role.as_str().to_string());
        apply_profile(&mut user, input.profile)?;

        let user = user.insert(&self.db).await?;
        info!("Created {} account {}", user.role, user.username);
        Ok(user)
    }

    pub async fn profile(&self, actor: &Actor) -> CoreResult<users::Model> {
        self.find(actor.user_id).await
    }

    /// First-login profile form: every field must be filled in.
    pub async fn complete_profile(
        &self,
        actor: &Actor,
        profile: ProfileFields,
    ) -> CoreResult<users::Model> {
        let text = [
            ("first_name", &profile.first_name),
            ("last_name", &profile.last_name),
            ("national_id", &profile.national_id),
            ("address", &profile.address),
            ("qualification", &profile.qualification),
            ("email", &profile.email),
            ("phone", &profile.phone),
        ];
        for (field, value) in text {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(CoreError::invalid_field(field, format!("{} is required", field)));
            }
        }
        if profile.age.is_none() {
            return Err(CoreError::invalid_field("age", "age is required"));
        }
        self.edit_profile(actor, profile).await
    }

    pub async fn edit_profile(
        &self,
        actor: &Actor,
        profile: ProfileFields,
    ) -> CoreResult<users::Model> {
        let user = self.find(actor.user_id).await?;
        let mut active: users::ActiveModel = user.into();
        apply_profile(&mut active, profile)?;
        Ok(active.set_updated_at().update(&self.db).await?)
    }

    pub async fn change_password(&self, actor: &Actor, input: ChangePassword) -> CoreResult<()> {
        let user = self.find(actor.user_id).await?;
        if !AuthService::verify_password(&input.current_password, &user.password_hash)? {
            return Err(CoreError::invalid_field(
                "current_password",
                "Current password is incorrect",
            ));
        }
        AuthService::validate_new_password(&input.new_password, &input.confirm_password)?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(AuthService::hash_password(&input.new_password)?);
        active.set_updated_at().update(&self.db).await?;
        info!("Password changed for {}", actor.username);
        Ok(())
    }

    pub async fn list_users(&self, actor: &Actor) -> CoreResult<Vec<users::Model>> {
        require_admin(actor, "list users")?;
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn add_user(&self, actor: &Actor, input: NewUser) -> CoreResult<users::Model> {
        require_admin(actor, "add users")?;
        self.create_user(input).await
    }

    pub async fn edit_user(
        &self,
        actor: &Actor,
        user_id: i32,
        input: EditUser,
    ) -> CoreResult<users::Model> {
        require_admin(actor, "edit users")?;
        let user = self.find(user_id).await?;
        let mut active: users::ActiveModel = user.into();

        if let Some(username) = input.username {
            let username = validate_username(&username)?;
            self.ensure_username_free(&username, Some(user_id)).await?;
            active.username = Set(username);
        }
        if let Some(role) = input.role {
            active.role = Set(UserRole::from_str(&role)?.as_str().to_string());
        }
        apply_profile(&mut active, input.profile)?;

        let updated = active.set_updated_at().update(&self.db).await?;
        info!("User {} edited by {}", updated.username, actor.username);
        Ok(updated)
    }

    pub async fn delete_user(&self, actor: &Actor, user_id: i32) -> CoreResult<()> {
        require_admin(actor, "delete users")?;
        if actor.user_id == user_id {
            return Err(CoreError::conflict("You cannot delete your own account"));
        }
        let result = users::Entity::delete_by_id(user_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(CoreError::not_found("user", user_id.to_string()));
        }
        info!("User {} deleted by {}", user_id, actor.username);
        Ok(())
    }
}

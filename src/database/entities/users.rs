use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub qualification: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<ChronoDateTimeUtc>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
    pub last_login_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            username: ActiveValue::NotSet,
            password_hash: ActiveValue::NotSet,
            role: ActiveValue::NotSet,
            first_name: Set(None),
            last_name: Set(None),
            age: Set(None),
            national_id: Set(None),
            address: Set(None),
            qualification: Set(None),
            email: Set(None),
            phone: Set(None),
            reset_token: Set(None),
            reset_token_expires_at: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn set_last_login(mut self) -> Self {
        self.last_login_at = Set(Some(chrono::Utc::now()));
        self
    }
}

impl Model {
    /// All profile fields present and non-blank.
    pub fn profile_complete(&self) -> bool {
        let text = [
            &self.first_name,
            &self.last_name,
            &self.national_id,
            &self.address,
            &self.qualification,
            &self.email,
            &self.phone,
        ];
        self.age.is_some()
            && text
                .iter()
                .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::status::AnimalSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cattle")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tag_number: String,
    pub name: Option<String>,
    pub breed: Option<String>,
    pub sex: String,
    // Kept as text: legacy rows may hold unparseable dates.
    pub birth_date: Option<String>,
    pub status_category: Option<String>,
    pub status: Option<String>,
    pub recorded_by: Option<String>,
    pub remark: Option<String>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::breeding_records::Entity")]
    BreedingRecords,
    #[sea_orm(has_many = "super::calving::Entity")]
    Calving,
    #[sea_orm(has_many = "super::milk_production::Entity")]
    MilkProduction,
}

impl Related<super::breeding_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BreedingRecords.def()
    }
}

impl Related<super::calving::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calving.def()
    }
}

impl Related<super::milk_production::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MilkProduction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            tag_number: ActiveValue::NotSet,
            name: Set(None),
            breed: Set(None),
            sex: ActiveValue::NotSet,
            birth_date: Set(None),
            status_category: Set(None),
            status: Set(None),
            recorded_by: Set(None),
            remark: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn archive(mut self, remark: String) -> Self {
        self.is_active = Set(false);
        self.remark = Set(Some(remark));
        self.set_updated_at()
    }
}

impl From<Model> for AnimalSnapshot {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            tag_number: model.tag_number,
            name: model.name,
            sex: model.sex,
            birth_date: model.birth_date,
            status_category: model.status_category,
            status: model.status,
        }
    }
}

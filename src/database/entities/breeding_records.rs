use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::status::BreedingSnapshot;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "breeding_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cattle_id: i32,
    pub method: String,
    pub semen_type: Option<String>,
    pub semen_price: Option<f64>,
    pub semen_batch_number: Option<String>,
    pub sire_name: Option<String>,
    pub breeding_date: String,
    pub breeding_attempt_number: i32,
    pub notes: Option<String>,
    pub steaming_date: String,
    pub pregnancy_check_date: String,
    pub pregnancy_test_result: Option<String>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cattle::Entity",
        from = "Column::CattleId",
        to = "super::cattle::Column::Id"
    )]
    Cattle,
}

impl Related<super::cattle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cattle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BreedingSnapshot {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            animal_id: model.cattle_id,
            breeding_date: model.breeding_date,
        }
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::status::CalvingSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calving")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dam_id: i32,
    pub dam_tag_number: String,
    pub dam_name: Option<String>,
    pub calf_id: Option<i32>,
    pub calf_name: Option<String>,
    pub calf_sex: String,
    pub birth_date: String,
    pub breed: Option<String>,
    pub calf_condition: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
    pub remark: Option<String>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cattle::Entity",
        from = "Column::DamId",
        to = "super::cattle::Column::Id"
    )]
    Dam,
}

impl Related<super::cattle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dam.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CalvingSnapshot {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            dam_tag_number: model.dam_tag_number,
            birth_date: model.birth_date,
        }
    }
}

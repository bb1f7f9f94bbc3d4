use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milk_production")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cattle_id: i32,
    pub date: String,
    pub morning_milk: Option<f64>,
    pub mid_day_milk: Option<f64>,
    pub evening_milk: Option<f64>,
    pub notes: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
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

impl Model {
    pub fn total(&self) -> f64 {
        [self.morning_milk, self.mid_day_milk, self.evening_milk]
            .into_iter()
            .flatten()
            .sum()
    }

    /// Number of milking sessions recorded for the day.
    pub fn sessions_saved(&self) -> usize {
        [self.morning_milk, self.mid_day_milk, self.evening_milk]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::database::entities::{breeding_records, calving, cattle};
use crate::errors::CoreResult;
use crate::status::{AnimalSnapshot, BreedingSnapshot, CalvingSnapshot, HerdRepository};

/// [`HerdRepository`] backed by the sea-orm cattle, breeding and calving tables.
#[derive(Clone, Debug)]
pub struct SeaOrmHerdRepository {
    db: DatabaseConnection,
}

impl SeaOrmHerdRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HerdRepository for SeaOrmHerdRepository {
    async fn latest_breeding(&self, animal_id: i32) -> CoreResult<Option<BreedingSnapshot>> {
        let record = breeding_records::Entity::find()
            .filter(breeding_records::Column::CattleId.eq(animal_id))
            .order_by_desc(breeding_records::Column::BreedingDate)
            .order_by_desc(breeding_records::Column::Id)
            .one(&self.db)
            .await?;
        Ok(record.map(Into::into))
    }

    async fn latest_calving(&self, animal_tag: &str) -> CoreResult<Option<CalvingSnapshot>> {
        let record = calving::Entity::find()
            .filter(calving::Column::DamTagNumber.eq(animal_tag))
            .filter(calving::Column::IsActive.eq(true))
            .order_by_desc(calving::Column::BirthDate)
            .order_by_desc(calving::Column::Id)
            .one(&self.db)
            .await?;
        Ok(record.map(Into::into))
    }

    async fn read_all_animals(&self) -> CoreResult<Vec<AnimalSnapshot>> {
        let animals = cattle::Entity::find()
            .filter(cattle::Column::IsActive.eq(true))
            .order_by_asc(cattle::Column::Id)
            .all(&self.db)
            .await?;
        Ok(animals.into_iter().map(Into::into).collect())
    }

    async fn write_status(
        &self,
        animal_id: i32,
        status_category: &str,
        status: &str,
    ) -> CoreResult<bool> {
        // Single conditional UPDATE so a matching row is never touched.
        let differs = Condition::any()
            .add(cattle::Column::StatusCategory.is_null())
            .add(cattle::Column::StatusCategory.ne(status_category))
            .add(cattle::Column::Status.is_null())
            .add(cattle::Column::Status.ne(status));

        let result = cattle::Entity::update_many()
            .col_expr(cattle::Column::StatusCategory, Expr::value(status_category))
            .col_expr(cattle::Column::Status, Expr::value(status))
            .col_expr(cattle::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(cattle::Column::Id.eq(animal_id))
            .filter(differs)
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

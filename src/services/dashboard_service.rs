use std::collections::BTreeMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::database::entities::cattle;
use crate::errors::CoreResult;
use crate::status::StatusCategory;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HerdSummary {
    pub herd_count: u64,
    pub by_category: BTreeMap<String, u64>,
    /// Active animals without a recognised category.
    pub unclassified: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn summary(&self) -> CoreResult<HerdSummary> {
        let herd_count = cattle::Entity::find()
            .filter(cattle::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;

        let mut by_category = BTreeMap::new();
        for category in StatusCategory::ALL {
            let count = cattle::Entity::find()
                .filter(cattle::Column::IsActive.eq(true))
                .filter(cattle::Column::StatusCategory.eq(category.as_str()))
                .count(&self.db)
                .await?;
            by_category.insert(category.as_str().to_string(), count);
        }

        let classified: u64 = by_category.values().sum();
        Ok(HerdSummary {
            herd_count,
            unclassified: herd_count.saturating_sub(classified),
            by_category,
        })
    }
}

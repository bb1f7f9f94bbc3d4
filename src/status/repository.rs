use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

/// The fields of a cattle row the classifier reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: i32,
    pub tag_number: String,
    pub name: Option<String>,
    pub sex: String,
    pub birth_date: Option<String>,
    pub status_category: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingSnapshot {
    pub id: i32,
    pub animal_id: i32,
    pub breeding_date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalvingSnapshot {
    pub id: i32,
    pub dam_tag_number: String,
    pub birth_date: String,
}

/// Storage contract of the status classifier.
#[async_trait]
pub trait HerdRepository: Send + Sync {
    /// Most recent breeding event by breeding date.
    async fn latest_breeding(&self, animal_id: i32) -> CoreResult<Option<BreedingSnapshot>>;

    /// Most recent active calving event by birth date where the animal is the dam.
    async fn latest_calving(&self, animal_tag: &str) -> CoreResult<Option<CalvingSnapshot>>;

    /// Active herd snapshot for a sweep.
    async fn read_all_animals(&self) -> CoreResult<Vec<AnimalSnapshot>>;

    /// Conditional update. Returns `false` when the stored pair already matched.
    async fn write_status(&self, animal_id: i32, status_category: &str, status: &str)
        -> CoreResult<bool>;
}

#[async_trait]
impl<R: HerdRepository + ?Sized> HerdRepository for std::sync::Arc<R> {
    async fn latest_breeding(&self, animal_id: i32) -> CoreResult<Option<BreedingSnapshot>> {
        (**self).latest_breeding(animal_id).await
    }

    async fn latest_calving(&self, animal_tag: &str) -> CoreResult<Option<CalvingSnapshot>> {
        (**self).latest_calving(animal_tag).await
    }

    async fn read_all_animals(&self) -> CoreResult<Vec<AnimalSnapshot>> {
        (**self).read_all_animals().await
    }

    async fn write_status(
        &self,
        animal_id: i32,
        status_category: &str,
        status: &str,
    ) -> CoreResult<bool> {
        (**self).write_status(animal_id, status_category, status).await
    }
}

//! In-memory herd store used to exercise the classifier without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::repository::{AnimalSnapshot, BreedingSnapshot, CalvingSnapshot, HerdRepository};
use crate::errors::{CoreError, CoreResult};

#[derive(Default)]
struct HerdState {
    animals: Vec<AnimalSnapshot>,
    breedings: Vec<BreedingSnapshot>,
    calvings: Vec<CalvingSnapshot>,
    writes: usize,
    fail_writes: bool,
}

#[derive(Default)]
pub struct InMemoryHerd {
    state: Mutex<HerdState>,
}

impl InMemoryHerd {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HerdState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an animal with no stored status and returns its id.
    pub fn add_animal(&self, tag_number: &str, sex: &str, birth_date: Option<&str>) -> i32 {
        let mut state = self.state();
        let id = state.animals.len() as i32 + 1;
        state.animals.push(AnimalSnapshot {
            id,
            tag_number: tag_number.to_string(),
            name: None,
            sex: sex.to_string(),
            birth_date: birth_date.map(str::to_string),
            status_category: None,
            status: None,
        });
        id
    }

    /// Overwrites the stored status as an admin edit would.
    pub fn set_status(&self, animal_id: i32, status_category: &str, status: &str) {
        let mut state = self.state();
        if let Some(animal) = state.animals.iter_mut().find(|a| a.id == animal_id) {
            animal.status_category = Some(status_category.to_string());
            animal.status = Some(status.to_string());
        }
    }

    pub fn add_breeding(&self, animal_id: i32, breeding_date: &str) {
        let mut state = self.state();
        let id = state.breedings.len() as i32 + 1;
        state.breedings.push(BreedingSnapshot {
            id,
            animal_id,
            breeding_date: breeding_date.to_string(),
        });
    }

    pub fn add_calving(&self, dam_tag_number: &str, birth_date: &str) {
        let mut state = self.state();
        let id = state.calvings.len() as i32 + 1;
        state.calvings.push(CalvingSnapshot {
            id,
            dam_tag_number: dam_tag_number.to_string(),
            birth_date: birth_date.to_string(),
        });
    }

    pub fn animal(&self, animal_id: i32) -> Option<AnimalSnapshot> {
        self.state().animals.iter().find(|a| a.id == animal_id).cloned()
    }

    /// Number of writes that changed a row.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Makes every subsequent write fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }
}

#[async_trait]
impl HerdRepository for InMemoryHerd {
    async fn latest_breeding(&self, animal_id: i32) -> CoreResult<Option<BreedingSnapshot>> {
        Ok(self
            .state()
            .breedings
            .iter()
            .filter(|b| b.animal_id == animal_id)
            .max_by(|a, b| a.breeding_date.cmp(&b.breeding_date))
            .cloned())
    }

    async fn latest_calving(&self, animal_tag: &str) -> CoreResult<Option<CalvingSnapshot>> {
        Ok(self
            .state()
            .calvings
            .iter()
            .filter(|c| c.dam_tag_number == animal_tag)
            .max_by(|a, b| a.birth_date.cmp(&b.birth_date))
            .cloned())
    }

    async fn read_all_animals(&self) -> CoreResult<Vec<AnimalSnapshot>> {
        Ok(self.state().animals.clone())
    }

    async fn write_status(
        &self,
        animal_id: i32,
        status_category: &str,
        status: &str,
    ) -> CoreResult<bool> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(CoreError::unavailable("herd store is read-only"));
        }
        let animal = state
            .animals
            .iter_mut()
            .find(|a| a.id == animal_id)
            .ok_or_else(|| CoreError::not_found("cattle", animal_id.to_string()))?;

        if animal.status_category.as_deref() == Some(status_category)
            && animal.status.as_deref() == Some(status)
        {
            return Ok(false);
        }
        animal.status_category = Some(status_category.to_string());
        animal.status = Some(status.to_string());
        state.writes += 1;
        Ok(true)
    }
}

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Actor;
use crate::database::entities::{breeding_records, cattle};
use crate::database::SeaOrmHerdRepository;
use crate::errors::{CoreError, CoreResult};
use crate::services::status_service::{StatusService, StatusTrigger};
use crate::status::classifier::{parse_birth_date, parse_event_date};
use crate::status::{
    age_in_months, pregnancy_check_date, steaming_date, CattleStatus, Sex, StatusCategory,
    DATE_FORMAT,
};

/// Minimum days between two services of the same cow.
pub const MIN_SERVICE_GAP_DAYS: i64 = 21;
/// Minimum age for a heifer's first service.
pub const MIN_HEIFER_AGE_MONTHS: i32 = 12;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BreedingMethod {
    #[serde(rename = "AI", alias = "ai")]
    ArtificialInsemination,
    #[serde(rename = "natural")]
    Natural,
}

impl BreedingMethod {
    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Ok(BreedingMethod::ArtificialInsemination),
            "natural" => Ok(BreedingMethod::Natural),
            _ => Err(CoreError::invalid_field(
                "method",
                format!("Unknown breeding method: {}", s),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreedingMethod::ArtificialInsemination => "AI",
            BreedingMethod::Natural => "natural",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewBreeding {
    pub cattle_id: i32,
    pub method: String,
    pub breeding_date: String,
    pub breeding_attempt_number: i32,
    pub notes: Option<String>,
    pub semen_type: Option<String>,
    pub semen_price: Option<f64>,
    pub semen_batch_number: Option<String>,
    pub sire_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BreedingRecordView {
    #[serde(flatten)]
    pub record: breeding_records::Model,
    pub cattle_name: Option<String>,
    pub tag_number: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct EligibleAnimal {
    pub cattle_id: i32,
    pub tag_number: String,
    pub name: Option<String>,
    pub status: Option<String>,
}

/// Whether a cow may be served today.
///
/// Heifers must be `bullying heifer` and at least a year old; mature cows
/// must be `lactating`.
pub fn check_breeding_eligibility(animal: &cattle::Model, today: NaiveDate) -> CoreResult<()> {
    let sex: Sex = animal.sex.parse()?;
    if sex != Sex::Female {
        return Err(CoreError::invalid_field(
            "cattle_id",
            "Breeding can only be recorded for female cattle",
        ));
    }
    let birth_date = parse_birth_date(animal.birth_date.as_deref())?;
    let age = age_in_months(birth_date, today);

    let category = animal
        .status_category
        .as_deref()
        .and_then(|c| c.parse::<StatusCategory>().ok());
    let status = animal
        .status
        .as_deref()
        .and_then(|s| s.parse::<CattleStatus>().ok());

    match (category, status) {
        (Some(StatusCategory::YoungStock), Some(CattleStatus::BullyingHeifer))
            if age >= MIN_HEIFER_AGE_MONTHS =>
        {
            Ok(())
        }
        (Some(StatusCategory::YoungStock), _) => Err(CoreError::invalid_field(
            "cattle_id",
            "Young stock must be 'bullying heifer' and at least 12 months old",
        )),
        (Some(StatusCategory::MatureStock), Some(CattleStatus::Lactating)) => Ok(()),
        (Some(StatusCategory::MatureStock), _) => Err(CoreError::invalid_field(
            "cattle_id",
            "Mature stock must be 'lactating' to breed",
        )),
        _ => Err(CoreError::invalid_field(
            "cattle_id",
            format!("{} has no breeding status", animal.tag_number),
        )),
    }
}

fn required(field: &str, value: Option<String>) -> CoreResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            CoreError::invalid_field(field, "All AI fields must be filled".to_string())
        })
}

#[derive(Clone)]
pub struct BreedingService {
    db: DatabaseConnection,
    status: StatusService<SeaOrmHerdRepository>,
}

impl BreedingService {
    pub fn new(db: DatabaseConnection) -> Self {
        let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
        Self { db, status }
    }

    pub async fn add(
        &self,
        actor: &Actor,
        input: NewBreeding,
        today: NaiveDate,
    ) -> CoreResult<breeding_records::Model> {
        if input.breeding_attempt_number < 1 {
            return Err(CoreError::invalid_field(
                "breeding_attempt_number",
                "Attempt number must be at least 1",
            ));
        }
        let method = BreedingMethod::from_str(&input.method)?;
        let breeding_date = parse_event_date("breeding", &input.breeding_date)?;

        let animal = cattle::Entity::find_by_id(input.cattle_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("cattle", input.cattle_id.to_string()))?;
        check_breeding_eligibility(&animal, today)?;

        let previous = breeding_records::Entity::find()
            .filter(breeding_records::Column::CattleId.eq(animal.id))
            .order_by_desc(breeding_records::Column::BreedingDate)
            .one(&self.db)
            .await?;
        if let Some(previous) = previous {
            let last = parse_event_date("breeding", &previous.breeding_date)?;
            let gap = (breeding_date - last).num_days();
            if gap < MIN_SERVICE_GAP_DAYS {
                return Err(CoreError::invalid_field(
                    "breeding_date",
                    format!("This cow was served {} days ago", gap),
                ));
            }
        }

        let (semen_type, semen_price, semen_batch_number, sire_name) = match method {
            BreedingMethod::ArtificialInsemination => {
                let price = input.semen_price.ok_or_else(|| {
                    CoreError::invalid_field("semen_price", "All AI fields must be filled")
                })?;
                if !price.is_finite() || price < 0.0 {
                    return Err(CoreError::invalid_field(
                        "semen_price",
                        "Semen price must be a non-negative number",
                    ));
                }
                (
                    Some(required("semen_type", input.semen_type)?),
                    Some(price),
                    Some(required("semen_batch_number", input.semen_batch_number)?),
                    Some(required("sire_name", input.sire_name)?),
                )
            }
            BreedingMethod::Natural => (None, None, None, None),
        };

        let record = breeding_records::ActiveModel {
            cattle_id: Set(animal.id),
            method: Set(method.as_str().to_string()),
            semen_type: Set(semen_type),
            semen_price: Set(semen_price),
            semen_batch_number: Set(semen_batch_number),
            sire_name: Set(sire_name),
            breeding_date: Set(breeding_date.format(DATE_FORMAT).to_string()),
            breeding_attempt_number: Set(input.breeding_attempt_number),
            notes: Set(input.notes.filter(|n| !n.trim().is_empty())),
            steaming_date: Set(steaming_date(breeding_date).format(DATE_FORMAT).to_string()),
            pregnancy_check_date: Set(pregnancy_check_date(breeding_date)
                .format(DATE_FORMAT)
                .to_string()),
            pregnancy_test_result: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            "Breeding recorded for {} on {} ({}) by {}",
            animal.tag_number, record.breeding_date, record.method, actor.username
        );

        self.status.sweep_after(StatusTrigger::Breeding, today).await;
        Ok(record)
    }

    /// All breeding records with the animal they belong to, newest first.
    pub async fn list(&self) -> CoreResult<Vec<BreedingRecordView>> {
        let rows = breeding_records::Entity::find()
            .find_also_related(cattle::Entity)
            .order_by_desc(breeding_records::Column::BreedingDate)
            .order_by_desc(breeding_records::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(record, animal)| {
                animal.map(|animal| BreedingRecordView {
                    record,
                    cattle_name: animal.name,
                    tag_number: animal.tag_number,
                })
            })
            .collect())
    }

    pub async fn eligible(&self, today: NaiveDate) -> CoreResult<Vec<EligibleAnimal>> {
        let females = cattle::Entity::find()
            .filter(cattle::Column::IsActive.eq(true))
            .filter(cattle::Column::Sex.eq(Sex::Female.code()))
            .order_by_asc(cattle::Column::TagNumber)
            .all(&self.db)
            .await?;

        Ok(females
            .into_iter()
            .filter(|animal| check_breeding_eligibility(animal, today).is_ok())
            .map(|animal| EligibleAnimal {
                cattle_id: animal.id,
                tag_number: animal.tag_number,
                name: animal.name,
                status: animal.status,
            })
            .collect())
    }

    /// Record a pregnancy test outcome; the check date becomes today.
    pub async fn update_pregnancy_result(
        &self,
        actor: &Actor,
        record_id: i32,
        result: &str,
        today: NaiveDate,
    ) -> CoreResult<breeding_records::Model> {
        let result = result.trim();
        if result.is_empty() {
            return Err(CoreError::invalid_field(
                "pregnancy_test_result",
                "Result cannot be empty",
            ));
        }

        let record = breeding_records::Entity::find_by_id(record_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("breeding_record", record_id.to_string()))?;

        let mut active: breeding_records::ActiveModel = record.into();
        active.pregnancy_test_result = Set(Some(result.to_string()));
        active.pregnancy_check_date = Set(today.format(DATE_FORMAT).to_string());
        let updated = active.update(&self.db).await?;

        info!(
            "Pregnancy result for breeding {} set to {} by {}",
            record_id, result, actor.username
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn worker() -> Actor {
        Actor::new(2, "herder", UserRole::Worker)
    }

    async fn insert_animal(
        db: &DatabaseConnection,
        tag: &str,
        sex: &str,
        born: &str,
        category: &str,
        status: &str,
    ) -> cattle::Model {
        let mut animal = cattle::ActiveModel::new();
        animal.tag_number = Set(tag.to_string());
        animal.sex = Set(sex.to_string());
        animal.birth_date = Set(Some(born.to_string()));
        animal.status_category = Set(Some(category.to_string()));
        animal.status = Set(Some(status.to_string()));
        animal.insert(db).await.unwrap()
    }

    fn natural(cattle_id: i32, on: &str) -> NewBreeding {
        NewBreeding {
            cattle_id,
            method: "natural".into(),
            breeding_date: on.into(),
            breeding_attempt_number: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn breeding_a_heifer_makes_her_in_calf() {
        let db = setup_test_db().await.unwrap();
        let heifer =
            insert_animal(&db, "H1", "F", "2022-11-01", "young_stock", "bullying heifer").await;
        let service = BreedingService::new(db.clone());
        let today = date("2024-01-12");

        let record = service
            .add(&worker(), natural(heifer.id, "2024-01-10"), today)
            .await
            .unwrap();
        assert_eq!(record.steaming_date, "2024-08-10");
        assert_eq!(record.pregnancy_check_date, "2024-02-21");
        assert_eq!(record.method, "natural");

        let heifer = cattle::Entity::find_by_id(heifer.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(heifer.status.as_deref(), Some("in_calf heifer"));

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].tag_number, "H1");
    }

    #[tokio::test]
    async fn service_gap_is_enforced() {
        let db = setup_test_db().await.unwrap();
        let cow = insert_animal(&db, "C1", "F", "2020-01-01", "mature_stock", "lactating").await;
        breeding_records::ActiveModel {
            cattle_id: Set(cow.id),
            method: Set("natural".into()),
            breeding_date: Set("2024-01-01".into()),
            breeding_attempt_number: Set(1),
            steaming_date: Set("2024-08-01".into()),
            pregnancy_check_date: Set("2024-02-12".into()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let service = BreedingService::new(db);
        let err = service
            .add(&worker(), natural(cow.id, "2024-01-15"), date("2024-01-15"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
        assert!(err.message().contains("14 days"));
    }

    #[tokio::test]
    async fn ineligible_animals_are_refused() {
        let db = setup_test_db().await.unwrap();
        let bull = insert_animal(&db, "B1", "M", "2020-01-01", "bull", "mature bull").await;
        let young =
            insert_animal(&db, "H2", "F", "2023-09-01", "young_stock", "bullying heifer").await;
        let dry = insert_animal(&db, "C2", "F", "2019-01-01", "mature_stock", "dry").await;
        let service = BreedingService::new(db);
        let today = date("2024-06-01");

        for id in [bull.id, young.id, dry.id] {
            let err = service
                .add(&worker(), natural(id, "2024-06-01"), today)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), CoreErrorKind::Validation, "animal {}", id);
        }

        let missing = service
            .add(&worker(), natural(999, "2024-06-01"), today)
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), CoreErrorKind::NotFound);

        assert!(service.eligible(today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ai_needs_complete_details() {
        let db = setup_test_db().await.unwrap();
        let cow = insert_animal(&db, "C1", "F", "2020-01-01", "mature_stock", "lactating").await;
        let service = BreedingService::new(db);
        let today = date("2024-06-01");

        let mut ai = NewBreeding {
            cattle_id: cow.id,
            method: "AI".into(),
            breeding_date: "2024-06-01".into(),
            breeding_attempt_number: 1,
            semen_type: Some("sexed".into()),
            semen_price: Some(-5.0),
            semen_batch_number: Some("B-17".into()),
            sire_name: Some("Titan".into()),
            ..Default::default()
        };
        assert!(service.add(&worker(), ai.clone(), today).await.is_err());

        ai.semen_price = Some(25.0);
        ai.sire_name = None;
        assert!(service.add(&worker(), ai.clone(), today).await.is_err());

        ai.sire_name = Some("Titan".into());
        let record = service.add(&worker(), ai, today).await.unwrap();
        assert_eq!(record.method, "AI");
        assert_eq!(record.semen_price, Some(25.0));
    }

    #[tokio::test]
    async fn pregnancy_result_moves_check_date() {
        let db = setup_test_db().await.unwrap();
        let cow = insert_animal(&db, "C1", "F", "2020-01-01", "mature_stock", "lactating").await;
        let service = BreedingService::new(db);

        let eligible = service.eligible(date("2024-06-01")).await.unwrap();
        assert_eq!(eligible.len(), 1);

        let record = service
            .add(&worker(), natural(cow.id, "2024-06-01"), date("2024-06-01"))
            .await
            .unwrap();
        let updated = service
            .update_pregnancy_result(&worker(), record.id, "positive", date("2024-07-10"))
            .await
            .unwrap();
        assert_eq!(updated.pregnancy_test_result.as_deref(), Some("positive"));
        assert_eq!(updated.pregnancy_check_date, "2024-07-10");
    }

    #[test]
    fn method_parsing() {
        assert_eq!(
            BreedingMethod::from_str("ai").unwrap(),
            BreedingMethod::ArtificialInsemination
        );
        assert_eq!(BreedingMethod::from_str("Natural").unwrap().as_str(), "natural");
        assert!(BreedingMethod::from_str("embryo").is_err());
    }
}

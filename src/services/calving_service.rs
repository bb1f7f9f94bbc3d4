use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{require_admin, Actor};
use crate::database::entities::{breeding_records, calving, cattle};
use crate::database::SeaOrmHerdRepository;
use crate::errors::{CoreError, CoreResult};
use crate::services::status_service::{StatusService, StatusTrigger};
use crate::status::classifier::parse_event_date;
use crate::status::{classify, Sex, DATE_FORMAT};

const CALF_TAG_PREFIX: &str = "CLF";
const DEFAULT_ARCHIVE_REMARK: &str = "soft deleted";
const NON_SURVIVING: [&str; 2] = ["dead", "stillborn"];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewCalving {
    pub dam_id: i32,
    pub calf_name: Option<String>,
    pub calf_sex: String,
    pub birth_date: String,
    pub breed: Option<String>,
    pub calf_condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CalvingOutcome {
    pub calving: calving::Model,
    /// The registered calf; absent when it did not survive.
    pub calf: Option<cattle::Model>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EligibleDam {
    pub cattle_id: i32,
    pub tag_number: String,
    pub name: Option<String>,
}

fn calf_survived(condition: Option<&str>) -> bool {
    condition
        .map(|c| c.trim().to_lowercase())
        .map_or(true, |c| !NON_SURVIVING.contains(&c.as_str()))
}

/// Leading digits after the `CLF` prefix.
fn calf_tag_sequence(tag: &str) -> Option<u32> {
    let digits: String = tag
        .strip_prefix(CALF_TAG_PREFIX)?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct CalvingService {
    db: DatabaseConnection,
    status: StatusService<SeaOrmHerdRepository>,
}

impl CalvingService {
    pub fn new(db: DatabaseConnection) -> Self {
        let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
        Self { db, status }
    }

    /// Active animals with a breeding whose steaming date has been reached.
    pub async fn eligible_dams(&self, today: NaiveDate) -> CoreResult<Vec<EligibleDam>> {
        let dam_ids: Vec<i32> = breeding_records::Entity::find()
            .select_only()
            .column(breeding_records::Column::CattleId)
            .filter(
                breeding_records::Column::SteamingDate.lte(today.format(DATE_FORMAT).to_string()),
            )
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;

        let dams = cattle::Entity::find()
            .filter(cattle::Column::Id.is_in(dam_ids))
            .filter(cattle::Column::IsActive.eq(true))
            .order_by_asc(cattle::Column::TagNumber)
            .all(&self.db)
            .await?;

        Ok(dams
            .into_iter()
            .map(|dam| EligibleDam {
                cattle_id: dam.id,
                tag_number: dam.tag_number,
                name: dam.name,
            })
            .collect())
    }

    async fn eligible_dam(&self, dam_id: i32, today: NaiveDate) -> CoreResult<cattle::Model> {
        let dam = cattle::Entity::find_by_id(dam_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("cattle", dam_id.to_string()))?;

        let past_steaming = breeding_records::Entity::find()
            .filter(breeding_records::Column::CattleId.eq(dam.id))
            .filter(
                breeding_records::Column::SteamingDate.lte(today.format(DATE_FORMAT).to_string()),
            )
            .one(&self.db)
            .await?;

        if !dam.is_active || past_steaming.is_none() {
            return Err(CoreError::invalid_field(
                "dam_id",
                "Dam must have a breeding record and be past its steaming date",
            ));
        }
        Ok(dam)
    }

    pub async fn add(
        &self,
        actor: &Actor,
        input: NewCalving,
        today: NaiveDate,
    ) -> CoreResult<CalvingOutcome> {
        let birth_date = parse_event_date("calving", &input.birth_date)?;
        let calf_sex: Sex = input.calf_sex.parse()?;
        let dam = self.eligible_dam(input.dam_id, today).await?;

        let calf_name = clean(input.calf_name);
        let breed = clean(input.breed);
        let condition = clean(input.calf_condition);
        let birth = birth_date.format(DATE_FORMAT).to_string();
        let now = chrono::Utc::now();

        let txn = self.db.begin().await?;

        let calf = if calf_survived(condition.as_deref()) {
            let existing: Vec<String> = cattle::Entity::find()
                .select_only()
                .column(cattle::Column::TagNumber)
                .filter(cattle::Column::TagNumber.starts_with(CALF_TAG_PREFIX))
                .into_tuple()
                .all(&txn)
                .await?;
            let next = existing
                .iter()
                .filter_map(|tag| calf_tag_sequence(tag))
                .max()
                .unwrap_or(0)
                + 1;

            let classification = classify(calf_sex, birth_date, None, None, today);
            let mut calf = cattle::ActiveModel::new();
            calf.tag_number = Set(format!("{}{:04}", CALF_TAG_PREFIX, next));
            calf.name = Set(calf_name.clone());
            calf.breed = Set(breed.clone());
            calf.sex = Set(calf_sex.code().to_string());
            calf.birth_date = Set(Some(birth.clone()));
            calf.status_category = Set(Some(classification.category.as_str().to_string()));
            calf.status = Set(Some(classification.status.as_str().to_string()));
            calf.recorded_by = Set(Some(actor.username.clone()));
            calf.remark = Set(Some("active".to_string()));
            Some(calf.insert(&txn).await?)
        } else {
            None
        };

        let record = calving::ActiveModel {
            dam_id: Set(dam.id),
            dam_tag_number: Set(dam.tag_number.clone()),
            dam_name: Set(dam.name.clone()),
            calf_id: Set(calf.as_ref().map(|c| c.id)),
            calf_name: Set(calf_name),
            calf_sex: Set(calf_sex.code().to_string()),
            birth_date: Set(birth),
            breed: Set(breed),
            calf_condition: Set(condition),
            notes: Set(clean(input.notes)),
            recorded_by: Set(Some(actor.username.clone())),
            remark: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        match &calf {
            Some(calf) => info!(
                "Calving recorded for {}: calf {} registered by {}",
                dam.tag_number, calf.tag_number, actor.username
            ),
            None => info!(
                "Calving recorded for {} (calf not surviving) by {}",
                dam.tag_number, actor.username
            ),
        }

        self.status.sweep_after(StatusTrigger::Calving, today).await;
        Ok(CalvingOutcome {
            calving: record,
            calf,
        })
    }

    pub async fn list(&self) -> CoreResult<Vec<calving::Model>> {
        Ok(calving::Entity::find()
            .filter(calving::Column::IsActive.eq(true))
            .order_by_desc(calving::Column::BirthDate)
            .order_by_desc(calving::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn archive(
        &self,
        actor: &Actor,
        calving_id: i32,
        remark: Option<String>,
    ) -> CoreResult<calving::Model> {
        require_admin(actor, "archive calving records")?;
        let record = calving::Entity::find_by_id(calving_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("calving", calving_id.to_string()))?;

        let mut active: calving::ActiveModel = record.into();
        active.is_active = Set(false);
        active.remark = Set(Some(
            clean(remark).unwrap_or_else(|| DEFAULT_ARCHIVE_REMARK.to_string()),
        ));
        active.updated_at = Set(chrono::Utc::now());
        let archived = active.update(&self.db).await?;

        info!("Calving {} archived by {}", calving_id, actor.username);
        Ok(archived)
    }

    pub async fn delete(&self, actor: &Actor, calving_id: i32) -> CoreResult<()> {
        require_admin(actor, "delete calving records")?;
        let result = calving::Entity::delete_by_id(calving_id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(CoreError::not_found("calving", calving_id.to_string()));
        }
        info!("Calving {} deleted by {}", calving_id, actor.username);
        Ok(())
    }
}

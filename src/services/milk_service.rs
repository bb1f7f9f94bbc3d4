use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{require_admin, Actor};
use crate::database::entities::{cattle, milk_production};
use crate::errors::{CoreError, CoreResult};
use crate::status::classifier::parse_event_date;
use crate::status::{CattleStatus, Sex, DATE_FORMAT};

const WEEKLY_WINDOW_DAYS: u64 = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilkSession {
    Morning,
    MidDay,
    Evening,
}

impl MilkSession {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilkSession::Morning => "morning",
            MilkSession::MidDay => "mid_day",
            MilkSession::Evening => "evening",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RecordMilk {
    pub cattle_id: i32,
    /// Defaults to today.
    pub date: Option<String>,
    pub session: MilkSession,
    pub quantity: f64,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MilkFilter {
    pub cattle_id: Option<i32>,
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditMilk {
    pub morning_milk: Option<f64>,
    pub mid_day_milk: Option<f64>,
    pub evening_milk: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MilkRecordView {
    #[serde(flatten)]
    pub record: milk_production::Model,
    pub name: Option<String>,
    pub tag_number: String,
    pub total_milk: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailySheetRow {
    pub cattle_id: i32,
    pub tag_number: String,
    pub name: Option<String>,
    pub sessions_saved: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MilkTotals {
    pub weekly_total: f64,
    pub monthly_total: f64,
}

fn check_quantity(field: &str, value: Option<f64>) -> CoreResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CoreError::invalid_field(
            field,
            "Milk quantity must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

fn is_milking(animal: &cattle::Model) -> bool {
    let female = animal.sex.parse::<Sex>().ok() == Some(Sex::Female);
    let milking = animal
        .status
        .as_deref()
        .and_then(|s| s.parse::<CattleStatus>().ok())
        .is_some_and(|s| s.is_milking());
    female && milking
}

/// Sum of record totals inside the last seven days and inside the
/// calendar month of `today`.
pub fn summarize(records: &[milk_production::Model], today: NaiveDate) -> MilkTotals {
    let week_start = today
        .checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let mut totals = MilkTotals {
        weekly_total: 0.0,
        monthly_total: 0.0,
    };
    for record in records {
        let Some(day) = crate::status::parse_record_date(&record.date) else {
            continue;
        };
        let total = record.total();
        if day >= week_start {
            totals.weekly_total += total;
        }
        if day.year() == today.year() && day.month() == today.month() {
            totals.monthly_total += total;
        }
    }
    totals
}

#[derive(Clone)]
pub struct MilkService {
    db: DatabaseConnection,
}

impl MilkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves one session's yield, creating the day's row on first use.
    pub async fn record(
        &self,
        actor: &Actor,
        input: RecordMilk,
        today: NaiveDate,
    ) -> CoreResult<milk_production::Model> {
        check_quantity("quantity", Some(input.quantity))?;
        let day = match input.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(d) => parse_event_date("milking", d)?,
            None => today,
        };
        let day = day.format(DATE_FORMAT).to_string();

        let animal = cattle::Entity::find_by_id(input.cattle_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("cattle", input.cattle_id.to_string()))?;
        if !animal.is_active || !is_milking(&animal) {
            return Err(CoreError::invalid_field(
                "cattle_id",
                format!("{} is not a lactating cow", animal.tag_number),
            ));
        }

        let existing = milk_production::Entity::find()
            .filter(milk_production::Column::CattleId.eq(animal.id))
            .filter(milk_production::Column::Date.eq(day.clone()))
            .one(&self.db)
            .await?;

        let now = chrono::Utc::now();
        let quantity = Some(input.quantity);
        let notes = input
            .notes
            .map(|n| n.trim().to_string())
            .map(|n| Some(n).filter(|n| !n.is_empty()));

        let mut row: milk_production::ActiveModel = match &existing {
            Some(record) => record.clone().into(),
            None => milk_production::ActiveModel {
                cattle_id: Set(animal.id),
                date: Set(day.clone()),
                morning_milk: Set(None),
                mid_day_milk: Set(None),
                evening_milk: Set(None),
                notes: Set(None),
                created_at: Set(now),
                ..Default::default()
            },
        };
        match input.session {
            MilkSession::Morning => row.morning_milk = Set(quantity),
            MilkSession::MidDay => row.mid_day_milk = Set(quantity),
            MilkSession::Evening => row.evening_milk = Set(quantity),
        }
        if let Some(notes) = notes {
            row.notes = Set(notes);
        }
        row.updated_at = Set(now);

        let saved = match existing {
            Some(_) => row.update(&self.db).await?,
            None => row.insert(&self.db).await?,
        };

        info!(
            "{} session saved for {} on {}: {} by {}",
            input.session.as_str(),
            animal.tag_number,
            day,
            input.quantity,
            actor.username
        );
        Ok(saved)
    }

    /// Milking cows with the number of sessions already saved for `day`.
    pub async fn daily_sheet(&self, day: NaiveDate) -> CoreResult<Vec<DailySheetRow>> {
        let day = day.format(DATE_FORMAT).to_string();
        let cows = cattle::Entity::find()
            .filter(cattle::Column::IsActive.eq(true))
            .filter(cattle::Column::Sex.eq(Sex::Female.code()))
            .filter(cattle::Column::Status.is_in([
                CattleStatus::Lactating.as_str(),
                CattleStatus::LactatingInCalf.as_str(),
            ]))
            .order_by_asc(cattle::Column::Id)
            .all(&self.db)
            .await?;

        let saved: HashMap<i32, usize> = milk_production::Entity::find()
            .filter(milk_production::Column::Date.eq(day))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|record| (record.cattle_id, record.sessions_saved()))
            .collect();

        Ok(cows
            .into_iter()
            .map(|cow| DailySheetRow {
                sessions_saved: saved.get(&cow.id).copied().unwrap_or(0),
                cattle_id: cow.id,
                tag_number: cow.tag_number,
                name: cow.name,
            })
            .collect())
    }

    pub async fn list(&self, filter: &MilkFilter) -> CoreResult<Vec<MilkRecordView>> {
        let mut query = milk_production::Entity::find();
        if let Some(cattle_id) = filter.cattle_id {
            query = query.filter(milk_production::Column::CattleId.eq(cattle_id));
        }
        if let Some(day) = filter.date.as_deref().filter(|d| !d.trim().is_empty()) {
            let day = parse_event_date("milking", day)?;
            query = query.filter(milk_production::Column::Date.eq(day.format(DATE_FORMAT).to_string()));
        }

        let rows = query
            .find_also_related(cattle::Entity)
            .order_by_desc(milk_production::Column::Date)
            .order_by_desc(milk_production::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(record, animal)| {
                animal.map(|animal| MilkRecordView {
                    total_milk: record.total(),
                    record,
                    name: animal.name,
                    tag_number: animal.tag_number,
                })
            })
            .collect())
    }

    pub async fn totals(&self, today: NaiveDate) -> CoreResult<MilkTotals> {
        let month_start = today.with_day(1).unwrap_or(today);
        let week_start = today
            .checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let from = month_start.min(week_start).format(DATE_FORMAT).to_string();

        let records = milk_production::Entity::find()
            .filter(milk_production::Column::Date.gte(from))
            .all(&self.db)
            .await?;
        let totals = summarize(&records, today);
        debug!(
            "Milk totals on {}: week {}, month {}",
            today, totals.weekly_total, totals.monthly_total
        );
        Ok(totals)
    }

    pub async fn edit(
        &self,
        actor: &Actor,
        record_id: i32,
        input: EditMilk,
    ) -> CoreResult<milk_production::Model> {
        require_admin(actor, "edit milk records")?;
        check_quantity("morning_milk", input.morning_milk)?;
        check_quantity("mid_day_milk", input.mid_day_milk)?;
        check_quantity("evening_milk", input.evening_milk)?;

        let record = milk_production::Entity::find_by_id(record_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("milk_record", record_id.to_string()))?;

        let mut active: milk_production::ActiveModel = record.into();
        active.morning_milk = Set(input.morning_milk);
        active.mid_day_milk = Set(input.mid_day_milk);
        active.evening_milk = Set(input.evening_milk);
        active.updated_at = Set(chrono::Utc::now());
        let updated = active.update(&self.db).await?;

        info!("Milk record {} edited by {}", record_id, actor.username);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, record_id: i32) -> CoreResult<()> {
        require_admin(actor, "delete milk records")?;
        let result = milk_production::Entity::delete_by_id(record_id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(CoreError::not_found("milk_record", record_id.to_string()));
        }
        info!("Milk record {} deleted by {}", record_id, actor.username);
        Ok(())
    }
}

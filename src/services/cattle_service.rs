use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{require_admin, Actor};
use crate::database::entities::cattle;
use crate::database::SeaOrmHerdRepository;
use crate::errors::{CoreError, CoreResult, StatusError};
use crate::services::status_service::{StatusService, StatusTrigger};
use crate::status::classifier::parse_birth_date;
use crate::status::{
    age_in_months, classify, CattleStatus, Classification, Sex, StatusCategory, DATE_FORMAT,
};

const TAG_PREFIX: &str = "TNF";
const DEFAULT_ARCHIVE_REMARK: &str = "deleted";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterCattle {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub birth_date: String,
    pub sex: String,
    pub remark: Option<String>,
    /// Required for females older than ten months.
    pub status_category: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCattle {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub remark: Option<String>,
    pub status_category: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CattleQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
    pub sex: Option<String>,
    pub status_category: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CattlePage {
    pub cattle: Vec<cattle::Model>,
    pub page: u64,
    pub page_size: u64,
    pub total_records: u64,
    pub total_pages: u64,
}

/// Status given to a newly registered animal.
///
/// Males and females up to ten months old get the age rule. Older females
/// cannot be placed by age alone, so the caller chooses: young stock are
/// always `bullying heifer`, mature stock take the submitted label.
pub fn initial_status(
    sex: Sex,
    birth_date: NaiveDate,
    status_category: Option<&str>,
    status: Option<&str>,
    today: NaiveDate,
) -> CoreResult<Classification> {
    if sex == Sex::Male || age_in_months(birth_date, today) <= 10 {
        return Ok(classify(sex, birth_date, None, None, today));
    }

    let category = status_category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            CoreError::invalid_field(
                "status_category",
                "Status category is required for females older than 10 months",
            )
        })?
        .parse::<StatusCategory>()?;

    match category {
        StatusCategory::YoungStock => Ok(Classification::new(
            StatusCategory::YoungStock,
            CattleStatus::BullyingHeifer,
        )?),
        StatusCategory::MatureStock => {
            let status = status.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
                CoreError::invalid_field("status", "Select a status for mature stock")
            })?;
            Ok(Classification::parse(category.as_str(), status)?)
        }
        StatusCategory::Bull => Err(StatusError::InvalidPair {
            category: category.as_str().to_string(),
            status: "female".to_string(),
        }
        .into()),
    }
}

/// Number part of a `TNF0042/03/2024` style tag.
fn tag_sequence(tag: &str) -> Option<u32> {
    tag.strip_prefix(TAG_PREFIX)?
        .split('/')
        .next()?
        .parse()
        .ok()
}

pub fn format_tag(sequence: u32, today: NaiveDate) -> String {
    format!(
        "{}{:04}/{:02}/{}",
        TAG_PREFIX,
        sequence,
        today.month(),
        today.year()
    )
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct CattleService {
    db: DatabaseConnection,
    status: StatusService<SeaOrmHerdRepository>,
    page_size: u64,
}

impl CattleService {
    pub fn new(db: DatabaseConnection, page_size: u64) -> Self {
        let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
        Self {
            db,
            status,
            page_size: page_size.max(1),
        }
    }

    pub async fn list(&self, query: &CattleQuery) -> CoreResult<CattlePage> {
        let mut condition = Condition::all().add(cattle::Column::IsActive.eq(true));

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let keyword = format!("%{}%", search.to_lowercase());
            let lowered = |column: cattle::Column| {
                Expr::expr(Func::lower(Expr::col(column))).like(keyword.clone())
            };
            condition = condition.add(
                Condition::any()
                    .add(lowered(cattle::Column::Name))
                    .add(lowered(cattle::Column::TagNumber))
                    .add(lowered(cattle::Column::Breed)),
            );
        }

        if let Some(sex) = query.sex.as_deref().filter(|s| !s.trim().is_empty()) {
            let sex: Sex = sex.parse()?;
            condition = condition.add(cattle::Column::Sex.eq(sex.code()));
        }

        if let Some(category) = query
            .status_category
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            let category: StatusCategory = category.parse()?;
            condition = condition.add(cattle::Column::StatusCategory.eq(category.as_str()));
        }

        let paginator = cattle::Entity::find()
            .filter(condition)
            .order_by_desc(cattle::Column::Id)
            .paginate(&self.db, self.page_size);

        let totals = paginator.num_items_and_pages().await?;
        let page = query.page.unwrap_or(1).max(1);
        let cattle = paginator.fetch_page(page - 1).await?;

        Ok(CattlePage {
            cattle,
            page,
            page_size: self.page_size,
            total_records: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn get(&self, cattle_id: i32) -> CoreResult<cattle::Model> {
        cattle::Entity::find_by_id(cattle_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("cattle", cattle_id.to_string()))
    }

    async fn next_tag(&self, today: NaiveDate) -> CoreResult<String> {
        let latest = cattle::Entity::find()
            .filter(cattle::Column::TagNumber.starts_with(TAG_PREFIX))
            .order_by_desc(cattle::Column::Id)
            .one(&self.db)
            .await?;

        let next = latest
            .as_ref()
            .and_then(|animal| tag_sequence(&animal.tag_number))
            .map_or(1, |n| n + 1);
        Ok(format_tag(next, today))
    }

    pub async fn register(
        &self,
        actor: &Actor,
        input: RegisterCattle,
        today: NaiveDate,
    ) -> CoreResult<cattle::Model> {
        let birth_date = parse_birth_date(Some(&input.birth_date))?;
        let sex: Sex = input.sex.parse()?;
        let classification = initial_status(
            sex,
            birth_date,
            input.status_category.as_deref(),
            input.status.as_deref(),
            today,
        )?;
        let tag_number = self.next_tag(today).await?;

        let mut animal = cattle::ActiveModel::new();
        animal.tag_number = Set(tag_number);
        animal.name = Set(clean(input.name));
        animal.breed = Set(clean(input.breed));
        animal.sex = Set(sex.code().to_string());
        animal.birth_date = Set(Some(birth_date.format(DATE_FORMAT).to_string()));
        animal.status_category = Set(Some(classification.category.as_str().to_string()));
        animal.status = Set(Some(classification.status.as_str().to_string()));
        animal.recorded_by = Set(Some(actor.username.clone()));
        animal.remark = Set(clean(input.remark));

        let animal = animal.insert(&self.db).await?;
        info!(
            "Registered {} ({}) as {} by {}",
            animal.tag_number,
            animal.name.as_deref().unwrap_or("Unnamed"),
            classification,
            actor.username
        );

        self.status
            .sweep_after(StatusTrigger::Registration, today)
            .await;
        self.get(animal.id).await
    }

    /// Admin correction of an animal. A manual status stays until a rule
    /// recomputes it.
    pub async fn update(
        &self,
        actor: &Actor,
        cattle_id: i32,
        input: UpdateCattle,
    ) -> CoreResult<cattle::Model> {
        require_admin(actor, "edit cattle")?;
        let existing = self.get(cattle_id).await?;
        let mut animal: cattle::ActiveModel = existing.clone().into();

        if let Some(name) = input.name {
            animal.name = Set(clean(Some(name)));
        }
        if let Some(breed) = input.breed {
            animal.breed = Set(clean(Some(breed)));
        }
        if let Some(remark) = input.remark {
            animal.remark = Set(clean(Some(remark)));
        }
        if let Some(birth_date) = input.birth_date {
            let parsed = parse_birth_date(Some(&birth_date))?;
            animal.birth_date = Set(Some(parsed.format(DATE_FORMAT).to_string()));
        }
        if let Some(sex) = input.sex {
            let sex: Sex = sex.parse()?;
            animal.sex = Set(sex.code().to_string());
        }

        if input.status_category.is_some() || input.status.is_some() {
            let category = input
                .status_category
                .or(existing.status_category)
                .ok_or_else(|| {
                    CoreError::invalid_field("status_category", "Status category is required")
                })?;
            let classification = match (category.parse::<StatusCategory>()?, input.status) {
                (StatusCategory::YoungStock, None) => Classification::new(
                    StatusCategory::YoungStock,
                    CattleStatus::BullyingHeifer,
                )?,
                (_, Some(status)) => Classification::parse(&category, &status)?,
                (_, None) => {
                    return Err(CoreError::invalid_field("status", "Status is required"));
                }
            };
            animal.status_category = Set(Some(classification.category.as_str().to_string()));
            animal.status = Set(Some(classification.status.as_str().to_string()));
        }

        let updated = animal.set_updated_at().update(&self.db).await?;
        info!("Cattle {} edited by {}", updated.tag_number, actor.username);
        Ok(updated)
    }

    pub async fn archive(
        &self,
        actor: &Actor,
        cattle_id: i32,
        remark: Option<String>,
    ) -> CoreResult<cattle::Model> {
        require_admin(actor, "archive cattle")?;
        let existing = self.get(cattle_id).await?;
        let remark = clean(remark).unwrap_or_else(|| DEFAULT_ARCHIVE_REMARK.to_string());

        let active: cattle::ActiveModel = existing.into();
        let archived = active.archive(remark).update(&self.db).await?;
        info!(
            "Cattle {} archived by {}: {}",
            archived.tag_number,
            actor.username,
            archived.remark.as_deref().unwrap_or_default()
        );
        Ok(archived)
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

    fn admin() -> Actor {
        Actor::new(1, "admin", UserRole::Admin)
    }

    fn worker() -> Actor {
        Actor::new(2, "herder", UserRole::Worker)
    }

    #[test]
    fn tag_format_and_sequence() {
        let tag = format_tag(7, date("2024-03-15"));
        assert_eq!(tag, "TNF0007/03/2024");
        assert_eq!(tag_sequence(&tag), Some(7));
        assert_eq!(tag_sequence("CLF0001"), None);
    }

    #[test]
    fn older_female_needs_category() {
        let today = date("2024-06-01");
        let born = date("2022-01-01");

        let err = initial_status(Sex::Female, born, None, None, today).unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);

        let young = initial_status(Sex::Female, born, Some("young_stock"), Some("dry"), today)
            .unwrap();
        assert_eq!(young.status, CattleStatus::BullyingHeifer);

        let mature =
            initial_status(Sex::Female, born, Some("mature_stock"), Some("dry"), today).unwrap();
        assert_eq!(mature.status, CattleStatus::Dry);

        assert!(initial_status(Sex::Female, born, Some("mature_stock"), Some("weaned"), today)
            .is_err());
        assert!(initial_status(Sex::Female, born, Some("mature_stock"), None, today).is_err());
    }

    #[test]
    fn young_female_and_males_use_age() {
        let today = date("2024-06-01");
        let calf = initial_status(Sex::Female, date("2024-01-01"), None, None, today).unwrap();
        assert_eq!(calf.status, CattleStatus::Weaned);

        let bull = initial_status(Sex::Male, date("2021-01-01"), Some("young_stock"), None, today)
            .unwrap();
        assert_eq!(bull.status, CattleStatus::MatureBull);
    }

    #[tokio::test]
    async fn register_assigns_sequential_tags() {
        let db = setup_test_db().await.unwrap();
        let service = CattleService::new(db, 10);
        let today = date("2024-03-15");

        let first = service
            .register(
                &worker(),
                RegisterCattle {
                    name: Some("Daisy".into()),
                    birth_date: "2024-01-20".into(),
                    sex: "F".into(),
                    ..Default::default()
                },
                today,
            )
            .await
            .unwrap();
        let second = service
            .register(
                &worker(),
                RegisterCattle {
                    birth_date: "2023-01-20".into(),
                    sex: "male".into(),
                    ..Default::default()
                },
                today,
            )
            .await
            .unwrap();

        assert_eq!(first.tag_number, "TNF0001/03/2024");
        assert_eq!(second.tag_number, "TNF0002/03/2024");
        assert_eq!(first.status.as_deref(), Some("newborn calf"));
        assert_eq!(second.status_category.as_deref(), Some("bull"));
        assert_eq!(second.recorded_by.as_deref(), Some("herder"));
    }

    #[tokio::test]
    async fn register_rejects_bad_birth_date() {
        let db = setup_test_db().await.unwrap();
        let service = CattleService::new(db, 10);
        let err = service
            .register(
                &worker(),
                RegisterCattle {
                    birth_date: "20/01/2024".into(),
                    sex: "F".into(),
                    ..Default::default()
                },
                date("2024-03-15"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let db = setup_test_db().await.unwrap();
        let service = CattleService::new(db, 2);
        let today = date("2024-03-15");

        for (name, sex, born) in [
            ("Daisy", "F", "2024-01-01"),
            ("Bella", "F", "2023-12-01"),
            ("Duke", "M", "2021-01-01"),
        ] {
            service
                .register(
                    &worker(),
                    RegisterCattle {
                        name: Some(name.into()),
                        breed: Some("Friesian".into()),
                        birth_date: born.into(),
                        sex: sex.into(),
                        ..Default::default()
                    },
                    today,
                )
                .await
                .unwrap();
        }

        let all = service.list(&CattleQuery::default()).await.unwrap();
        assert_eq!(all.total_records, 3);
        assert_eq!(all.total_pages, 2);
        assert_eq!(all.cattle.len(), 2);
        assert_eq!(all.cattle[0].name.as_deref(), Some("Duke"));

        let search = service
            .list(&CattleQuery {
                search: Some("dAi".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.total_records, 1);

        let bulls = service
            .list(&CattleQuery {
                status_category: Some("bull".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(bulls.total_records, 1);

        let females = service
            .list(&CattleQuery {
                sex: Some("female".into()),
                page: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(females.total_records, 2);
    }

    #[tokio::test]
    async fn admin_edit_and_archive() {
        let db = setup_test_db().await.unwrap();
        let service = CattleService::new(db, 10);
        let cow = service
            .register(
                &worker(),
                RegisterCattle {
                    birth_date: "2020-01-01".into(),
                    sex: "F".into(),
                    status_category: Some("mature_stock".into()),
                    status: Some("lactating".into()),
                    ..Default::default()
                },
                date("2024-03-15"),
            )
            .await
            .unwrap();
        // No breeding or calving on record, so the sweep places her by age.
        assert_eq!(cow.status.as_deref(), Some("bullying heifer"));

        let refused = service
            .update(&worker(), cow.id, UpdateCattle::default())
            .await
            .unwrap_err();
        assert_eq!(refused.kind(), CoreErrorKind::Forbidden);

        let bad_pair = service
            .update(
                &admin(),
                cow.id,
                UpdateCattle {
                    status_category: Some("bull".into()),
                    status: Some("dry".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(bad_pair.kind(), CoreErrorKind::Validation);

        let edited = service
            .update(
                &admin(),
                cow.id,
                UpdateCattle {
                    name: Some("Clover".into()),
                    status_category: Some("mature_stock".into()),
                    status: Some("dry".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.name.as_deref(), Some("Clover"));
        assert_eq!(edited.status.as_deref(), Some("dry"));

        let archived = service.archive(&admin(), cow.id, None).await.unwrap();
        assert!(!archived.is_active);
        assert_eq!(archived.remark.as_deref(), Some("deleted"));

        let listed = service.list(&CattleQuery::default()).await.unwrap();
        assert_eq!(listed.total_records, 0);
    }
}

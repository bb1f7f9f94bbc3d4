//! Status sweep tests
//!
//! Walks a cow through her lifecycle against a real database and checks the
//! stored category and status after each sweep.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use herdbook::database::entities::{breeding_records, calving, cattle};
use herdbook::database::{setup_database, SeaOrmHerdRepository};
use herdbook::services::StatusService;
use herdbook::status::{pregnancy_check_date, steaming_date};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use tempfile::NamedTempFile;

async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn add_animal(
    db: &DatabaseConnection,
    tag: &str,
    sex: &str,
    birth_date: &str,
) -> Result<cattle::Model> {
    let mut animal = cattle::ActiveModel::new();
    animal.tag_number = Set(tag.to_string());
    animal.sex = Set(sex.to_string());
    animal.birth_date = Set(Some(birth_date.to_string()));
    Ok(animal.insert(db).await?)
}

async fn add_breeding(db: &DatabaseConnection, cattle_id: i32, on: &str) -> Result<()> {
    let bred = date(on);
    breeding_records::ActiveModel {
        cattle_id: Set(cattle_id),
        method: Set("natural".to_string()),
        breeding_date: Set(on.to_string()),
        breeding_attempt_number: Set(1),
        steaming_date: Set(steaming_date(bred).format("%Y-%m-%d").to_string()),
        pregnancy_check_date: Set(pregnancy_check_date(bred).format("%Y-%m-%d").to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn add_calving(db: &DatabaseConnection, dam: &cattle::Model, on: &str) -> Result<calving::Model> {
    let now = Utc::now();
    Ok(calving::ActiveModel {
        dam_id: Set(dam.id),
        dam_tag_number: Set(dam.tag_number.clone()),
        calf_sex: Set("F".to_string()),
        birth_date: Set(on.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

async fn stored(db: &DatabaseConnection, id: i32) -> Result<(Option<String>, Option<String>)> {
    let animal = cattle::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("animal {} missing", id))?;
    Ok((animal.status_category, animal.status))
}

fn pair(category: &str, status: &str) -> (Option<String>, Option<String>) {
    (Some(category.to_string()), Some(status.to_string()))
}

#[tokio::test]
async fn test_cow_lifecycle() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
    let cow = add_animal(&db, "TNF0001/01/2021", "F", "2021-01-10").await?;

    status.sweep(date("2021-03-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "newborn calf"));

    status.sweep(date("2021-09-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "weaned"));

    status.sweep(date("2023-05-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "bullying heifer"));

    add_breeding(&db, cow.id, "2023-06-01").await?;
    status.sweep(date("2023-06-02")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "in_calf heifer"));

    let first_calving = add_calving(&db, &cow, "2024-03-10").await?;
    status.sweep(date("2024-03-15")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("mature_stock", "lactating"));

    add_breeding(&db, cow.id, "2024-05-01").await?;
    status.sweep(date("2024-06-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("mature_stock", "lactating in_calf"));

    status.sweep(date("2024-12-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("mature_stock", "dry"));

    // An archived calving no longer counts as the latest one.
    let mut archived: calving::ActiveModel = first_calving.into();
    archived.is_active = Set(false);
    archived.update(&db).await?;
    status.sweep(date("2024-12-02")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "in_calf heifer"));

    Ok(())
}

#[tokio::test]
async fn test_sweep_is_idempotent_and_skips_bad_rows() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
    let today = date("2024-06-15");

    let bull = add_animal(&db, "TNF0001/06/2024", "M", "2023-01-01").await?;
    let broken = add_animal(&db, "TNF0002/06/2024", "F", "15/01/2023").await?;
    let sold = add_animal(&db, "TNF0003/06/2024", "M", "2024-05-01").await?;
    let mut inactive: cattle::ActiveModel = sold.into();
    inactive.is_active = Set(false);
    let sold = inactive.update(&db).await?;

    let first = status.sweep(today).await?;
    assert_eq!(first.examined, 2);
    assert_eq!(first.updated, 1);
    assert_eq!(first.skipped, 1);
    assert_eq!(stored(&db, bull.id).await?, pair("bull", "yearling"));
    assert_eq!(stored(&db, broken.id).await?, (None, None));
    assert_eq!(stored(&db, sold.id).await?, (None, None));

    let second = status.sweep(today).await?;
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 1);

    Ok(())
}

#[tokio::test]
async fn test_unpadded_event_date_skips_the_animal() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let status = StatusService::new(SeaOrmHerdRepository::new(db.clone()));
    let cow = add_animal(&db, "TNF0001/01/2020", "F", "2020-01-01").await?;

    status.sweep(date("2024-01-01")).await?;
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "bullying heifer"));

    // "2024-3-5" sorts after "2024-10-01" as text, so it must not be taken
    // as the latest service.
    add_breeding(&db, cow.id, "2024-3-5").await?;
    add_breeding(&db, cow.id, "2024-10-01").await?;

    let report = status.sweep(date("2024-11-01")).await?;
    assert_eq!(report.skipped, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(stored(&db, cow.id).await?, pair("young_stock", "bullying heifer"));

    Ok(())
}

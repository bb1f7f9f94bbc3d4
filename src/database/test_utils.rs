use sea_orm::{Database, DatabaseConnection, DbErr};

use super::connection::setup_database;

/// In-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    setup_database(&db).await?;
    Ok(db)
}

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::config::HerdConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::services::{scheduler::spawn_status_sweeps, LogNotifier};

pub use app::{create_app, AppState};
pub use error::{ApiError, ApiResult};
pub use extract::CurrentUser;

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: HerdConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let port = config.port;
    let sweep_interval = config.sweep_interval_hours;
    let state = AppState::new(db, config, Arc::new(LogNotifier));
    let _sweeps = spawn_status_sweeps(state.status.clone(), sweep_interval);
    info!("Status sweeps scheduled every {} hour(s)", sweep_interval);

    let app = create_app(state)?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /api/v1/auth/*              - Login, logout, password recovery");
    info!("  /api/v1/profile, /users     - Accounts");
    info!("  /api/v1/cattle              - Herd register");
    info!("  /api/v1/breeding, /calving  - Reproduction records");
    info!("  /api/v1/milk                - Milk production");
    info!("  /api/v1/dashboard           - Herd summary");
    info!("  /api/v1/status/sweep        - Manual status sweep (admin)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::fresh(&db).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

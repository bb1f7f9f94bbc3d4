use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use herdbook::config::HerdConfig;
use herdbook::database::{establish_connection, get_database_url, setup_database, SeaOrmHerdRepository};
use herdbook::server;
use herdbook::services::user_service::NewUser;
use herdbook::services::{StatusService, UserService};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// YAML settings file; flags override its values
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Reclassify every active animal once and exit
    Sweep {
        #[clap(short, long)]
        database: Option<String>,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "herdbook.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = "herdbook.db")]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create an administrator account, e.g. the first one on a new install
    CreateAdmin {
        #[clap(short, long)]
        username: String,
        #[clap(short, long)]
        password: String,
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);
    let mut config = HerdConfig::load_or_default(args.config.as_deref())?;

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(database) = database {
                config.database = database;
            }
            if cors_origin.is_some() {
                config.cors_origin = cors_origin;
            }
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                setup_database(&db).await?;
                info!("Database initialized");
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Migrating database: {}", database);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::Sweep { database } => {
            let database = database.unwrap_or(config.database);
            let db = establish_connection(&get_database_url(Some(&database))).await?;
            setup_database(&db).await?;
            let today = chrono::Local::now().date_naive();
            let report = StatusService::new(SeaOrmHerdRepository::new(db))
                .sweep(today)
                .await?;
            info!(
                "Sweep for {}: examined {}, updated {}, unchanged {}, skipped {}",
                today, report.examined, report.updated, report.unchanged, report.skipped
            );
        }
        Commands::User { command } => match command {
            UserCommands::CreateAdmin {
                username,
                password,
                database,
            } => {
                let database = database.unwrap_or(config.database);
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                setup_database(&db).await?;
                let admin = UserService::new(db)
                    .create_user(NewUser {
                        username,
                        password,
                        role: "admin".to_string(),
                        ..Default::default()
                    })
                    .await?;
                info!("Administrator {} created with id {}", admin.username, admin.id);
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}

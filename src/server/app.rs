use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{auth, breeding, calving, cattle, dashboard, health, milk, status, users};
use crate::config::HerdConfig;
use crate::database::SeaOrmHerdRepository;
use crate::services::{
    AuthService, AuthSettings, BreedingService, CalvingService, CattleService, DashboardService,
    MilkService, ResetNotifier, StatusService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<HerdConfig>,
    pub auth: AuthService,
    pub users: UserService,
    pub cattle: CattleService,
    pub breeding: BreedingService,
    pub calving: CalvingService,
    pub milk: MilkService,
    pub dashboard: DashboardService,
    pub status: StatusService<SeaOrmHerdRepository>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: HerdConfig,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        let settings = AuthSettings {
            session_ttl_hours: config.session_ttl_hours,
            reset_token_ttl_minutes: config.reset_token_ttl_minutes,
            public_base_url: config.public_base_url.clone(),
        };

        Self {
            auth: AuthService::new(db.clone(), notifier, settings),
            users: UserService::new(db.clone()),
            cattle: CattleService::new(db.clone(), config.page_size),
            breeding: BreedingService::new(db.clone()),
            calving: CalvingService::new(db.clone()),
            milk: MilkService::new(db.clone()),
            dashboard: DashboardService::new(db.clone()),
            status: StatusService::new(SeaOrmHerdRepository::new(db.clone())),
            config: Arc::new(config),
            db,
        }
    }
}

pub fn create_app(state: AppState) -> Result<Router> {
    let cors = match state.config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Sessions and password recovery
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        // Own profile
        .route("/profile", get(users::get_profile).put(users::edit_profile))
        .route("/profile/complete", post(users::complete_profile))
        .route("/profile/password", put(users::change_password))
        // Account administration
        .route("/users", get(users::list_users).post(users::add_user))
        .route("/users/:id", put(users::edit_user).delete(users::delete_user))
        // Herd register
        .route("/cattle", get(cattle::list_cattle).post(cattle::register_cattle))
        .route("/cattle/:id", get(cattle::get_cattle).put(cattle::update_cattle))
        .route("/cattle/:id/archive", post(cattle::archive_cattle))
        // Breeding
        .route("/breeding", get(breeding::list_breeding).post(breeding::add_breeding))
        .route("/breeding/eligible", get(breeding::eligible_animals))
        .route("/breeding/:id/pregnancy", put(breeding::update_pregnancy_result))
        // Calving
        .route("/calving", get(calving::list_calvings).post(calving::add_calving))
        .route("/calving/eligible-dams", get(calving::eligible_dams))
        .route("/calving/:id", delete(calving::delete_calving))
        .route("/calving/:id/archive", post(calving::archive_calving))
        // Milk production
        .route("/milk", get(milk::list_milk).post(milk::record_milk))
        .route("/milk/daily", get(milk::daily_sheet))
        .route("/milk/totals", get(milk::totals))
        .route("/milk/:id", put(milk::edit_milk).delete(milk::delete_milk))
        // Overview
        .route("/dashboard", get(dashboard::summary))
        .route("/status/sweep", post(status::run_sweep))
}

pub mod auth_service;
pub mod breeding_service;
pub mod calving_service;
pub mod cattle_service;
pub mod dashboard_service;
pub mod milk_service;
pub mod scheduler;
pub mod status_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthSettings, LogNotifier, ResetNotifier};
pub use breeding_service::BreedingService;
pub use calving_service::CalvingService;
pub use cattle_service::CattleService;
pub use dashboard_service::DashboardService;
pub use milk_service::MilkService;
pub use status_service::{Outcome, StatusService, StatusTrigger, SweepReport};
pub use user_service::UserService;

pub mod breeding_records;
pub mod calving;
pub mod cattle;
pub mod milk_production;
pub mod user_sessions;
pub mod users;

pub use breeding_records::Entity as BreedingRecords;
pub use calving::Entity as Calving;
pub use cattle::Entity as Cattle;
pub use milk_production::Entity as MilkProduction;
pub use user_sessions::Entity as UserSessions;
pub use users::Entity as Users;

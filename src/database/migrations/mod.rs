pub use sea_orm_migration::prelude::*;

mod m001_create_users;
mod m002_create_herd_tables;
mod m003_create_milk_production;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_users::Migration),
            Box::new(m002_create_herd_tables::Migration),
            Box::new(m003_create_milk_production::Migration),
        ]
    }
}

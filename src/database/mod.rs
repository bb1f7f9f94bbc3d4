pub mod connection;
pub mod entities;
pub mod herd_repository;
pub mod migrations;
pub mod test_utils;

pub use connection::*;
pub use entities::*;
pub use herd_repository::SeaOrmHerdRepository;

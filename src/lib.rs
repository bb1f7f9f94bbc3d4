pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod server;
pub mod services;
pub mod status;

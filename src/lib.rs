pub mod allocation;
pub mod commands;
pub mod config;
pub mod csv_codec;
pub mod database;
pub mod error;
pub mod health;
pub mod metrics;
pub mod period;
pub mod report;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod test_utils;

pub use config::Config;
pub use server::Server;

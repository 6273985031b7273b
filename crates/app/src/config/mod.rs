//! Application configuration

use clap::Args;

use crate::config::{
    db::DatabaseConfig, logging::LoggingConfig, orders::OrdersConfig, payments::PaymentsConfig,
};

pub mod db;
pub mod logging;
pub mod orders;
pub mod payments;

/// Settings shared by every entry point, read from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Payment attempt settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Order numbering settings.
    #[command(flatten)]
    pub orders: OrdersConfig,
}

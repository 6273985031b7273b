use std::error::Error;

use checkout_app::{config::AppConfig, context::AppContext};
use clap::{Parser, Subcommand};

mod db;
mod order;
mod payment;
mod shipping;

#[derive(Debug, Parser)]
#[command(name = "checkout-app", about = "Checkout backoffice CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Shipping(shipping::ShippingCommand),
    Order(order::OrderCommand),
    Payment(payment::PaymentCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command, &self.config).await,
            Commands::Shipping(command) => shipping::run(command, &self.config).await,
            Commands::Order(command) => order::run(command, &self.config).await,
            Commands::Payment(command) => payment::run(command, &self.config).await,
        }
    }
}

/// Connect without touching the schema.
async fn connect(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::from_config(config, false)
        .await
        .map_err(|error| describe(&error))
}

/// Render an error with its full source chain.
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

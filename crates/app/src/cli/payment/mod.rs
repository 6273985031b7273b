use checkout_app::config::AppConfig;
use clap::{Args, Subcommand};

mod confirm;
mod start;

#[derive(Debug, Args)]
pub(crate) struct PaymentCommand {
    #[command(subcommand)]
    command: PaymentSubcommand,
}

#[derive(Debug, Subcommand)]
enum PaymentSubcommand {
    /// Start paying an order with the chosen method
    Start(start::StartPaymentArgs),
    /// Apply a gateway callback to the latest attempt
    Confirm(confirm::ConfirmPaymentArgs),
}

pub(crate) async fn run(command: PaymentCommand, config: &AppConfig) -> Result<(), String> {
    match command.command {
        PaymentSubcommand::Start(args) => start::run(args, config).await,
        PaymentSubcommand::Confirm(args) => confirm::run(args, config).await,
    }
}

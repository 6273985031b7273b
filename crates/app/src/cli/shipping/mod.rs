use checkout_app::config::AppConfig;
use clap::{Args, Subcommand};

mod create;
mod list;
mod seed;

#[derive(Debug, Args)]
pub(crate) struct ShippingCommand {
    #[command(subcommand)]
    command: ShippingSubcommand,
}

#[derive(Debug, Subcommand)]
enum ShippingSubcommand {
    /// Create a shipping method
    Create(create::CreateShippingArgs),
    /// List shipping methods
    List(list::ListShippingArgs),
    /// Create the default shipping methods that do not exist yet
    Seed,
}

pub(crate) async fn run(command: ShippingCommand, config: &AppConfig) -> Result<(), String> {
    match command.command {
        ShippingSubcommand::Create(args) => create::run(args, config).await,
        ShippingSubcommand::List(args) => list::run(args, config).await,
        ShippingSubcommand::Seed => seed::run(config).await,
    }
}

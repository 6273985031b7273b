use checkout_app::config::AppConfig;
use clap::{Args, Subcommand};

mod list;
mod show;
mod transition;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Show an order with its items and status history
    Show(show::ShowOrderArgs),
    /// List orders, newest first
    List(list::ListOrdersArgs),
    /// Move an order to another status
    Transition(transition::TransitionOrderArgs),
}

pub(crate) async fn run(command: OrderCommand, config: &AppConfig) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Show(args) => show::run(args, config).await,
        OrderSubcommand::List(args) => list::run(args, config).await,
        OrderSubcommand::Transition(args) => transition::run(args, config).await,
    }
}

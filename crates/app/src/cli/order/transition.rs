use checkout_app::{config::AppConfig, domain::orders::status::OrderStatus};
use clap::Args;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct TransitionOrderArgs {
    /// Order number
    #[arg(long)]
    number: String,

    /// Target status (pending, processing, paid, shipped, completed, canceled)
    #[arg(long)]
    status: OrderStatus,

    /// Who is making the change
    #[arg(long)]
    actor: Option<String>,

    /// Free-text reason recorded in the status history
    #[arg(long)]
    note: Option<String>,
}

pub(crate) async fn run(args: TransitionOrderArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let order = ctx
        .orders
        .get_order_by_number(&args.number)
        .await
        .map_err(|error| format!("failed to load order: {}", describe(&error)))?;

    let from = order.status;

    let order = ctx
        .orders
        .transition(order.uuid, args.status, args.actor, args.note)
        .await
        .map_err(|error| format!("failed to transition order: {}", describe(&error)))?;

    println!("number: {}", order.number);
    println!("status: {from} -> {}", order.status);

    Ok(())
}

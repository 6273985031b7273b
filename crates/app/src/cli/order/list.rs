use checkout_app::{config::AppConfig, domain::orders::status::OrderStatus};
use clap::Args;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    /// Only orders in this status
    #[arg(long)]
    status: Option<OrderStatus>,
}

pub(crate) async fn run(args: ListOrdersArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let orders = ctx
        .orders
        .list_orders(args.status)
        .await
        .map_err(|error| format!("failed to list orders: {}", describe(&error)))?;

    for order in orders {
        println!(
            "{}\t{}\t{}\t{}",
            order.number, order.status, order.grand_total, order.placed_at
        );
    }

    Ok(())
}

use checkout_app::config::AppConfig;
use clap::Args;
use serde_json::json;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order number, e.g. `SW00000042`
    #[arg(long)]
    number: String,

    /// Print JSON including status history and payments
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: ShowOrderArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let order = ctx
        .orders
        .get_order_by_number(&args.number)
        .await
        .map_err(|error| format!("failed to load order: {}", describe(&error)))?;

    let logs = ctx
        .orders
        .list_status_logs(order.uuid)
        .await
        .map_err(|error| format!("failed to load status history: {}", describe(&error)))?;

    let payments = ctx
        .payments
        .list_payments(order.uuid)
        .await
        .map_err(|error| format!("failed to load payments: {}", describe(&error)))?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&json!({
            "order": order,
            "status_logs": logs,
            "payments": payments,
        }))
        .map_err(|error| format!("failed to render order: {error}"))?;

        println!("{rendered}");

        return Ok(());
    }

    println!("order_uuid: {}", order.uuid);
    println!("number: {}", order.number);
    println!("status: {}", order.status);
    println!("payment_method: {}", order.payment_method);

    for item in &order.items {
        println!(
            "item: {} {} x{} @ {} = {}",
            item.sku,
            item.product_name,
            item.quantity,
            item.unit_price,
            item.line_total()
        );
    }

    println!("subtotal: {}", order.subtotal);
    println!("shipping_cost: {}", order.shipping_cost);
    println!("discount_total: {}", order.discount_total);
    println!("grand_total: {}", order.grand_total);

    for log in &logs {
        println!(
            "status_change: {} {} -> {} by {}",
            log.created_at,
            log.from_status,
            log.to_status,
            log.actor.as_deref().unwrap_or("-")
        );
    }

    if let Some(payment) = payments.first() {
        println!(
            "latest_payment: {} {} {} attempts {}/{}",
            payment.provider,
            payment.status,
            payment.amount,
            payment.attempt_count,
            payment.max_attempts
        );
    }

    Ok(())
}

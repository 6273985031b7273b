use checkout_app::config::AppConfig;
use clap::{Args, ValueEnum};

use crate::cli::{connect, describe};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Outcome {
    Success,
    Failure,
    Cancel,
}

#[derive(Debug, Args)]
pub(crate) struct ConfirmPaymentArgs {
    /// Order number
    #[arg(long)]
    number: String,

    /// What the gateway reported
    #[arg(long, value_enum)]
    outcome: Outcome,

    /// Failure reason stored on the attempt
    #[arg(long, default_value = "payment failed at the gateway")]
    reason: String,
}

pub(crate) async fn run(args: ConfirmPaymentArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let order = ctx
        .orders
        .get_order_by_number(&args.number)
        .await
        .map_err(|error| format!("failed to load order: {}", describe(&error)))?;

    let payment = match args.outcome {
        Outcome::Success => ctx.payments.mark_success(order.uuid).await,
        Outcome::Failure => ctx.payments.mark_failed(order.uuid, args.reason).await,
        Outcome::Cancel => ctx.payments.mark_canceled(order.uuid).await,
    }
    .map_err(|error| format!("failed to apply callback: {}", describe(&error)))?;

    println!("payment_uuid: {}", payment.uuid);
    println!("status: {}", payment.status);
    println!("attempts: {}/{}", payment.attempt_count, payment.max_attempts);

    Ok(())
}

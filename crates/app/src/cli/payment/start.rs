use checkout_app::{config::AppConfig, domain::orders::records::PaymentMethod};
use clap::Args;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct StartPaymentArgs {
    /// Order number
    #[arg(long)]
    number: String,

    /// `cod` settles immediately; `online` returns a gateway redirect
    #[arg(long)]
    method: PaymentMethod,
}

pub(crate) async fn run(args: StartPaymentArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let order = ctx
        .orders
        .get_order_by_number(&args.number)
        .await
        .map_err(|error| format!("failed to load order: {}", describe(&error)))?;

    match args.method {
        PaymentMethod::Cod => {
            let payment = ctx
                .payments
                .start_cod_payment(order.uuid)
                .await
                .map_err(|error| format!("failed to record payment: {}", describe(&error)))?;

            println!("payment_uuid: {}", payment.uuid);
            println!("status: {}", payment.status);
        }
        PaymentMethod::Online => {
            let (payment, redirect) = ctx
                .payments
                .start_online_payment(order.uuid)
                .await
                .map_err(|error| format!("failed to start payment: {}", describe(&error)))?;

            println!("payment_uuid: {}", payment.uuid);
            println!("status: {}", payment.status);
            println!("redirect: {}", redirect.url);
        }
    }

    Ok(())
}

use checkout_app::{
    config::AppConfig,
    domain::catalog::{data::NewShippingMethod, records::ShippingMethodUuid},
    money::parse_money,
};
use clap::Args;
use rust_decimal::Decimal;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct CreateShippingArgs {
    /// Unique method code, e.g. `post-standard`
    #[arg(long)]
    code: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Flat price charged per order
    #[arg(long, value_parser = parse_money)]
    base_price: Decimal,

    /// Fastest delivery estimate in days
    #[arg(long, default_value_t = 1)]
    est_days_min: u16,

    /// Slowest delivery estimate in days
    #[arg(long, default_value_t = 3)]
    est_days_max: u16,

    /// Create the method disabled
    #[arg(long)]
    inactive: bool,
}

pub(crate) async fn run(args: CreateShippingArgs, config: &AppConfig) -> Result<(), String> {
    if args.code.trim().is_empty() {
        return Err("code cannot be empty".to_string());
    }

    if args.est_days_min > args.est_days_max {
        return Err("est_days_min cannot exceed est_days_max".to_string());
    }

    let ctx = connect(config).await?;

    let method = ctx
        .catalog
        .create_shipping_method(NewShippingMethod {
            uuid: ShippingMethodUuid::new(),
            code: args.code.trim().to_string(),
            name: args.name,
            base_price: args.base_price,
            is_active: !args.inactive,
            est_days_min: args.est_days_min,
            est_days_max: args.est_days_max,
        })
        .await
        .map_err(|error| format!("failed to create shipping method: {}", describe(&error)))?;

    println!("shipping_method_uuid: {}", method.uuid);
    println!("code: {}", method.code);
    println!("base_price: {}", method.base_price);

    Ok(())
}

use checkout_app::config::AppConfig;
use clap::Args;

use crate::cli::{connect, describe};

#[derive(Debug, Args)]
pub(crate) struct ListShippingArgs {
    /// Include inactive methods
    #[arg(long)]
    all: bool,

    /// Print JSON instead of one line per method
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: ListShippingArgs, config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;

    let methods = ctx
        .catalog
        .list_shipping_methods(!args.all)
        .await
        .map_err(|error| format!("failed to list shipping methods: {}", describe(&error)))?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&methods)
            .map_err(|error| format!("failed to render shipping methods: {error}"))?;

        println!("{rendered}");

        return Ok(());
    }

    for method in methods {
        println!(
            "{}\t{}\t{}\t{}-{} days{}",
            method.code,
            method.name,
            method.base_price,
            method.est_days_min,
            method.est_days_max,
            if method.is_active { "" } else { "\tinactive" }
        );
    }

    Ok(())
}

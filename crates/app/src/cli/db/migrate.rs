use checkout_app::{config::AppConfig, context::AppContext};

use crate::cli::describe;

pub(crate) async fn run(config: &AppConfig) -> Result<(), String> {
    AppContext::from_config(config, true)
        .await
        .map_err(|error| format!("failed to migrate database: {}", describe(&error)))?;

    println!("migrations applied");

    Ok(())
}

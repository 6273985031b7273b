//! Orders Config

use clap::Args;

/// Order numbering settings.
#[derive(Debug, Clone, Args)]
pub struct OrdersConfig {
    /// Prefix placed in front of the zero-padded order id
    #[arg(long, env = "ORDER_NUMBER_PREFIX", default_value = "SW")]
    pub number_prefix: String,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            number_prefix: "SW".to_string(),
        }
    }
}

//! Payments Config

use clap::Args;

/// Payment attempt settings.
#[derive(Debug, Clone, Args)]
pub struct PaymentsConfig {
    /// ISO currency code stamped on every payment
    #[arg(long = "currency", env = "SHOP_CURRENCY", default_value = "IRR")]
    pub currency: String,

    /// Failed online attempts allowed per order
    #[arg(
        long,
        env = "PAYMENT_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Base URL of the confirmation page payers are redirected to
    #[arg(
        long,
        env = "PAYMENT_GATEWAY_BASE_URL",
        default_value = "http://localhost:8000/payments/mock"
    )]
    pub gateway_base_url: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: "IRR".to_string(),
            max_attempts: 3,
            gateway_base_url: "http://localhost:8000/payments/mock".to_string(),
        }
    }
}

use checkout_app::{
    config::AppConfig,
    domain::catalog::{CatalogServiceError, data::NewShippingMethod, records::ShippingMethodUuid},
};
use rust_decimal::Decimal;

use crate::cli::{connect, describe};

/// `(code, name, base price, estimated days)`
const DEFAULT_METHODS: [(&str, &str, i64, (u16, u16)); 3] = [
    ("post-standard", "Post (Standard)", 150_000, (3, 7)),
    ("tipax-express", "Tipax (Express)", 290_000, (1, 2)),
    ("pickup", "In-store Pickup", 0, (0, 0)),
];

pub(crate) async fn run(config: &AppConfig) -> Result<(), String> {
    let ctx = connect(config).await?;
    let mut created = 0;

    for (code, name, base_price, (est_days_min, est_days_max)) in DEFAULT_METHODS {
        match ctx.catalog.get_shipping_method_by_code(code).await {
            Ok(_) => continue,
            Err(CatalogServiceError::NotFound) => {}
            Err(error) => {
                return Err(format!("failed to look up `{code}`: {}", describe(&error)));
            }
        }

        ctx.catalog
            .create_shipping_method(NewShippingMethod {
                uuid: ShippingMethodUuid::new(),
                code: code.to_string(),
                name: name.to_string(),
                base_price: Decimal::from(base_price),
                is_active: true,
                est_days_min,
                est_days_max,
            })
            .await
            .map_err(|error| format!("failed to create `{code}`: {}", describe(&error)))?;

        created += 1;
    }

    println!("created: {created}");

    Ok(())
}

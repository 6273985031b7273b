//! Catalog Data

use rust_decimal::Decimal;

use crate::domain::catalog::records::{ProductUuid, ShippingMethodUuid, VariantUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub is_active: bool,
}

/// New Variant Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariant {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub price_delta: Decimal,
    pub stock: Option<u32>,
    pub is_active: bool,
}

/// New Shipping Method Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewShippingMethod {
    pub uuid: ShippingMethodUuid,
    pub code: String,
    pub name: String,
    pub base_price: Decimal,
    pub is_active: bool,
    pub est_days_min: u16,
    pub est_days_max: u16,
}

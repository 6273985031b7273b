//! Catalog Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{money::round_money, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Current unit price: the base price plus the variant's delta, never negative.
    #[must_use]
    pub fn unit_price(&self, variant: Option<&VariantRecord>) -> Decimal {
        let delta = variant.map_or(Decimal::ZERO, |variant| variant.price_delta);

        round_money(self.price + delta).max(Decimal::ZERO)
    }
}

/// Variant UUID
pub type VariantUuid = TypedUuid<VariantRecord>;

/// Variant Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecord {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub price_delta: Decimal,
    /// `None` when stock is not tracked.
    pub stock: Option<u32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Shipping Method UUID
pub type ShippingMethodUuid = TypedUuid<ShippingMethodRecord>;

/// Shipping Method Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingMethodRecord {
    pub uuid: ShippingMethodUuid,
    pub code: String,
    pub name: String,
    pub base_price: Decimal,
    pub is_active: bool,
    pub est_days_min: u16,
    pub est_days_max: u16,
    pub created_at: Timestamp,
}

//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{
        catalog::records::{ProductUuid, ShippingMethodUuid, VariantUuid},
        customers::records::{AddressUuid, CustomerUuid},
        orders::status::OrderStatus,
    },
    money::line_total,
    uuids::TypedUuid,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method `{0}`")]
pub struct UnknownPaymentMethod(pub String);

/// How the customer chose to pay at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    Online,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "online" => Ok(Self::Online),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub number: String,
    pub customer_uuid: CustomerUuid,
    pub shipping_address_uuid: AddressUuid,
    pub shipping_method_uuid: Option<ShippingMethodUuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_total: Decimal,
    pub grand_total: Decimal,
    pub notes: String,
    pub items: Vec<OrderItemRecord>,
    pub placed_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Amount a payment attempt must collect.
    #[must_use]
    pub fn total_payable(&self) -> Decimal {
        self.grand_total
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub variant_uuid: Option<VariantUuid>,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub created_at: Timestamp,
}

impl OrderItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Order Status Log UUID
pub type OrderStatusLogUuid = TypedUuid<OrderStatusLogRecord>;

/// Order Status Log Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusLogRecord {
    pub uuid: OrderStatusLogUuid,
    pub order_uuid: OrderUuid,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub actor: Option<String>,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

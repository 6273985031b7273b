//! Order Data

use rust_decimal::Decimal;

use crate::domain::{
    carts::records::CartUuid,
    catalog::records::ShippingMethodUuid,
    customers::records::{AddressUuid, CustomerUuid},
    orders::records::PaymentMethod,
};

/// Checkout request turning a cart into an order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_uuid: CustomerUuid,
    /// Must belong to the customer; ownership is checked upstream.
    pub shipping_address_uuid: AddressUuid,
    pub cart_uuid: CartUuid,
    /// `None` ships for free; the cart's own selection is not consulted.
    pub shipping_method_uuid: Option<ShippingMethodUuid>,
    pub payment_method: PaymentMethod,
    pub discount_total: Decimal,
    pub notes: String,
}

/// Backoffice correction of a pending order's charges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderAdjustment {
    pub shipping_cost: Option<Decimal>,
    pub discount_total: Option<Decimal>,
}

//! Payment Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    domain::{
        orders::records::OrderUuid,
        payments::status::{PaymentProvider, PaymentStatus},
    },
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// One attempt at collecting payment for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order_uuid: OrderUuid,
    pub amount: Decimal,
    pub currency: String,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub external_id: Option<String>,
    /// Failed attempts consumed for the order up to and including this one.
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Whether another attempt may follow this one.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.status.allows_new_attempt() && self.attempt_count < self.max_attempts
    }
}

//! Payment Data

use rust_decimal::Decimal;

use crate::domain::{
    orders::records::OrderUuid,
    payments::{
        records::PaymentUuid,
        status::{PaymentProvider, PaymentStatus},
    },
};

/// A payment attempt about to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewPayment {
    pub(crate) uuid: PaymentUuid,
    pub(crate) order_uuid: OrderUuid,
    pub(crate) amount: Decimal,
    pub(crate) currency: String,
    pub(crate) provider: PaymentProvider,
    pub(crate) status: PaymentStatus,
    pub(crate) external_id: Option<String>,
    pub(crate) attempt_count: u32,
    pub(crate) max_attempts: u32,
}

//! Notifications
//!
//! Events emitted after a checkout transaction commits. Delivery is best
//! effort: callers log a failed notification and carry on.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

use crate::domain::{
    orders::{records::OrderRecord, status::OrderStatus},
    payments::records::PaymentRecord,
};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A cart was turned into a pending order.
    async fn order_created(&self, order: &OrderRecord) -> Result<(), NotificationError>;

    /// The order was paid by the given attempt.
    async fn payment_succeeded(
        &self,
        order: &OrderRecord,
        payment: &PaymentRecord,
    ) -> Result<(), NotificationError>;

    async fn order_status_changed(
        &self,
        order: &OrderRecord,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), NotificationError>;
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn order_created(&self, order: &OrderRecord) -> Result<(), NotificationError> {
        info!(
            order_uuid = %order.uuid,
            order_number = %order.number,
            grand_total = %order.grand_total,
            "order created"
        );

        Ok(())
    }

    async fn payment_succeeded(
        &self,
        order: &OrderRecord,
        payment: &PaymentRecord,
    ) -> Result<(), NotificationError> {
        info!(
            order_uuid = %order.uuid,
            order_number = %order.number,
            payment_uuid = %payment.uuid,
            provider = %payment.provider,
            amount = %payment.amount,
            "payment succeeded"
        );

        Ok(())
    }

    async fn order_status_changed(
        &self,
        order: &OrderRecord,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), NotificationError> {
        info!(
            order_uuid = %order.uuid,
            order_number = %order.number,
            %from,
            %to,
            "order status changed"
        );

        Ok(())
    }
}

//! Order State Machine

use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::domain::orders::{
    errors::OrdersServiceError,
    records::{OrderRecord, OrderUuid},
    repositories::{PgOrderStatusLogsRepository, PgOrdersRepository},
    status::OrderStatus,
};

/// Single entry point for status changes, shared by backoffice transitions
/// and payment callbacks.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderStateMachine {
    orders: PgOrdersRepository,
    logs: PgOrderStatusLogsRepository,
}

impl OrderStateMachine {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            orders: PgOrdersRepository::new(),
            logs: PgOrderStatusLogsRepository::new(),
        }
    }

    /// Lock the order row for the rest of the transaction.
    pub(crate) async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        Ok(self.orders.lock_order(tx, order).await?)
    }

    /// Move a locked order to `to`, writing one status log row.
    ///
    /// The returned record carries no items.
    pub(crate) async fn transition_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        to: OrderStatus,
        actor: Option<&str>,
        note: Option<&str>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let from = order.status;

        if !from.can_transition_to(to) {
            return Err(OrdersServiceError::IllegalTransition { from, to });
        }

        let updated = self.orders.update_status(tx, order.uuid, to).await?;

        self.logs
            .insert_log(tx, order.uuid, from, to, actor, note)
            .await?;

        debug!(order_uuid = %order.uuid, %from, %to, "order status updated");

        Ok(updated)
    }
}

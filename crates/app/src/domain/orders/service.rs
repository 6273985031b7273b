//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info, warn};

use crate::{
    config::orders::OrdersConfig,
    database::Db,
    domain::{
        carts::{PgCartLinesRepository, PgCartsRepository},
        catalog::PgShippingMethodsRepository,
        notifications::Notifier,
        orders::{
            data::{NewOrder, OrderAdjustment},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderStatusLogRecord, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrderStatusLogsRepository, PgOrdersRepository},
            state_machine::OrderStateMachine,
            status::OrderStatus,
        },
    },
};

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    config: OrdersConfig,
    notifier: Arc<dyn Notifier>,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    logs: PgOrderStatusLogsRepository,
    state_machine: OrderStateMachine,
    carts: PgCartsRepository,
    lines: PgCartLinesRepository,
    shipping_methods: PgShippingMethodsRepository,
}

impl std::fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, config: OrdersConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config,
            notifier,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            logs: PgOrderStatusLogsRepository::new(),
            state_machine: OrderStateMachine::new(),
            carts: PgCartsRepository::new(),
            lines: PgCartLinesRepository::new(),
            shipping_methods: PgShippingMethodsRepository::new(),
        }
    }

    async fn load_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, OrdersServiceError> {
        order.items = self.items.list_items(tx, order.uuid).await?;

        Ok(order)
    }

    fn order_number(&self, id: i64) -> String {
        format!("{}{id:08}", self.config.number_prefix)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_from_cart",
        skip(self, new_order),
        fields(
            cart_uuid = %new_order.cart_uuid,
            customer_uuid = %new_order.customer_uuid,
            order_uuid = tracing::field::Empty,
            order_number = tracing::field::Empty
        ),
        err
    )]
    async fn create_from_cart(&self, new_order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.lock_cart(&mut tx, new_order.cart_uuid).await?;
        let snapshot = self.items.cart_snapshot(&mut tx, cart.uuid).await?;

        if snapshot.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let shipping_method = new_order.shipping_method_uuid;

        let shipping_cost = match shipping_method {
            Some(method) => {
                self.shipping_methods
                    .get_shipping_method(&mut tx, method)
                    .await?
                    .base_price
            }
            None => Decimal::ZERO,
        };

        let uuid = OrderUuid::new();

        let id = self
            .orders
            .insert_order(&mut tx, uuid, &new_order, shipping_method, shipping_cost)
            .await?;

        self.orders
            .assign_number(&mut tx, uuid, &self.order_number(id))
            .await?;

        let items = self.items.create_items(&mut tx, uuid, &snapshot).await?;

        let mut order = self.orders.recalculate_totals(&mut tx, uuid).await?;
        order.items = items;

        self.lines.clear_lines(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(order.uuid));
        span.record("order_number", order.number.as_str());

        info!(
            items = order.items.len(),
            subtotal = %order.subtotal,
            grand_total = %order.grand_total,
            "created order from cart"
        );

        if let Err(error) = self.notifier.order_created(&order).await {
            warn!(%error, "order created notification failed");
        }

        Ok(order)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order(&mut tx, order).await?;
        let order = self.load_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn get_order_by_number(&self, number: &str) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order_by_number(&mut tx, number.trim()).await?;
        let order = self.load_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.orders.list_orders(&mut tx, status).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_status_logs(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderStatusLogRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders.get_order(&mut tx, order).await?;

        let logs = self.logs.list_logs(&mut tx, order).await?;

        tx.commit().await?;

        Ok(logs)
    }

    #[tracing::instrument(
        name = "orders.service.transition",
        skip(self, actor, note),
        fields(order_uuid = %order, to = %to, from = tracing::field::Empty),
        err
    )]
    async fn transition(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        actor: Option<String>,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = self.state_machine.lock(&mut tx, order).await?;
        let from = locked.status;

        Span::current().record("from", tracing::field::display(from));

        let updated = self
            .state_machine
            .transition_in_tx(&mut tx, &locked, to, actor.as_deref(), note.as_deref())
            .await?;

        let updated = self.load_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(actor = actor.as_deref(), "transitioned order");

        if let Err(error) = self.notifier.order_status_changed(&updated, from, to).await {
            warn!(%error, "order status notification failed");
        }

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.adjust_totals",
        skip(self, adjustment),
        fields(
            order_uuid = %order,
            shipping_cost = ?adjustment.shipping_cost,
            discount_total = ?adjustment.discount_total
        ),
        err
    )]
    async fn adjust_totals(
        &self,
        order: OrderUuid,
        adjustment: OrderAdjustment,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = self.state_machine.lock(&mut tx, order).await?;

        if locked.status != OrderStatus::Pending {
            return Err(OrdersServiceError::NotAdjustable(locked.status));
        }

        self.orders
            .adjust_charges(
                &mut tx,
                order,
                adjustment.shipping_cost,
                adjustment.discount_total,
            )
            .await?;

        let updated = self.orders.recalculate_totals(&mut tx, order).await?;
        let updated = self.load_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(grand_total = %updated.grand_total, "adjusted order totals");

        Ok(updated)
    }
}

/// Order creation from carts and the order lifecycle.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn a cart into a pending order and empty the cart, all or nothing.
    ///
    /// Items copy the cart's name, SKU and price snapshots; totals are then
    /// recomputed from the stored items.
    async fn create_from_cart(&self, new_order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve an order with its items.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve an order with its items by its human-facing number.
    async fn get_order_by_number(&self, number: &str) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders newest first, optionally filtered by status. Items are not loaded.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// The order's status history, oldest first.
    async fn list_status_logs(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderStatusLogRecord>, OrdersServiceError>;

    /// Move the order to `to` if the current status allows it, recording who
    /// did it and why.
    async fn transition(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        actor: Option<String>,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Correct shipping cost or discount on a pending order.
    async fn adjust_totals(
        &self,
        order: OrderUuid,
        adjustment: OrderAdjustment,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sqlx::query;
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, records::CartUuid},
            catalog::CatalogService,
            notifications::{MockNotifier, NotificationError},
            orders::records::PaymentMethod,
        },
        money,
        test::{TestContext, helpers},
    };

    use super::*;

    /// Statuses to walk through, starting from pending, to reach `status`.
    fn path_to(status: OrderStatus) -> &'static [OrderStatus] {
        match status {
            OrderStatus::Pending => &[],
            OrderStatus::Processing => &[OrderStatus::Processing],
            OrderStatus::Paid => &[OrderStatus::Paid],
            OrderStatus::Shipped => &[OrderStatus::Paid, OrderStatus::Shipped],
            OrderStatus::Completed => &[
                OrderStatus::Paid,
                OrderStatus::Shipped,
                OrderStatus::Completed,
            ],
            OrderStatus::Canceled => &[OrderStatus::Canceled],
        }
    }

    async fn order_in(ctx: &TestContext, status: OrderStatus) -> TestResult<OrderRecord> {
        let mut order = helpers::place_order(ctx, PaymentMethod::Online).await?;

        for step in path_to(status) {
            order = ctx.orders.transition(order.uuid, *step, None, None).await?;
        }

        Ok(order)
    }

    #[tokio::test]
    async fn create_from_cart_copies_lines_and_empties_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let order = ctx
            .orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, dec!(25.00));
        assert_eq!(order.shipping_cost, Decimal::ZERO);
        assert_eq!(order.grand_total, dec!(25.00));
        assert_eq!(order.items.len(), 2);

        let mut copied: Vec<_> = order
            .items
            .iter()
            .map(|item| (item.sku.as_str(), item.quantity, item.unit_price))
            .collect();
        copied.sort_unstable();

        assert_eq!(
            copied,
            vec![("MUG", 2, dec!(10.00)), ("PEN", 1, dec!(5.00))]
        );

        let cart = ctx.carts.get_cart(checkout.cart.uuid).await?;

        assert!(cart.lines.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn create_from_empty_cart_fails() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;
        let empty = helpers::guest_cart(&ctx, "empty-session").await?;

        let mut new_order = helpers::new_order(&checkout, PaymentMethod::Cod);
        new_order.cart_uuid = empty.uuid;

        let result = ctx.orders.create_from_cart(new_order).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
        assert!(ctx.orders.list_orders(None).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn create_from_unknown_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let mut new_order = helpers::new_order(&checkout, PaymentMethod::Cod);
        new_order.cart_uuid = CartUuid::new();

        let result = ctx.orders.create_from_cart(new_order).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn order_number_uses_prefix_and_padded_id() -> TestResult {
        let ctx = TestContext::new().await;

        let order = helpers::place_order(&ctx, PaymentMethod::Cod).await?;

        let digits = order.number.strip_prefix("SW").unwrap_or_default();

        assert_eq!(digits.len(), 8, "unexpected order number {}", order.number);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        let found = ctx.orders.get_order_by_number(&order.number).await?;

        assert_eq!(found.uuid, order.uuid);
        assert_eq!(found.items.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn shipping_cost_is_snapshotted_from_chosen_method() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;
        let post = helpers::create_shipping_method(&ctx, "post", dec!(7.50)).await?;

        let mut new_order = helpers::new_order(&checkout, PaymentMethod::Cod);
        new_order.shipping_method_uuid = Some(post.uuid);

        let order = ctx.orders.create_from_cart(new_order).await?;

        let expected_subtotal = money::subtotal(
            order
                .items
                .iter()
                .map(|item| (item.unit_price, item.quantity)),
        );

        assert_eq!(order.shipping_method_uuid, Some(post.uuid));
        assert_eq!(order.shipping_cost, dec!(7.50));
        assert_eq!(order.subtotal, expected_subtotal);
        assert_eq!(
            order.grand_total,
            money::grand_total(order.subtotal, order.shipping_cost, order.discount_total)
        );
        assert_eq!(order.grand_total, dec!(32.50));

        Ok(())
    }

    #[tokio::test]
    async fn order_without_shipping_method_ignores_cart_selection() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;
        let post = helpers::create_shipping_method(&ctx, "post", dec!(7.50)).await?;

        ctx.carts
            .set_shipping_method(checkout.cart.uuid, Some(post.uuid))
            .await?;

        let order = ctx
            .orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await?;

        assert_eq!(order.shipping_method_uuid, None);
        assert_eq!(order.shipping_cost, Decimal::ZERO);
        assert_eq!(order.grand_total, dec!(25.00));

        Ok(())
    }

    #[tokio::test]
    async fn explicit_shipping_method_overrides_cart_selection() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;
        let post = helpers::create_shipping_method(&ctx, "post", dec!(7.50)).await?;
        let courier = helpers::create_shipping_method(&ctx, "courier", dec!(12.00)).await?;

        ctx.carts
            .set_shipping_method(checkout.cart.uuid, Some(post.uuid))
            .await?;

        let mut new_order = helpers::new_order(&checkout, PaymentMethod::Cod);
        new_order.shipping_method_uuid = Some(courier.uuid);

        let order = ctx.orders.create_from_cart(new_order).await?;

        assert_eq!(order.shipping_method_uuid, Some(courier.uuid));
        assert_eq!(order.shipping_cost, dec!(12.00));

        Ok(())
    }

    #[tokio::test]
    async fn items_keep_prices_after_catalog_changes() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let order = ctx
            .orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await?;

        ctx.catalog
            .update_product_price(checkout.mug.uuid, dec!(99.00))
            .await?;

        let reloaded = ctx.orders.get_order(order.uuid).await?;

        assert_eq!(reloaded.items, order.items);
        assert_eq!(reloaded.subtotal, dec!(25.00));

        Ok(())
    }

    #[tokio::test]
    async fn discount_larger_than_order_clamps_grand_total() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let mut new_order = helpers::new_order(&checkout, PaymentMethod::Cod);
        new_order.discount_total = dec!(100.00);

        let order = ctx.orders.create_from_cart(new_order).await?;

        assert_eq!(order.subtotal, dec!(25.00));
        assert_eq!(order.discount_total, dec!(100.00));
        assert_eq!(order.grand_total, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn failure_while_copying_items_rolls_everything_back() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;
        let fuse = helpers::create_product(&ctx, "EXPLODE", dec!(1.00)).await?;

        helpers::add_line(&ctx, checkout.cart.uuid, &fuse, 1).await?;

        query(
            "CREATE FUNCTION fail_exploding_item() RETURNS trigger AS $$
             BEGIN
                 IF NEW.sku = 'EXPLODE' THEN
                     RAISE EXCEPTION 'simulated item failure';
                 END IF;
                 RETURN NEW;
             END;
             $$ LANGUAGE plpgsql",
        )
        .execute(ctx.db.pool())
        .await?;

        query(
            "CREATE TRIGGER order_items_explode
                 BEFORE INSERT ON order_items
                 FOR EACH ROW EXECUTE FUNCTION fail_exploding_item()",
        )
        .execute(ctx.db.pool())
        .await?;

        let result = ctx
            .orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Sql(_))),
            "expected Sql, got {result:?}"
        );

        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(items, 0);
        assert!(ctx.orders.list_orders(None).await?.is_empty());
        assert_eq!(ctx.carts.get_cart(checkout.cart.uuid).await?.lines.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn every_allowed_transition_succeeds_with_one_log_row() -> TestResult {
        let ctx = TestContext::new().await;

        for from in OrderStatus::ALL {
            for to in from.allowed_transitions() {
                let order = order_in(&ctx, from).await?;

                let updated = ctx
                    .orders
                    .transition(
                        order.uuid,
                        *to,
                        Some("staff@example.com".to_string()),
                        Some("moved".to_string()),
                    )
                    .await?;

                assert_eq!(updated.status, *to);

                let logs = ctx.orders.list_status_logs(order.uuid).await?;

                assert_eq!(logs.len(), path_to(from).len() + 1);

                let last = logs.last().ok_or("missing status log")?;

                assert_eq!((last.from_status, last.to_status), (from, *to));
                assert_eq!(last.actor.as_deref(), Some("staff@example.com"));
                assert_eq!(last.note.as_deref(), Some("moved"));
            }
        }

        Ok(())
    }

    #[tokio::test]
    async fn every_unlisted_transition_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        for from in OrderStatus::ALL {
            let order = order_in(&ctx, from).await?;

            for to in OrderStatus::ALL {
                if from.can_transition_to(to) {
                    continue;
                }

                let result = ctx.orders.transition(order.uuid, to, None, None).await;

                assert!(
                    matches!(
                        result,
                        Err(OrdersServiceError::IllegalTransition { from: f, to: t })
                            if f == from && t == to
                    ),
                    "expected IllegalTransition {from} -> {to}, got {result:?}"
                );
            }

            let reloaded = ctx.orders.get_order(order.uuid).await?;
            let logs = ctx.orders.list_status_logs(order.uuid).await?;

            assert_eq!(reloaded.status, from);
            assert_eq!(logs.len(), path_to(from).len());
        }

        Ok(())
    }

    #[tokio::test]
    async fn transition_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .transition(OrderUuid::new(), OrderStatus::Paid, None, None)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_orders_filters_by_status() -> TestResult {
        let ctx = TestContext::new().await;

        let paid = order_in(&ctx, OrderStatus::Paid).await?;
        let pending = order_in(&ctx, OrderStatus::Pending).await?;

        let all = ctx.orders.list_orders(None).await?;
        let only_paid = ctx.orders.list_orders(Some(OrderStatus::Paid)).await?;

        assert_eq!(
            all.iter().map(|order| order.uuid).collect::<Vec<_>>(),
            vec![pending.uuid, paid.uuid]
        );
        assert_eq!(
            only_paid.iter().map(|order| order.uuid).collect::<Vec<_>>(),
            vec![paid.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn adjust_totals_recomputes_grand_total() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let adjusted = ctx
            .orders
            .adjust_totals(
                order.uuid,
                OrderAdjustment {
                    shipping_cost: Some(dec!(4.00)),
                    discount_total: Some(dec!(9.00)),
                },
            )
            .await?;

        assert_eq!(adjusted.subtotal, dec!(25.00));
        assert_eq!(adjusted.grand_total, dec!(20.00));
        assert_eq!(
            adjusted.grand_total,
            money::grand_total(
                adjusted.subtotal,
                adjusted.shipping_cost,
                adjusted.discount_total
            )
        );

        let shipping_only = ctx
            .orders
            .adjust_totals(
                order.uuid,
                OrderAdjustment {
                    shipping_cost: Some(Decimal::ZERO),
                    ..OrderAdjustment::default()
                },
            )
            .await?;

        assert_eq!(shipping_only.discount_total, dec!(9.00));
        assert_eq!(shipping_only.grand_total, dec!(16.00));

        Ok(())
    }

    #[tokio::test]
    async fn adjust_totals_rejects_non_pending_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let order = order_in(&ctx, OrderStatus::Paid).await?;

        let result = ctx
            .orders
            .adjust_totals(
                order.uuid,
                OrderAdjustment {
                    discount_total: Some(dec!(1.00)),
                    ..OrderAdjustment::default()
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::NotAdjustable(OrderStatus::Paid))
            ),
            "expected NotAdjustable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn adjust_totals_rejects_negative_amounts() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let result = ctx
            .orders
            .adjust_totals(
                order.uuid,
                OrderAdjustment {
                    shipping_cost: Some(dec!(-1.00)),
                    ..OrderAdjustment::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_from_cart_notifies_once() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_order_created()
            .times(1)
            .returning(|_| Ok(()));

        let orders = PgOrdersService::new(ctx.app_db(), OrdersConfig::default(), Arc::new(notifier));

        orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let checkout = helpers::checkout_fixture(&ctx).await?;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_order_created()
            .times(1)
            .returning(|_| Err(NotificationError::Delivery("smtp down".to_string())));
        notifier
            .expect_order_status_changed()
            .times(1)
            .returning(|_, _, _| Err(NotificationError::Delivery("smtp down".to_string())));

        let orders = PgOrdersService::new(ctx.app_db(), OrdersConfig::default(), Arc::new(notifier));

        let order = orders
            .create_from_cart(helpers::new_order(&checkout, PaymentMethod::Cod))
            .await?;

        let canceled = orders
            .transition(order.uuid, OrderStatus::Canceled, None, None)
            .await?;

        assert_eq!(canceled.status, OrderStatus::Canceled);
        assert_eq!(ctx.orders.get_order(order.uuid).await?.status, OrderStatus::Canceled);

        Ok(())
    }
}

//! Payments service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info, warn};

use crate::{
    config::payments::PaymentsConfig,
    database::Db,
    domain::{
        notifications::Notifier,
        orders::{
            OrderStateMachine, PgOrdersRepository,
            records::{OrderRecord, OrderUuid},
            status::OrderStatus,
        },
        payments::{
            data::NewPayment,
            errors::PaymentsServiceError,
            gateway::{PaymentGateway, PaymentRedirect, external_reference},
            records::{PaymentRecord, PaymentUuid},
            repository::PgPaymentsRepository,
            status::{PaymentProvider, PaymentStatus},
        },
    },
};

const PAYMENTS_ACTOR: &str = "payments";

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    config: PaymentsConfig,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    payments: PgPaymentsRepository,
    orders: PgOrdersRepository,
    state_machine: OrderStateMachine,
}

impl std::fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPaymentsService")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(
        db: Db,
        config: PaymentsConfig,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            config,
            gateway,
            notifier,
            payments: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
            state_machine: OrderStateMachine::new(),
        }
    }

    /// Lock the order and read its latest attempt. Every payment mutation
    /// starts here so callbacks for one order are serialized.
    async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<(OrderRecord, Option<PaymentRecord>), PaymentsServiceError> {
        let order = self.orders.lock_order(tx, order).await?;
        let latest = self.payments.latest_payment(tx, order.uuid).await?;

        Ok((order, latest))
    }

    /// Drive the order to PAID through the shared state machine.
    async fn settle_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        note: &str,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        let paid = self
            .state_machine
            .transition_in_tx(tx, order, OrderStatus::Paid, Some(PAYMENTS_ACTOR), Some(note))
            .await?;

        Ok(paid)
    }

    async fn notify_paid(&self, order: &OrderRecord, payment: &PaymentRecord) {
        if let Err(error) = self.notifier.payment_succeeded(order, payment).await {
            warn!(%error, payment_uuid = %payment.uuid, "payment notification failed");
        }
    }
}

fn require_attempt(latest: Option<PaymentRecord>) -> Result<PaymentRecord, PaymentsServiceError> {
    latest.ok_or(PaymentsServiceError::NoPaymentAttempt)
}

fn check_attempt_transition(
    payment: &PaymentRecord,
    to: PaymentStatus,
) -> Result<(), PaymentsServiceError> {
    if payment.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(PaymentsServiceError::IllegalAttemptTransition {
            from: payment.status,
            to,
        })
    }
}

fn record_payment(payment: &PaymentRecord) {
    let span = Span::current();

    span.record("payment_uuid", tracing::field::display(payment.uuid));
    span.record("attempt_count", payment.attempt_count);
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn can_retry(&self, order: OrderUuid) -> Result<bool, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders.get_order(&mut tx, order).await?;

        let latest = self.payments.latest_payment(&mut tx, order).await?;

        tx.commit().await?;

        Ok(latest.as_ref().is_none_or(PaymentRecord::can_retry))
    }

    #[tracing::instrument(
        name = "payments.service.start_cod_payment",
        skip(self),
        fields(
            order_uuid = %order,
            payment_uuid = tracing::field::Empty,
            attempt_count = tracing::field::Empty
        ),
        err
    )]
    async fn start_cod_payment(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (order, latest) = self.lock_order(&mut tx, order).await?;

        if latest
            .as_ref()
            .is_some_and(|payment| payment.status == PaymentStatus::Succeeded)
        {
            return Err(PaymentsServiceError::AlreadyPaid);
        }

        if order.status != OrderStatus::Pending {
            return Err(PaymentsServiceError::OrderNotPayable(order.status));
        }

        let payment = self
            .payments
            .insert_payment(
                &mut tx,
                NewPayment {
                    uuid: PaymentUuid::new(),
                    order_uuid: order.uuid,
                    amount: order.total_payable(),
                    currency: self.config.currency.clone(),
                    provider: PaymentProvider::Cod,
                    status: PaymentStatus::Succeeded,
                    external_id: Some(external_reference("COD", 10)),
                    attempt_count: latest.map_or(0, |payment| payment.attempt_count),
                    max_attempts: 1,
                },
            )
            .await?;

        let order = self.settle_order(&mut tx, &order, "cash on delivery").await?;

        tx.commit().await?;

        record_payment(&payment);

        info!(amount = %payment.amount, "recorded cash on delivery payment");

        self.notify_paid(&order, &payment).await;

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.start_online_payment",
        skip(self),
        fields(
            order_uuid = %order,
            payment_uuid = tracing::field::Empty,
            attempt_count = tracing::field::Empty
        ),
        err
    )]
    async fn start_online_payment(
        &self,
        order: OrderUuid,
    ) -> Result<(PaymentRecord, PaymentRedirect), PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (order, latest) = self.lock_order(&mut tx, order).await?;

        match latest.as_ref().map(|payment| payment.status) {
            Some(PaymentStatus::Succeeded) => return Err(PaymentsServiceError::AlreadyPaid),
            Some(PaymentStatus::Processing) => {
                return Err(PaymentsServiceError::AttemptInProgress);
            }
            Some(PaymentStatus::Pending | PaymentStatus::Failed | PaymentStatus::Canceled)
            | None => {}
        }

        if order.status != OrderStatus::Pending {
            return Err(PaymentsServiceError::OrderNotPayable(order.status));
        }

        let attempts = latest.as_ref().map_or(0, |payment| payment.attempt_count);
        let max_attempts = self.config.max_attempts;

        if attempts >= max_attempts {
            return Err(PaymentsServiceError::MaxRetriesExceeded {
                attempts,
                max_attempts,
            });
        }

        let payment = self
            .payments
            .insert_payment(
                &mut tx,
                NewPayment {
                    uuid: PaymentUuid::new(),
                    order_uuid: order.uuid,
                    amount: order.total_payable(),
                    currency: self.config.currency.clone(),
                    provider: self.gateway.provider(),
                    status: PaymentStatus::Processing,
                    external_id: None,
                    attempt_count: attempts,
                    max_attempts,
                },
            )
            .await?;

        let redirect = self.gateway.redirect_for(&order, &payment);

        tx.commit().await?;

        record_payment(&payment);

        info!(amount = %payment.amount, redirect = %redirect.url, "started online payment");

        Ok((payment, redirect))
    }

    #[tracing::instrument(
        name = "payments.service.mark_success",
        skip(self),
        fields(
            order_uuid = %order,
            payment_uuid = tracing::field::Empty,
            attempt_count = tracing::field::Empty
        ),
        err
    )]
    async fn mark_success(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (order, latest) = self.lock_order(&mut tx, order).await?;
        let payment = require_attempt(latest)?;

        record_payment(&payment);

        if payment.status == PaymentStatus::Succeeded {
            tx.commit().await?;

            info!("payment already succeeded");

            return Ok(payment);
        }

        check_attempt_transition(&payment, PaymentStatus::Succeeded)?;

        let payment = self
            .payments
            .mark_succeeded(&mut tx, payment.uuid, &external_reference("MOCK", 12))
            .await?;

        let order = self.settle_order(&mut tx, &order, "payment confirmed").await?;

        tx.commit().await?;

        info!(external_id = payment.external_id.as_deref(), "payment succeeded");

        self.notify_paid(&order, &payment).await;

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.mark_failed",
        skip(self, reason),
        fields(
            order_uuid = %order,
            payment_uuid = tracing::field::Empty,
            attempt_count = tracing::field::Empty
        ),
        err
    )]
    async fn mark_failed(
        &self,
        order: OrderUuid,
        reason: String,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (_, latest) = self.lock_order(&mut tx, order).await?;
        let payment = require_attempt(latest)?;

        if payment.status == PaymentStatus::Failed {
            tx.commit().await?;

            record_payment(&payment);

            return Ok(payment);
        }

        check_attempt_transition(&payment, PaymentStatus::Failed)?;

        let payment = self
            .payments
            .mark_failed(
                &mut tx,
                payment.uuid,
                &reason,
                &external_reference("MOCK-FAIL", 8),
            )
            .await?;

        tx.commit().await?;

        record_payment(&payment);

        info!(reason = %reason, "payment failed");

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.mark_canceled",
        skip(self),
        fields(
            order_uuid = %order,
            payment_uuid = tracing::field::Empty,
            attempt_count = tracing::field::Empty
        ),
        err
    )]
    async fn mark_canceled(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (_, latest) = self.lock_order(&mut tx, order).await?;
        let payment = require_attempt(latest)?;

        if payment.status == PaymentStatus::Canceled {
            tx.commit().await?;

            record_payment(&payment);

            return Ok(payment);
        }

        check_attempt_transition(&payment, PaymentStatus::Canceled)?;

        let payment = self.payments.mark_canceled(&mut tx, payment.uuid).await?;

        tx.commit().await?;

        record_payment(&payment);

        info!("payment canceled");

        Ok(payment)
    }

    async fn latest_payment(
        &self,
        order: OrderUuid,
    ) -> Result<Option<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders.get_order(&mut tx, order).await?;

        let latest = self.payments.latest_payment(&mut tx, order).await?;

        tx.commit().await?;

        Ok(latest)
    }

    async fn list_payments(&self, order: OrderUuid) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders.get_order(&mut tx, order).await?;

        let payments = self.payments.list_payments(&mut tx, order).await?;

        tx.commit().await?;

        Ok(payments)
    }
}

/// Payment attempts against an order and the callbacks that settle them.
#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Whether a new online attempt would be accepted for the order.
    async fn can_retry(&self, order: OrderUuid) -> Result<bool, PaymentsServiceError>;

    /// Record an instantly successful cash-on-delivery payment and mark the
    /// order paid.
    async fn start_cod_payment(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Open a new online attempt and return where to send the payer.
    async fn start_online_payment(
        &self,
        order: OrderUuid,
    ) -> Result<(PaymentRecord, PaymentRedirect), PaymentsServiceError>;

    /// Confirm the latest attempt and mark the order paid.
    ///
    /// Repeated confirmations return the succeeded attempt unchanged.
    async fn mark_success(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Fail the latest attempt, consuming one retry. The order is left
    /// awaiting payment.
    async fn mark_failed(
        &self,
        order: OrderUuid,
        reason: String,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Cancel the latest attempt without consuming a retry.
    async fn mark_canceled(&self, order: OrderUuid) -> Result<PaymentRecord, PaymentsServiceError>;

    async fn latest_payment(
        &self,
        order: OrderUuid,
    ) -> Result<Option<PaymentRecord>, PaymentsServiceError>;

    /// Attempt history, newest first.
    async fn list_payments(&self, order: OrderUuid) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            notifications::{MockNotifier, NotificationError, TracingNotifier},
            orders::{OrdersService, OrdersServiceError, records::PaymentMethod},
            payments::gateway::{MockGateway, MockPaymentGateway},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    const DECLINED: &str = "card declined";

    async fn fail_attempt(ctx: &TestContext, order: OrderUuid) -> TestResult<PaymentRecord> {
        ctx.payments.start_online_payment(order).await?;

        Ok(ctx.payments.mark_failed(order, DECLINED.to_string()).await?)
    }

    #[tokio::test]
    async fn cod_payment_succeeds_and_marks_order_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Cod).await?;

        let payment = ctx.payments.start_cod_payment(order.uuid).await?;

        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.provider, PaymentProvider::Cod);
        assert_eq!(payment.amount, order.grand_total);
        assert_eq!(payment.currency, "IRR");
        assert_eq!(payment.max_attempts, 1);
        assert!(payment.paid_at.is_some());
        assert!(
            payment
                .external_id
                .as_deref()
                .is_some_and(|id| id.starts_with("COD-"))
        );

        let order = ctx.orders.get_order(order.uuid).await?;
        let logs = ctx.orders.list_status_logs(order.uuid).await?;

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs.first().and_then(|log| log.actor.as_deref()), Some("payments"));

        Ok(())
    }

    #[tokio::test]
    async fn cod_payment_twice_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Cod).await?;

        ctx.payments.start_cod_payment(order.uuid).await?;

        let result = ctx.payments.start_cod_payment(order.uuid).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AlreadyPaid)),
            "expected AlreadyPaid, got {result:?}"
        );
        assert_eq!(ctx.payments.list_payments(order.uuid).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn online_payment_starts_processing_with_redirect() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let (payment, redirect) = ctx.payments.start_online_payment(order.uuid).await?;

        assert_eq!(payment.status, PaymentStatus::Processing);
        assert_eq!(payment.provider, PaymentProvider::Gateway);
        assert_eq!(payment.attempt_count, 0);
        assert_eq!(payment.max_attempts, 3);
        assert_eq!(payment.external_id, None);
        assert_eq!(
            redirect.url,
            format!(
                "http://localhost:8000/payments/mock/{}?payment={}",
                order.number, payment.uuid
            )
        );
        assert_eq!(
            ctx.orders.get_order(order.uuid).await?.status,
            OrderStatus::Pending
        );

        Ok(())
    }

    #[tokio::test]
    async fn online_payment_is_rejected_while_attempt_in_progress() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.payments.start_online_payment(order.uuid).await?;

        let result = ctx.payments.start_online_payment(order.uuid).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AttemptInProgress)),
            "expected AttemptInProgress, got {result:?}"
        );
        assert!(!ctx.payments.can_retry(order.uuid).await?);

        Ok(())
    }

    #[tokio::test]
    async fn online_payment_for_canceled_order_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.orders
            .transition(order.uuid, OrderStatus::Canceled, None, None)
            .await?;

        let result = ctx.payments.start_online_payment(order.uuid).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::OrderNotPayable(OrderStatus::Canceled))
            ),
            "expected OrderNotPayable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fourth_attempt_after_three_failures_exceeds_retries() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        assert!(ctx.payments.can_retry(order.uuid).await?);

        for expected in 1..=3 {
            let failed = fail_attempt(&ctx, order.uuid).await?;

            assert_eq!(failed.status, PaymentStatus::Failed);
            assert_eq!(failed.attempt_count, expected);
            assert_eq!(failed.last_error.as_deref(), Some(DECLINED));
        }

        assert!(!ctx.payments.can_retry(order.uuid).await?);

        let result = ctx.payments.start_online_payment(order.uuid).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::MaxRetriesExceeded {
                    attempts: 3,
                    max_attempts: 3
                })
            ),
            "expected MaxRetriesExceeded, got {result:?}"
        );
        assert_eq!(ctx.payments.list_payments(order.uuid).await?.len(), 3);
        assert_eq!(
            ctx.orders.get_order(order.uuid).await?.status,
            OrderStatus::Pending
        );

        Ok(())
    }

    #[tokio::test]
    async fn canceled_attempts_do_not_consume_retries() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        fail_attempt(&ctx, order.uuid).await?;

        ctx.payments.start_online_payment(order.uuid).await?;
        let canceled = ctx.payments.mark_canceled(order.uuid).await?;

        assert_eq!(canceled.status, PaymentStatus::Canceled);
        assert_eq!(canceled.attempt_count, 1);
        assert!(ctx.payments.can_retry(order.uuid).await?);

        fail_attempt(&ctx, order.uuid).await?;
        fail_attempt(&ctx, order.uuid).await?;

        let result = ctx.payments.start_online_payment(order.uuid).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::MaxRetriesExceeded { attempts: 3, .. })
            ),
            "expected MaxRetriesExceeded, got {result:?}"
        );
        assert_eq!(ctx.payments.list_payments(order.uuid).await?.len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn mark_success_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.payments.start_online_payment(order.uuid).await?;

        let first = ctx.payments.mark_success(order.uuid).await?;
        let second = ctx.payments.mark_success(order.uuid).await?;

        assert_eq!(first, second);
        assert_eq!(first.status, PaymentStatus::Succeeded);
        assert!(first.paid_at.is_some());
        assert!(
            first
                .external_id
                .as_deref()
                .is_some_and(|id| id.starts_with("MOCK-"))
        );

        let payments = ctx.payments.list_payments(order.uuid).await?;
        let logs = ctx.orders.list_status_logs(order.uuid).await?;

        assert_eq!(payments.len(), 1);
        assert_eq!(logs.len(), 1);
        assert_eq!(
            ctx.orders.get_order(order.uuid).await?.status,
            OrderStatus::Paid
        );

        Ok(())
    }

    #[tokio::test]
    async fn late_success_after_failure_pays_the_order() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        fail_attempt(&ctx, order.uuid).await?;

        let payment = ctx.payments.mark_success(order.uuid).await?;

        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.last_error.as_deref(), Some(DECLINED));
        assert_eq!(
            ctx.orders.get_order(order.uuid).await?.status,
            OrderStatus::Paid
        );

        Ok(())
    }

    #[tokio::test]
    async fn mark_failed_is_idempotent_and_leaves_order_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.payments.start_online_payment(order.uuid).await?;

        let first = ctx
            .payments
            .mark_failed(order.uuid, DECLINED.to_string())
            .await?;
        let second = ctx
            .payments
            .mark_failed(order.uuid, "duplicate callback".to_string())
            .await?;

        assert_eq!(first, second);
        assert_eq!(second.attempt_count, 1);
        assert!(
            first
                .external_id
                .as_deref()
                .is_some_and(|id| id.starts_with("MOCK-FAIL-"))
        );
        assert_eq!(
            ctx.orders.get_order(order.uuid).await?.status,
            OrderStatus::Pending
        );

        Ok(())
    }

    #[tokio::test]
    async fn callbacks_without_attempt_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let success = ctx.payments.mark_success(order.uuid).await;
        let failure = ctx.payments.mark_failed(order.uuid, DECLINED.to_string()).await;
        let cancel = ctx.payments.mark_canceled(order.uuid).await;

        assert!(matches!(success, Err(PaymentsServiceError::NoPaymentAttempt)));
        assert!(matches!(failure, Err(PaymentsServiceError::NoPaymentAttempt)));
        assert!(matches!(cancel, Err(PaymentsServiceError::NoPaymentAttempt)));
        assert_eq!(ctx.payments.latest_payment(order.uuid).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn canceled_attempt_cannot_succeed() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.payments.start_online_payment(order.uuid).await?;
        ctx.payments.mark_canceled(order.uuid).await?;

        let result = ctx.payments.mark_success(order.uuid).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::IllegalAttemptTransition {
                    from: PaymentStatus::Canceled,
                    to: PaymentStatus::Succeeded
                })
            ),
            "expected IllegalAttemptTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn success_for_canceled_order_rolls_back() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        ctx.payments.start_online_payment(order.uuid).await?;
        ctx.orders
            .transition(order.uuid, OrderStatus::Canceled, None, None)
            .await?;

        let result = ctx.payments.mark_success(order.uuid).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::Order(
                    OrdersServiceError::IllegalTransition {
                        from: OrderStatus::Canceled,
                        to: OrderStatus::Paid
                    }
                ))
            ),
            "expected IllegalTransition, got {result:?}"
        );

        let latest = ctx.payments.latest_payment(order.uuid).await?;

        assert_eq!(latest.map(|payment| payment.status), Some(PaymentStatus::Processing));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.payments.start_online_payment(OrderUuid::new()).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn success_is_notified_once_for_duplicate_callbacks() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_payment_succeeded()
            .times(1)
            .returning(|_, _| Ok(()));

        let payments = PgPaymentsService::new(
            ctx.app_db(),
            PaymentsConfig::default(),
            Arc::new(MockGateway::new("https://pay.example.com")),
            Arc::new(notifier),
        );

        payments.start_online_payment(order.uuid).await?;
        payments.mark_success(order.uuid).await?;
        payments.mark_success(order.uuid).await?;

        Ok(())
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let cod_order = helpers::place_order(&ctx, PaymentMethod::Cod).await?;
        let online_order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_payment_succeeded()
            .times(2)
            .returning(|_, _| Err(NotificationError::Delivery("smtp down".to_string())));

        let payments = PgPaymentsService::new(
            ctx.app_db(),
            PaymentsConfig::default(),
            Arc::new(MockGateway::new("https://pay.example.com")),
            Arc::new(notifier),
        );

        let cod = payments.start_cod_payment(cod_order.uuid).await?;

        payments.start_online_payment(online_order.uuid).await?;
        let online = payments.mark_success(online_order.uuid).await?;

        assert_eq!(cod.status, PaymentStatus::Succeeded);
        assert_eq!(online.status, PaymentStatus::Succeeded);

        for order in [cod_order.uuid, online_order.uuid] {
            assert_eq!(ctx.orders.get_order(order).await?.status, OrderStatus::Paid);
        }

        Ok(())
    }

    #[tokio::test]
    async fn gateway_decides_provider_and_redirect() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx, PaymentMethod::Online).await?;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_provider()
            .return_const(PaymentProvider::Gateway);
        gateway
            .expect_redirect_for()
            .times(1)
            .returning(|order, _| PaymentRedirect {
                url: format!("https://bank.example.com/pay/{}", order.number),
            });

        let payments = PgPaymentsService::new(
            ctx.app_db(),
            PaymentsConfig {
                max_attempts: 5,
                ..PaymentsConfig::default()
            },
            Arc::new(gateway),
            Arc::new(TracingNotifier),
        );

        let (payment, redirect) = payments.start_online_payment(order.uuid).await?;

        assert_eq!(payment.max_attempts, 5);
        assert_eq!(
            redirect.url,
            format!("https://bank.example.com/pay/{}", order.number)
        );

        Ok(())
    }
}

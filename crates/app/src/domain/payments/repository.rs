//! Payments Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{
        count_to_i32, try_get_count, try_get_optional_timestamp, try_get_parsed, try_get_timestamp,
    },
    domain::{
        orders::records::OrderUuid,
        payments::{
            data::NewPayment,
            records::{PaymentRecord, PaymentUuid},
        },
    },
    money::round_money,
};

const INSERT_PAYMENT_SQL: &str = include_str!("sql/insert_payment.sql");
const LATEST_PAYMENT_SQL: &str = include_str!("sql/latest_payment.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");
const MARK_PAYMENT_SUCCEEDED_SQL: &str = include_str!("sql/mark_payment_succeeded.sql");
const MARK_PAYMENT_FAILED_SQL: &str = include_str!("sql/mark_payment_failed.sql");
const MARK_PAYMENT_CANCELED_SQL: &str = include_str!("sql/mark_payment_canceled.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Append a payment attempt. Succeeded attempts are stamped as paid.
    pub(crate) async fn insert_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: NewPayment,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(INSERT_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.order_uuid.into_uuid())
            .bind(round_money(payment.amount))
            .bind(payment.currency)
            .bind(payment.provider.as_str())
            .bind(payment.status.as_str())
            .bind(payment.external_id)
            .bind(count_to_i32(payment.attempt_count)?)
            .bind(count_to_i32(payment.max_attempts)?)
            .fetch_one(&mut **tx)
            .await
    }

    /// The most recent attempt for the order, if any.
    pub(crate) async fn latest_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LATEST_PAYMENT_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn mark_succeeded(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        external_id: &str,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_PAYMENT_SUCCEEDED_SQL)
            .bind(payment.into_uuid())
            .bind(external_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fail the attempt and consume one retry.
    pub(crate) async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        reason: &str,
        external_id: &str,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_PAYMENT_FAILED_SQL)
            .bind(payment.into_uuid())
            .bind(reason)
            .bind(external_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_canceled(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_PAYMENT_CANCELED_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            provider: try_get_parsed(row, "provider")?,
            status: try_get_parsed(row, "status")?,
            external_id: row.try_get("external_id")?,
            attempt_count: try_get_count(row, "attempt_count")?,
            max_attempts: try_get_count(row, "max_attempts")?,
            last_error: row.try_get("last_error")?,
            paid_at: try_get_optional_timestamp(row, "paid_at")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

//! Order Status Logs Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_parsed, try_get_timestamp},
    domain::orders::{
        records::{OrderStatusLogRecord, OrderStatusLogUuid, OrderUuid},
        status::OrderStatus,
    },
};

const INSERT_STATUS_LOG_SQL: &str = include_str!("../sql/insert_status_log.sql");
const LIST_STATUS_LOGS_SQL: &str = include_str!("../sql/list_status_logs.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderStatusLogsRepository;

impl PgOrderStatusLogsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_log(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        from: OrderStatus,
        to: OrderStatus,
        actor: Option<&str>,
        note: Option<&str>,
    ) -> Result<OrderStatusLogRecord, sqlx::Error> {
        query_as::<Postgres, OrderStatusLogRecord>(INSERT_STATUS_LOG_SQL)
            .bind(OrderStatusLogUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(actor)
            .bind(note)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_logs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderStatusLogRecord>, sqlx::Error> {
        query_as::<Postgres, OrderStatusLogRecord>(LIST_STATUS_LOGS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderStatusLogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderStatusLogUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            from_status: try_get_parsed(row, "from_status")?,
            to_status: try_get_parsed(row, "to_status")?,
            actor: row.try_get("actor")?,
            note: row.try_get("note")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

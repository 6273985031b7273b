//! Orders Repository

use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{try_get_parsed, try_get_timestamp},
    domain::{
        catalog::records::ShippingMethodUuid,
        customers::records::{AddressUuid, CustomerUuid},
        orders::{
            data::NewOrder,
            records::{OrderRecord, OrderUuid},
            status::OrderStatus,
        },
    },
    money::round_money,
    uuids::TypedUuid,
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const ASSIGN_ORDER_NUMBER_SQL: &str = include_str!("../sql/assign_order_number.sql");
const RECALCULATE_TOTALS_SQL: &str = include_str!("../sql/recalculate_totals.sql");
const ADJUST_CHARGES_SQL: &str = include_str!("../sql/adjust_charges.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/get_order_by_number.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a pending order with zero totals and return its sequence id.
    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        new_order: &NewOrder,
        shipping_method: Option<ShippingMethodUuid>,
        shipping_cost: Decimal,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(INSERT_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(new_order.customer_uuid.into_uuid())
            .bind(new_order.shipping_address_uuid.into_uuid())
            .bind(TypedUuid::option_into_uuid(shipping_method))
            .bind(new_order.payment_method.as_str())
            .bind(round_money(shipping_cost))
            .bind(round_money(new_order.discount_total))
            .bind(new_order.notes.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Set the order number unless one was already assigned.
    pub(crate) async fn assign_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        number: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ASSIGN_ORDER_NUMBER_SQL)
            .bind(order.into_uuid())
            .bind(number)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Derive subtotal and grand total from the order's items.
    pub(crate) async fn recalculate_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(RECALCULATE_TOTALS_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn adjust_charges(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        shipping_cost: Option<Decimal>,
        discount_total: Option<Decimal>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ADJUST_CHARGES_SQL)
            .bind(order.into_uuid())
            .bind(shipping_cost.map(round_money))
            .bind(discount_total.map(round_money))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        number: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_NUMBER_SQL)
            .bind(number)
            .fetch_one(&mut **tx)
            .await
    }

    /// Read the order under a row lock held until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            number: row.try_get("number")?,
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            shipping_address_uuid: AddressUuid::from_uuid(row.try_get("shipping_address_uuid")?),
            shipping_method_uuid: row
                .try_get::<Option<Uuid>, _>("shipping_method_uuid")?
                .map(ShippingMethodUuid::from_uuid),
            status: try_get_parsed(row, "status")?,
            payment_method: try_get_parsed(row, "payment_method")?,
            subtotal: row.try_get("subtotal")?,
            shipping_cost: row.try_get("shipping_cost")?,
            discount_total: row.try_get("discount_total")?,
            grand_total: row.try_get("grand_total")?,
            notes: row.try_get("notes")?,
            items: Vec::new(),
            placed_at: try_get_timestamp(row, "placed_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

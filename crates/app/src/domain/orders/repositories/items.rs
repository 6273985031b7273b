//! Order Items Repository

use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{count_to_i32, try_get_count, try_get_timestamp},
    domain::{
        carts::records::CartUuid,
        catalog::records::{ProductUuid, VariantUuid},
        orders::records::{OrderItemRecord, OrderItemUuid, OrderUuid},
    },
    uuids::TypedUuid,
};

const CART_SNAPSHOT_SQL: &str = include_str!("../sql/cart_snapshot.sql");
const CREATE_ORDER_ITEMS_SQL: &str = include_str!("../sql/create_order_items.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("../sql/list_order_items.sql");

/// A cart line as it will be frozen onto an order item.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CartLineSnapshot {
    pub(crate) product_uuid: ProductUuid,
    pub(crate) variant_uuid: Option<VariantUuid>,
    pub(crate) product_name: String,
    pub(crate) sku: String,
    pub(crate) unit_price: Decimal,
    pub(crate) quantity: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Current cart lines with product name and SKU (variant SKU preferred).
    pub(crate) async fn cart_snapshot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartLineSnapshot>, sqlx::Error> {
        query_as::<Postgres, CartLineSnapshot>(CART_SNAPSHOT_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert every snapshot line as an order item in a single statement.
    pub(crate) async fn create_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        lines: &[CartLineSnapshot],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        let mut uuids = Vec::with_capacity(lines.len());
        let mut products = Vec::with_capacity(lines.len());
        let mut variants = Vec::with_capacity(lines.len());
        let mut names = Vec::with_capacity(lines.len());
        let mut skus = Vec::with_capacity(lines.len());
        let mut prices = Vec::with_capacity(lines.len());
        let mut quantities = Vec::with_capacity(lines.len());

        for line in lines {
            uuids.push(OrderItemUuid::new().into_uuid());
            products.push(line.product_uuid.into_uuid());
            variants.push(TypedUuid::option_into_uuid(line.variant_uuid));
            names.push(line.product_name.clone());
            skus.push(line.sku.clone());
            prices.push(line.unit_price);
            quantities.push(count_to_i32(line.quantity)?);
        }

        let mut items = query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .bind(uuids)
            .bind(products)
            .bind(variants)
            .bind(names)
            .bind(skus)
            .bind(prices)
            .bind(quantities)
            .fetch_all(&mut **tx)
            .await?;

        items.sort_by_key(|item| item.uuid);

        Ok(items)
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(LIST_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineSnapshot {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            variant_uuid: row
                .try_get::<Option<Uuid>, _>("variant_uuid")?
                .map(VariantUuid::from_uuid),
            product_name: row.try_get("product_name")?,
            sku: row.try_get("sku")?,
            unit_price: row.try_get("unit_price")?,
            quantity: try_get_count(row, "quantity")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            variant_uuid: row
                .try_get::<Option<Uuid>, _>("variant_uuid")?
                .map(VariantUuid::from_uuid),
            product_name: row.try_get("product_name")?,
            sku: row.try_get("sku")?,
            unit_price: row.try_get("unit_price")?,
            quantity: try_get_count(row, "quantity")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

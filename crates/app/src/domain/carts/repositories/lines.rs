//! Cart Lines Repository

use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::{count_to_i32, try_get_count, try_get_optional_count, try_get_timestamp},
    domain::{
        carts::records::{CartLineRecord, CartLineUuid, CartUuid},
        catalog::records::{ProductUuid, VariantUuid},
    },
};

const LIST_LINES_SQL: &str = include_str!("../sql/list_lines.sql");
const UPSERT_LINE_SQL: &str = include_str!("../sql/upsert_line.sql");
const UPSERT_VARIANT_LINE_SQL: &str = include_str!("../sql/upsert_variant_line.sql");
const LOCK_LINE_SQL: &str = include_str!("../sql/lock_line.sql");
const UPDATE_LINE_QUANTITY_SQL: &str = include_str!("../sql/update_line_quantity.sql");
const DELETE_LINE_SQL: &str = include_str!("../sql/delete_line.sql");
const CLEAR_LINES_SQL: &str = include_str!("../sql/clear_lines.sql");
const MERGE_MATCHING_LINES_SQL: &str = include_str!("../sql/merge_matching_lines.sql");
const MOVE_UNMATCHED_LINES_SQL: &str = include_str!("../sql/move_unmatched_lines.sql");

/// A cart line read under a row lock, with the variant's stock level.
#[derive(Debug, Clone)]
pub(crate) struct LockedLine {
    pub(crate) line: CartLineRecord,
    pub(crate) stock: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(LIST_LINES_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert a line, or add `quantity` to the existing line for the same
    /// product/variant and refresh its price, in one statement.
    pub(crate) async fn upsert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<CartLineRecord, sqlx::Error> {
        let quantity = count_to_i32(quantity)?;
        let line = CartLineUuid::new().into_uuid();

        match variant {
            Some(variant) => {
                query_as::<Postgres, CartLineRecord>(UPSERT_VARIANT_LINE_SQL)
                    .bind(line)
                    .bind(cart.into_uuid())
                    .bind(product.into_uuid())
                    .bind(variant.into_uuid())
                    .bind(quantity)
                    .bind(unit_price)
                    .fetch_one(&mut **tx)
                    .await
            }
            None => {
                query_as::<Postgres, CartLineRecord>(UPSERT_LINE_SQL)
                    .bind(line)
                    .bind(cart.into_uuid())
                    .bind(product.into_uuid())
                    .bind(quantity)
                    .bind(unit_price)
                    .fetch_one(&mut **tx)
                    .await
            }
        }
    }

    pub(crate) async fn lock_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<LockedLine, sqlx::Error> {
        query_as::<Postgres, LockedLine>(LOCK_LINE_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_line_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(UPDATE_LINE_QUANTITY_SQL)
            .bind(line.into_uuid())
            .bind(count_to_i32(quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LINE_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_LINES_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Fold `source` lines into `target`: matching lines have their quantities
    /// summed, the rest are moved across. Returns `(summed, moved)`.
    pub(crate) async fn merge_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<(u64, u64), sqlx::Error> {
        let summed = query(MERGE_MATCHING_LINES_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let moved = query(MOVE_UNMATCHED_LINES_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        debug!(%source, %target, summed, moved, "merged cart lines");

        Ok((summed, moved))
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartLineUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            variant_uuid: row
                .try_get::<Option<Uuid>, _>("variant_uuid")?
                .map(VariantUuid::from_uuid),
            quantity: try_get_count(row, "quantity")?,
            unit_price: row.try_get("unit_price")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for LockedLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            line: CartLineRecord::from_row(row)?,
            stock: try_get_optional_count(row, "stock")?,
        })
    }
}

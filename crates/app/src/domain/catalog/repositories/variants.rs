//! Variants Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{count_to_i32, try_get_optional_count, try_get_timestamp},
    domain::catalog::{
        data::NewVariant,
        records::{ProductUuid, VariantRecord, VariantUuid},
    },
    money::round_money,
};

const CREATE_VARIANT_SQL: &str = include_str!("../sql/create_variant.sql");
const GET_VARIANT_SQL: &str = include_str!("../sql/get_variant.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVariantsRepository;

impl PgVariantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: NewVariant,
    ) -> Result<VariantRecord, sqlx::Error> {
        let stock = variant.stock.map(count_to_i32).transpose()?;

        query_as::<Postgres, VariantRecord>(CREATE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.product_uuid.into_uuid())
            .bind(variant.sku)
            .bind(variant.name)
            .bind(round_money(variant.price_delta))
            .bind(stock)
            .bind(variant.is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(GET_VARIANT_SQL)
            .bind(variant.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for VariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            price_delta: row.try_get("price_delta")?,
            stock: try_get_optional_count(row, "stock")?,
            is_active: row.try_get("is_active")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

//! Shipping Methods Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_timestamp,
    domain::catalog::{
        data::NewShippingMethod,
        records::{ShippingMethodRecord, ShippingMethodUuid},
    },
    money::round_money,
};

const CREATE_SHIPPING_METHOD_SQL: &str = include_str!("../sql/create_shipping_method.sql");
const GET_SHIPPING_METHOD_SQL: &str = include_str!("../sql/get_shipping_method.sql");
const GET_SHIPPING_METHOD_BY_CODE_SQL: &str = include_str!("../sql/get_shipping_method_by_code.sql");
const LIST_SHIPPING_METHODS_SQL: &str = include_str!("../sql/list_shipping_methods.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShippingMethodsRepository;

impl PgShippingMethodsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_shipping_method(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        method: NewShippingMethod,
    ) -> Result<ShippingMethodRecord, sqlx::Error> {
        query_as::<Postgres, ShippingMethodRecord>(CREATE_SHIPPING_METHOD_SQL)
            .bind(method.uuid.into_uuid())
            .bind(method.code)
            .bind(method.name)
            .bind(round_money(method.base_price))
            .bind(method.is_active)
            .bind(days_to_i16(method.est_days_min)?)
            .bind(days_to_i16(method.est_days_max)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_shipping_method(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        method: ShippingMethodUuid,
    ) -> Result<ShippingMethodRecord, sqlx::Error> {
        query_as::<Postgres, ShippingMethodRecord>(GET_SHIPPING_METHOD_SQL)
            .bind(method.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_shipping_method_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<ShippingMethodRecord, sqlx::Error> {
        query_as::<Postgres, ShippingMethodRecord>(GET_SHIPPING_METHOD_BY_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_shipping_methods(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        active_only: bool,
    ) -> Result<Vec<ShippingMethodRecord>, sqlx::Error> {
        query_as::<Postgres, ShippingMethodRecord>(LIST_SHIPPING_METHODS_SQL)
            .bind(active_only)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ShippingMethodRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ShippingMethodUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            base_price: row.try_get("base_price")?,
            is_active: row.try_get("is_active")?,
            est_days_min: try_get_days(row, "est_days_min")?,
            est_days_max: try_get_days(row, "est_days_max")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

fn try_get_days(row: &PgRow, col: &str) -> Result<u16, sqlx::Error> {
    let days: i16 = row.try_get(col)?;

    u16::try_from(days).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn days_to_i16(days: u16) -> Result<i16, sqlx::Error> {
    i16::try_from(days).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

//! Carts Repository

use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::try_get_timestamp,
    domain::{
        carts::records::{CartOwner, CartRecord, CartUuid},
        catalog::records::ShippingMethodUuid,
    },
    uuids::TypedUuid,
};

const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const FIND_CART_BY_OWNER_SQL: &str = include_str!("../sql/find_cart_by_owner.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const SHARE_CART_SQL: &str = include_str!("../sql/share_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const LOCK_CARTS_SQL: &str = include_str!("../sql/lock_carts.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const SET_SHIPPING_METHOD_SQL: &str = include_str!("../sql/set_shipping_method.sql");
const CART_TOTAL_SQL: &str = include_str!("../sql/cart_total.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a cart for `owner` unless one already exists, then return the owner's cart.
    pub(crate) async fn get_or_create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<CartRecord, sqlx::Error> {
        let inserted = query(CREATE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(TypedUuid::option_into_uuid(owner.user_uuid()))
            .bind(owner.session_key())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if inserted > 0 {
            debug!(?owner, "created cart");
        }

        self.find_cart_by_owner(tx, owner)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub(crate) async fn find_cart_by_owner(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_CART_BY_OWNER_SQL)
            .bind(TypedUuid::option_into_uuid(owner.user_uuid()))
            .bind(owner.session_key())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Take a shared lock on the cart row so line edits wait for a checkout in flight.
    pub(crate) async fn share_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SHARE_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LOCK_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock several carts in uuid order, so two merges never wait on each other.
    pub(crate) async fn lock_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        carts: &[CartUuid],
    ) -> Result<Vec<CartRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = carts.iter().copied().map(CartUuid::into_uuid).collect();

        query_as::<Postgres, CartRecord>(LOCK_CARTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_shipping_method(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        method: Option<ShippingMethodUuid>,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SET_SHIPPING_METHOD_SQL)
            .bind(cart.into_uuid())
            .bind(TypedUuid::option_into_uuid(method))
            .fetch_one(&mut **tx)
            .await
    }

    /// Line subtotal plus the selected shipping price, aggregated in the database.
    pub(crate) async fn cart_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Decimal, sqlx::Error> {
        query_scalar::<Postgres, Decimal>(CART_TOTAL_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let owner = CartOwner::from_columns(row.try_get("user_uuid")?, row.try_get("session_key")?)
            .ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "user_uuid".to_string(),
                source: "cart must have exactly one owner".into(),
            })?;

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            owner,
            shipping_method_uuid: row
                .try_get::<Option<Uuid>, _>("shipping_method_uuid")?
                .map(ShippingMethodUuid::from_uuid),
            lines: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::{Span, debug, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartLine,
            errors::CartsServiceError,
            records::{CartLineRecord, CartLineUuid, CartOwner, CartRecord, CartUuid},
            repositories::{PgCartLinesRepository, PgCartsRepository},
        },
        catalog::{
            PgProductsRepository, PgShippingMethodsRepository, PgVariantsRepository,
            records::ShippingMethodUuid,
        },
        customers::records::UserUuid,
    },
    money::clamp_quantity,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    lines: PgCartLinesRepository,
    products: PgProductsRepository,
    variants: PgVariantsRepository,
    shipping_methods: PgShippingMethodsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            lines: PgCartLinesRepository::new(),
            products: PgProductsRepository::new(),
            variants: PgVariantsRepository::new(),
            shipping_methods: PgShippingMethodsRepository::new(),
        }
    }

    async fn load_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut cart: CartRecord,
    ) -> Result<CartRecord, CartsServiceError> {
        cart.lines = self.lines.list_lines(tx, cart.uuid).await?;

        Ok(cart)
    }

    /// Move `guest` lines into `user` and drop the guest cart. Both rows must
    /// already be locked by the caller.
    async fn merge_locked(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        guest: &CartRecord,
        user: &CartRecord,
    ) -> Result<(), CartsServiceError> {
        if guest.uuid == user.uuid
            || !matches!(guest.owner, CartOwner::Session(_))
            || !matches!(user.owner, CartOwner::User(_))
        {
            return Err(CartsServiceError::OwnerMismatch);
        }

        let (summed, moved) = self.lines.merge_lines(tx, guest.uuid, user.uuid).await?;

        self.carts.delete_cart(tx, guest.uuid).await?;

        let span = Span::current();

        span.record("summed_lines", summed);
        span.record("moved_lines", moved);

        Ok(())
    }
}

fn validate_owner(owner: &CartOwner) -> Result<(), CartsServiceError> {
    match owner {
        CartOwner::Session(key) if key.trim().is_empty() => Err(CartsServiceError::BlankSessionKey),
        CartOwner::Session(_) | CartOwner::User(_) => Ok(()),
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.get_or_create_cart",
        skip(self, owner),
        fields(cart_uuid = tracing::field::Empty),
        err
    )]
    async fn get_or_create_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError> {
        validate_owner(&owner)?;

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, &owner).await?;
        let cart = self.load_lines(&mut tx, cart).await?;

        tx.commit().await?;

        Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        Ok(cart)
    }

    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let cart = self.load_lines(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_line",
        skip(self, line),
        fields(
            cart_uuid = %cart,
            product_uuid = %line.product_uuid,
            quantity = line.quantity
        ),
        err
    )]
    async fn add_line(
        &self,
        cart: CartUuid,
        line: NewCartLine,
    ) -> Result<CartLineRecord, CartsServiceError> {
        if line.quantity < 1 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        self.carts.share_cart(&mut tx, cart).await?;

        let product = self.products.get_product(&mut tx, line.product_uuid).await?;

        if !product.is_active {
            return Err(CartsServiceError::ProductUnavailable);
        }

        let variant = match line.variant_uuid {
            Some(variant) => {
                let variant = self.variants.get_variant(&mut tx, variant).await?;

                if variant.product_uuid != product.uuid {
                    return Err(CartsServiceError::VariantMismatch);
                }

                if !variant.is_active {
                    return Err(CartsServiceError::ProductUnavailable);
                }

                Some(variant)
            }
            None => None,
        };

        let unit_price = product.unit_price(variant.as_ref());

        let saved = self
            .lines
            .upsert_line(
                &mut tx,
                cart,
                product.uuid,
                line.variant_uuid,
                line.quantity,
                unit_price,
            )
            .await?;

        tx.commit().await?;

        info!(
            line_uuid = %saved.uuid,
            quantity = saved.quantity,
            unit_price = %saved.unit_price,
            "added cart line"
        );

        Ok(saved)
    }

    #[tracing::instrument(
        name = "carts.service.update_line_quantity",
        skip(self),
        fields(cart_uuid = %cart, line_uuid = %line),
        err
    )]
    async fn update_line_quantity(
        &self,
        cart: CartUuid,
        line: CartLineUuid,
        quantity: i64,
    ) -> Result<Option<CartLineRecord>, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.carts.share_cart(&mut tx, cart).await?;

        let locked = self.lines.lock_line(&mut tx, cart, line).await?;
        let quantity = clamp_quantity(quantity, locked.stock);

        let updated = if quantity == 0 {
            self.lines.delete_line(&mut tx, cart, line).await?;

            None
        } else {
            Some(
                self.lines
                    .update_line_quantity(&mut tx, line, quantity)
                    .await?,
            )
        };

        tx.commit().await?;

        info!(quantity, removed = updated.is_none(), "updated cart line");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "carts.service.remove_line",
        skip(self),
        fields(cart_uuid = %cart, line_uuid = %line),
        err
    )]
    async fn remove_line(&self, cart: CartUuid, line: CartLineUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.lines.delete_line(&mut tx, cart, line).await?;

        tx.commit().await?;

        if rows_affected > 0 {
            info!("removed cart line");
        }

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.merge",
        skip(self),
        fields(
            guest_cart_uuid = %guest,
            user_cart_uuid = %user,
            summed_lines = tracing::field::Empty,
            moved_lines = tracing::field::Empty
        ),
        err
    )]
    async fn merge(&self, guest: CartUuid, user: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = self.carts.lock_carts(&mut tx, &[guest, user]).await?;

        let guest_cart = locked
            .iter()
            .find(|cart| cart.uuid == guest)
            .ok_or(CartsServiceError::NotFound)?;

        let user_cart = locked
            .iter()
            .find(|cart| cart.uuid == user)
            .ok_or(CartsServiceError::NotFound)?;

        self.merge_locked(&mut tx, guest_cart, user_cart).await?;

        tx.commit().await?;

        info!("merged guest cart");

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.merge_on_login",
        skip(self, session_key),
        fields(
            user_uuid = %user,
            cart_uuid = tracing::field::Empty,
            summed_lines = tracing::field::Empty,
            moved_lines = tracing::field::Empty
        ),
        err
    )]
    async fn merge_on_login(
        &self,
        session_key: String,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let guest_owner = CartOwner::Session(session_key);

        validate_owner(&guest_owner)?;

        let mut tx = self.db.begin_transaction().await?;

        let user_cart = self
            .carts
            .get_or_create_cart(&mut tx, &CartOwner::User(user))
            .await?;

        Span::current().record("cart_uuid", tracing::field::display(user_cart.uuid));

        if let Some(guest_cart) = self.carts.find_cart_by_owner(&mut tx, &guest_owner).await? {
            let locked = self
                .carts
                .lock_carts(&mut tx, &[guest_cart.uuid, user_cart.uuid])
                .await?;

            // A concurrent login may have merged and deleted it after the lookup.
            match locked.iter().find(|cart| cart.uuid == guest_cart.uuid) {
                Some(guest_cart) => {
                    self.merge_locked(&mut tx, guest_cart, &user_cart).await?;

                    info!(guest_cart_uuid = %guest_cart.uuid, "merged guest cart on login");
                }
                None => {
                    debug!(guest_cart_uuid = %guest_cart.uuid, "guest cart already merged");
                }
            }
        }

        let cart = self.load_lines(&mut tx, user_cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.set_shipping_method",
        skip(self),
        fields(cart_uuid = %cart, shipping_method_uuid = ?method),
        err
    )]
    async fn set_shipping_method(
        &self,
        cart: CartUuid,
        method: Option<ShippingMethodUuid>,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if let Some(method) = method {
            let method = self
                .shipping_methods
                .get_shipping_method(&mut tx, method)
                .await?;

            if !method.is_active {
                return Err(CartsServiceError::ShippingMethodUnavailable);
            }
        }

        let updated = self.carts.set_shipping_method(&mut tx, cart, method).await?;
        let updated = self.load_lines(&mut tx, updated).await?;

        tx.commit().await?;

        info!("set cart shipping method");

        Ok(updated)
    }

    async fn compute_total(&self, cart: CartUuid) -> Result<Decimal, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let total = self.carts.cart_total(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(total)
    }
}

/// The mutable basket a visitor builds before checkout.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Return the owner's cart, creating an empty one on first use.
    async fn get_or_create_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError>;

    /// Retrieve a cart with its lines.
    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add `quantity` of a product (or variant) to the cart.
    ///
    /// Re-adding the same product/variant increments the existing line and
    /// refreshes its price to current catalog pricing.
    async fn add_line(
        &self,
        cart: CartUuid,
        line: NewCartLine,
    ) -> Result<CartLineRecord, CartsServiceError>;

    /// Set a line's quantity, clamped to tracked variant stock.
    ///
    /// A quantity that ends up at zero or below removes the line and returns `None`.
    async fn update_line_quantity(
        &self,
        cart: CartUuid,
        line: CartLineUuid,
        quantity: i64,
    ) -> Result<Option<CartLineRecord>, CartsServiceError>;

    /// Delete a line from the cart. Deleting a line that is already gone, or
    /// that belongs to another cart, does nothing.
    async fn remove_line(&self, cart: CartUuid, line: CartLineUuid) -> Result<(), CartsServiceError>;

    /// Fold a guest cart into a user's cart and delete the guest cart.
    async fn merge(&self, guest: CartUuid, user: CartUuid) -> Result<(), CartsServiceError>;

    /// Login hook: merge the session's guest cart, if any, into the user's cart.
    async fn merge_on_login(
        &self,
        session_key: String,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    async fn set_shipping_method(
        &self,
        cart: CartUuid,
        method: Option<ShippingMethodUuid>,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Lines subtotal plus the selected shipping price. Empty carts total zero.
    async fn compute_total(&self, cart: CartUuid) -> Result<Decimal, CartsServiceError>;
}

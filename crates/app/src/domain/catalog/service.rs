//! Catalog service.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        data::{NewProduct, NewShippingMethod, NewVariant},
        errors::CatalogServiceError,
        records::{
            ProductRecord, ProductUuid, ShippingMethodRecord, ShippingMethodUuid, VariantRecord,
            VariantUuid,
        },
        repositories::{PgProductsRepository, PgShippingMethodsRepository, PgVariantsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    products: PgProductsRepository,
    variants: PgVariantsRepository,
    shipping_methods: PgShippingMethodsRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            products: PgProductsRepository::new(),
            variants: PgVariantsRepository::new(),
            shipping_methods: PgShippingMethodsRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid, sku = %product.sku),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self.products.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.products.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn list_products(
        &self,
        active_only: bool,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.products.list_products(&mut tx, active_only).await?;

        tx.commit().await?;

        Ok(products)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product_price",
        skip(self),
        fields(product_uuid = %product, price = %price),
        err
    )]
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: Decimal,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .products
            .update_product_price(&mut tx, product, price)
            .await?;

        tx.commit().await?;

        info!(product_uuid = %updated.uuid, price = %updated.price, "updated product price");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "catalog.service.create_variant",
        skip(self, variant),
        fields(variant_uuid = %variant.uuid, product_uuid = %variant.product_uuid),
        err
    )]
    async fn create_variant(
        &self,
        variant: NewVariant,
    ) -> Result<VariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self.variants.create_variant(&mut tx, variant).await?;

        tx.commit().await?;

        info!(variant_uuid = %created.uuid, "created variant");

        Ok(created)
    }

    async fn get_variant(&self, variant: VariantUuid) -> Result<VariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let variant = self.variants.get_variant(&mut tx, variant).await?;

        tx.commit().await?;

        Ok(variant)
    }

    #[tracing::instrument(
        name = "catalog.service.create_shipping_method",
        skip(self, method),
        fields(shipping_method_uuid = %method.uuid, code = %method.code),
        err
    )]
    async fn create_shipping_method(
        &self,
        method: NewShippingMethod,
    ) -> Result<ShippingMethodRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .shipping_methods
            .create_shipping_method(&mut tx, method)
            .await?;

        tx.commit().await?;

        info!(shipping_method_uuid = %created.uuid, code = %created.code, "created shipping method");

        Ok(created)
    }

    async fn get_shipping_method(
        &self,
        method: ShippingMethodUuid,
    ) -> Result<ShippingMethodRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let method = self
            .shipping_methods
            .get_shipping_method(&mut tx, method)
            .await?;

        tx.commit().await?;

        Ok(method)
    }

    async fn get_shipping_method_by_code(
        &self,
        code: &str,
    ) -> Result<ShippingMethodRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let method = self
            .shipping_methods
            .get_shipping_method_by_code(&mut tx, code)
            .await?;

        tx.commit().await?;

        Ok(method)
    }

    async fn list_shipping_methods(
        &self,
        active_only: bool,
    ) -> Result<Vec<ShippingMethodRecord>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let methods = self
            .shipping_methods
            .list_shipping_methods(&mut tx, active_only)
            .await?;

        tx.commit().await?;

        Ok(methods)
    }
}

/// Products, variants and shipping methods the checkout reads prices from.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError>;

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError>;

    /// Products ordered by name; inactive ones are skipped when `active_only` is set.
    async fn list_products(
        &self,
        active_only: bool,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError>;

    /// Change the base price. Existing cart lines keep their snapshot until re-added.
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: Decimal,
    ) -> Result<ProductRecord, CatalogServiceError>;

    async fn create_variant(
        &self,
        variant: NewVariant,
    ) -> Result<VariantRecord, CatalogServiceError>;

    async fn get_variant(&self, variant: VariantUuid) -> Result<VariantRecord, CatalogServiceError>;

    async fn create_shipping_method(
        &self,
        method: NewShippingMethod,
    ) -> Result<ShippingMethodRecord, CatalogServiceError>;

    async fn get_shipping_method(
        &self,
        method: ShippingMethodUuid,
    ) -> Result<ShippingMethodRecord, CatalogServiceError>;

    async fn get_shipping_method_by_code(
        &self,
        code: &str,
    ) -> Result<ShippingMethodRecord, CatalogServiceError>;

    /// Shipping methods ordered from cheapest.
    async fn list_shipping_methods(
        &self,
        active_only: bool,
    ) -> Result<Vec<ShippingMethodRecord>, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers};

    use super::*;

    #[tokio::test]
    async fn create_product_rounds_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx
            .catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: "Teapot".to_string(),
                sku: "TEA-1".to_string(),
                price: dec!(19.999),
                is_active: true,
            })
            .await?;

        assert_eq!(product.price, dec!(20.00));
        assert_eq!(ctx.catalog.get_product(product.uuid).await?, product);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_product(&ctx, "DUP", dec!(1.00)).await?;

        let result = helpers::create_product(&ctx, "DUP", dec!(2.00)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn negative_price_returns_invalid_data() {
        let ctx = TestContext::new().await;

        let result = helpers::create_product(&ctx, "NEG", dec!(-1.00)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_products_can_skip_inactive() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_product(&ctx, "ON", dec!(1.00)).await?;

        ctx.catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: "Retired".to_string(),
                sku: "OFF".to_string(),
                price: dec!(1.00),
                is_active: false,
            })
            .await?;

        assert_eq!(ctx.catalog.list_products(false).await?.len(), 2);

        let active = ctx.catalog.list_products(true).await?;

        assert_eq!(active.len(), 1);
        assert!(active.iter().all(|product| product.is_active));

        Ok(())
    }

    #[tokio::test]
    async fn update_product_price_changes_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = helpers::create_product(&ctx, "MUG", dec!(10.00)).await?;

        let updated = ctx
            .catalog
            .update_product_price(product.uuid, dec!(12.345))
            .await?;

        assert_eq!(updated.price, dec!(12.35));

        Ok(())
    }

    #[tokio::test]
    async fn create_variant_for_unknown_product_returns_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_variant(NewVariant {
                uuid: VariantUuid::new(),
                product_uuid: ProductUuid::new(),
                sku: "GHOST-L".to_string(),
                name: "Large".to_string(),
                price_delta: Decimal::ZERO,
                stock: None,
                is_active: true,
            })
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn variant_keeps_tracked_stock() -> TestResult {
        let ctx = TestContext::new().await;

        let product = helpers::create_product(&ctx, "SHIRT", dec!(20.00)).await?;
        let variant = helpers::create_variant(&ctx, &product, "SHIRT-M", dec!(1.50), Some(4)).await?;

        let fetched = ctx.catalog.get_variant(variant.uuid).await?;

        assert_eq!(fetched.stock, Some(4));
        assert_eq!(fetched.product_uuid, product.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn shipping_methods_are_listed_cheapest_first() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_shipping_method(&ctx, "express", dec!(29.00)).await?;
        helpers::create_shipping_method(&ctx, "pickup", Decimal::ZERO).await?;

        let methods = ctx.catalog.list_shipping_methods(true).await?;

        let codes: Vec<&str> = methods.iter().map(|method| method.code.as_str()).collect();

        assert_eq!(codes, ["pickup", "express"]);
        assert_eq!(
            ctx.catalog.get_shipping_method_by_code("express").await?.base_price,
            dec!(29.00)
        );

        Ok(())
    }

    #[tokio::test]
    async fn shipping_method_rejects_inverted_delivery_window() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_shipping_method(NewShippingMethod {
                uuid: ShippingMethodUuid::new(),
                code: "slow".to_string(),
                name: "Slow".to_string(),
                base_price: Decimal::ZERO,
                is_active: true,
                est_days_min: 9,
                est_days_max: 3,
            })
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }
}

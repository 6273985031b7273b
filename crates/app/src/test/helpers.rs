//! Test Helpers

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testresult::TestResult;

use crate::{
    domain::{
        carts::{
            CartsService, CartsServiceError,
            data::NewCartLine,
            records::{CartLineRecord, CartOwner, CartRecord, CartUuid},
        },
        catalog::{
            CatalogService, CatalogServiceError,
            data::{NewProduct, NewShippingMethod, NewVariant},
            records::{
                ProductRecord, ProductUuid, ShippingMethodRecord, ShippingMethodUuid,
                VariantRecord, VariantUuid,
            },
        },
        customers::{
            CustomersService, CustomersServiceError,
            data::NewAddress,
            records::{AddressRecord, AddressUuid, CustomerRecord, UserUuid},
        },
        orders::{
            OrdersService,
            data::NewOrder,
            records::{OrderRecord, PaymentMethod},
        },
    },
    test::TestContext,
};

/// A customer with an address and a guest cart holding `MUG` ×2 at 10.00
/// and `PEN` ×1 at 5.00.
#[derive(Debug)]
pub(crate) struct Checkout {
    pub(crate) customer: CustomerRecord,
    pub(crate) address: AddressRecord,
    pub(crate) cart: CartRecord,
    pub(crate) mug: ProductRecord,
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    sku: &str,
    price: Decimal,
) -> Result<ProductRecord, CatalogServiceError> {
    ctx.catalog
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            price,
            is_active: true,
        })
        .await
}

pub(crate) async fn create_variant(
    ctx: &TestContext,
    product: &ProductRecord,
    sku: &str,
    price_delta: Decimal,
    stock: Option<u32>,
) -> Result<VariantRecord, CatalogServiceError> {
    ctx.catalog
        .create_variant(NewVariant {
            uuid: VariantUuid::new(),
            product_uuid: product.uuid,
            sku: sku.to_string(),
            name: format!("Variant {sku}"),
            price_delta,
            stock,
            is_active: true,
        })
        .await
}

pub(crate) async fn create_shipping_method(
    ctx: &TestContext,
    code: &str,
    base_price: Decimal,
) -> Result<ShippingMethodRecord, CatalogServiceError> {
    ctx.catalog
        .create_shipping_method(NewShippingMethod {
            uuid: ShippingMethodUuid::new(),
            code: code.to_string(),
            name: format!("Shipping {code}"),
            base_price,
            is_active: true,
            est_days_min: 1,
            est_days_max: 3,
        })
        .await
}

pub(crate) async fn create_customer(
    ctx: &TestContext,
) -> Result<CustomerRecord, CustomersServiceError> {
    let user = UserUuid::new();

    ctx.customers
        .ensure_customer(user, format!("{user}@example.com"))
        .await
}

pub(crate) fn new_address(is_default: bool) -> NewAddress {
    NewAddress {
        uuid: AddressUuid::new(),
        full_name: "Sara Ahmadi".to_string(),
        phone: "+98 912 000 0000".to_string(),
        country: "IR".to_string(),
        city: "Tehran".to_string(),
        postal_code: "1234567890".to_string(),
        line1: "12 Valiasr St".to_string(),
        line2: String::new(),
        is_default,
    }
}

pub(crate) async fn guest_cart(
    ctx: &TestContext,
    session_key: &str,
) -> Result<CartRecord, CartsServiceError> {
    ctx.carts
        .get_or_create_cart(CartOwner::Session(session_key.to_string()))
        .await
}

pub(crate) async fn add_line(
    ctx: &TestContext,
    cart: CartUuid,
    product: &ProductRecord,
    quantity: u32,
) -> Result<CartLineRecord, CartsServiceError> {
    ctx.carts
        .add_line(
            cart,
            NewCartLine {
                product_uuid: product.uuid,
                variant_uuid: None,
                quantity,
            },
        )
        .await
}

async fn build_checkout(ctx: &TestContext, tag: &str) -> TestResult<Checkout> {
    let customer = create_customer(ctx).await?;

    let address = ctx
        .customers
        .add_address(customer.uuid, new_address(true))
        .await?;

    let mug = create_product(ctx, &format!("MUG{tag}"), dec!(10.00)).await?;
    let pen = create_product(ctx, &format!("PEN{tag}"), dec!(5.00)).await?;

    let cart = guest_cart(ctx, &format!("checkout-session{tag}")).await?;

    add_line(ctx, cart.uuid, &mug, 2).await?;
    add_line(ctx, cart.uuid, &pen, 1).await?;

    Ok(Checkout {
        customer,
        address,
        cart,
        mug,
    })
}

pub(crate) async fn checkout_fixture(ctx: &TestContext) -> TestResult<Checkout> {
    build_checkout(ctx, "").await
}

pub(crate) fn new_order(checkout: &Checkout, payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        customer_uuid: checkout.customer.uuid,
        shipping_address_uuid: checkout.address.uuid,
        cart_uuid: checkout.cart.uuid,
        shipping_method_uuid: None,
        payment_method,
        discount_total: Decimal::ZERO,
        notes: String::new(),
    }
}

/// Place a pending 25.00 order from a fresh cart. Safe to call repeatedly
/// within one test.
pub(crate) async fn place_order(
    ctx: &TestContext,
    payment_method: PaymentMethod,
) -> TestResult<OrderRecord> {
    let checkout = build_checkout(ctx, &format!("-{}", UserUuid::new())).await?;

    Ok(ctx
        .orders
        .create_from_cart(new_order(&checkout, payment_method))
        .await?)
}

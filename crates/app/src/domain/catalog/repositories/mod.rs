//! Catalog Repositories

mod products;
mod shipping_methods;
mod variants;

pub(crate) use products::PgProductsRepository;
pub(crate) use shipping_methods::PgShippingMethodsRepository;
pub(crate) use variants::PgVariantsRepository;

//! Catalog

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CatalogServiceError;
pub(crate) use repositories::{
    PgProductsRepository, PgShippingMethodsRepository, PgVariantsRepository,
};
pub use service::*;

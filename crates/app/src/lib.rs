//! Cart, order and payment core for the storefront checkout.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod money;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;

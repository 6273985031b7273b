//! Payments

mod data;
pub mod errors;
pub mod gateway;
pub mod records;
mod repository;
pub mod service;
pub mod status;

pub use errors::PaymentsServiceError;
pub use gateway::{MockGateway, PaymentGateway, PaymentRedirect};
pub use service::*;

//! Orders

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod service;
mod state_machine;
pub mod status;

pub use errors::OrdersServiceError;
pub(crate) use repositories::PgOrdersRepository;
pub use service::*;
pub(crate) use state_machine::OrderStateMachine;

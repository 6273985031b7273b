//! Order Repositories

mod items;
mod orders;
mod status_logs;

pub(crate) use items::{CartLineSnapshot, PgOrderItemsRepository};
pub(crate) use orders::PgOrdersRepository;
pub(crate) use status_logs::PgOrderStatusLogsRepository;

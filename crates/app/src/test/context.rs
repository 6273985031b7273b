//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    config::{orders::OrdersConfig, payments::PaymentsConfig},
    database::Db,
    domain::{
        carts::PgCartsService,
        catalog::PgCatalogService,
        customers::PgCustomersService,
        notifications::TracingNotifier,
        orders::PgOrdersService,
        payments::{MockGateway, PgPaymentsService},
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub catalog: PgCatalogService,
    pub customers: PgCustomersService,
    pub carts: PgCartsService,
    pub orders: PgOrdersService,
    pub payments: PgPaymentsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let payments_config = PaymentsConfig::default();
        let notifier = Arc::new(TracingNotifier);

        Self {
            catalog: PgCatalogService::new(db.clone()),
            customers: PgCustomersService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            orders: PgOrdersService::new(db.clone(), OrdersConfig::default(), notifier.clone()),
            payments: PgPaymentsService::new(
                db,
                payments_config.clone(),
                Arc::new(MockGateway::new(payments_config.gateway_base_url)),
                notifier,
            ),
            db: test_db,
        }
    }

    /// A handle on the test database for building services with custom
    /// collaborators.
    pub fn app_db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }
}

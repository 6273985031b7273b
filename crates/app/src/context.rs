//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        catalog::{CatalogService, PgCatalogService},
        customers::{CustomersService, PgCustomersService},
        notifications::{Notifier, TracingNotifier},
        orders::{OrdersService, PgOrdersService},
        payments::{MockGateway, PaymentsService, PgPaymentsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub db: Db,
    pub catalog: Arc<dyn CatalogService>,
    pub customers: Arc<dyn CustomersService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Connect to the database and wire every service.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or, if requested, migrating fails.
    pub async fn from_config(config: &AppConfig, run_migrations: bool) -> Result<Self, AppInitError> {
        let pool = database::connect(
            &config.database.database_url,
            config.database.max_connections,
        )
        .await
        .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        info!(max_connections = config.database.max_connections, "connected to database");

        Ok(Self::from_db(Db::new(pool), config, Arc::new(TracingNotifier)))
    }

    /// Wire every service over an existing pool with the given notifier.
    #[must_use]
    pub fn from_db(db: Db, config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let gateway = Arc::new(MockGateway::new(config.payments.gateway_base_url.clone()));

        Self {
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            customers: Arc::new(PgCustomersService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db.clone(),
                config.orders.clone(),
                notifier.clone(),
            )),
            payments: Arc::new(PgPaymentsService::new(
                db.clone(),
                config.payments.clone(),
                gateway,
                notifier,
            )),
            db,
        }
    }
}

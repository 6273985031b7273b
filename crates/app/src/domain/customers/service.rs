//! Customers service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::customers::{
        data::NewAddress,
        errors::CustomersServiceError,
        records::{AddressRecord, AddressUuid, CustomerRecord, CustomerUuid, UserUuid},
        repository::PgCustomersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    #[tracing::instrument(
        name = "customers.service.ensure_customer",
        skip(self, email),
        fields(user_uuid = %user),
        err
    )]
    async fn ensure_customer(
        &self,
        user: UserUuid,
        email: String,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let customer = self
            .repository
            .ensure_customer(&mut tx, user, &email)
            .await?;

        tx.commit().await?;

        info!(customer_uuid = %customer.uuid, "ensured customer");

        Ok(customer)
    }

    async fn get_customer_by_user(
        &self,
        user: UserUuid,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let customer = self.repository.get_customer_by_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(customer)
    }

    #[tracing::instrument(
        name = "customers.service.add_address",
        skip(self, address),
        fields(
            customer_uuid = %customer,
            address_uuid = %address.uuid,
            is_default = address.is_default
        ),
        err
    )]
    async fn add_address(
        &self,
        customer: CustomerUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if address.is_default {
            self.repository
                .clear_default_address(&mut tx, customer)
                .await?;
        }

        let created = self
            .repository
            .create_address(&mut tx, customer, address)
            .await?;

        tx.commit().await?;

        info!(address_uuid = %created.uuid, "added address");

        Ok(created)
    }

    async fn get_address(
        &self,
        customer: CustomerUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let address = self
            .repository
            .get_address(&mut tx, customer, address)
            .await?;

        tx.commit().await?;

        Ok(address)
    }

    async fn list_addresses(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let addresses = self.repository.list_addresses(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(addresses)
    }
}

/// Customer profiles and their delivery addresses.
#[automock]
#[async_trait]
pub trait CustomersService: Send + Sync {
    /// Return the customer linked to `user`, creating it on first call.
    ///
    /// Registration calls this explicitly; an existing customer keeps its email.
    async fn ensure_customer(
        &self,
        user: UserUuid,
        email: String,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    async fn get_customer_by_user(
        &self,
        user: UserUuid,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Add an address. A new default address replaces the previous default.
    async fn add_address(
        &self,
        customer: CustomerUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError>;

    /// Fetch an address, scoped to its owning customer.
    async fn get_address(
        &self,
        customer: CustomerUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, CustomersServiceError>;

    /// Default address first, then newest.
    async fn list_addresses(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError>;
}

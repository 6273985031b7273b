//! Customer Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// An authenticated user of the external accounts system.
#[derive(Debug)]
pub struct UserRecord;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Customer Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub user_uuid: UserUuid,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// Address Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub customer_uuid: CustomerUuid,
    pub full_name: String,
    pub phone: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub line1: String,
    pub line2: String,
    pub is_default: bool,
    pub created_at: Timestamp,
}

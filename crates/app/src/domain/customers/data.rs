//! Customer Data

use crate::domain::customers::records::AddressUuid;

/// New Address Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub full_name: String,
    pub phone: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub line1: String,
    pub line2: String,
    pub is_default: bool,
}

//! Cart Data

use crate::domain::catalog::records::{ProductUuid, VariantUuid};

/// New Cart Line Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub product_uuid: ProductUuid,
    pub variant_uuid: Option<VariantUuid>,
    pub quantity: u32,
}

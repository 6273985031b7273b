//! Cart Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{
        catalog::records::{ProductUuid, ShippingMethodUuid, VariantUuid},
        customers::records::UserUuid,
    },
    money::line_total,
    uuids::TypedUuid,
};

/// Who a cart belongs to. Exactly one owner per cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOwner {
    User(UserUuid),

    /// Anonymous visitor identified by a session key.
    Session(String),
}

impl CartOwner {
    #[must_use]
    pub fn user_uuid(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Session(_) => None,
        }
    }

    #[must_use]
    pub fn session_key(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(key) => Some(key),
        }
    }

    pub(crate) fn from_columns(user: Option<Uuid>, session_key: Option<String>) -> Option<Self> {
        match (user, session_key) {
            (Some(user), None) => Some(Self::User(UserUuid::from_uuid(user))),
            (None, Some(key)) => Some(Self::Session(key)),
            _ => None,
        }
    }
}

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub shipping_method_uuid: Option<ShippingMethodUuid>,
    pub lines: Vec<CartLineRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// The line for a product/variant identity, if the cart holds one.
    #[must_use]
    pub fn find_line(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
    ) -> Option<&CartLineRecord> {
        self.lines
            .iter()
            .find(|line| line.product_uuid == product && line.variant_uuid == variant)
    }
}

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLineRecord>;

/// Cart Line Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineRecord {
    pub uuid: CartLineUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub variant_uuid: Option<VariantUuid>,
    pub quantity: u32,
    /// Price captured on the most recent add.
    pub unit_price: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartLineRecord {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_requires_exactly_one_column() {
        let user = Uuid::now_v7();

        assert_eq!(
            CartOwner::from_columns(Some(user), None),
            Some(CartOwner::User(UserUuid::from_uuid(user)))
        );
        assert_eq!(
            CartOwner::from_columns(None, Some("abc".to_string())),
            Some(CartOwner::Session("abc".to_string()))
        );
        assert_eq!(CartOwner::from_columns(None, None), None);
        assert_eq!(
            CartOwner::from_columns(Some(user), Some("abc".to_string())),
            None
        );
    }
}

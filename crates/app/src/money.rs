//! Money and quantity helpers shared by carts, orders and payments.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Decimal places kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest quantity a single line may carry (the column is a 32-bit integer).
pub const MAX_QUANTITY: u32 = 2_147_483_647;

#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("invalid amount")]
    Parse(#[from] rust_decimal::Error),

    #[error("amount must not be negative")]
    Negative,
}

/// Round to the stored scale, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a non-negative amount such as `"12.5"` into a rounded decimal.
///
/// # Errors
///
/// Returns an error when the input is not a decimal number or is negative.
pub fn parse_money(input: &str) -> Result<Decimal, MoneyError> {
    let amount = Decimal::from_str(input.trim())?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }

    Ok(round_money(amount))
}

#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// `Σ unit_price × quantity` over the given lines.
#[must_use]
pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (price, quantity)| {
            acc + line_total(price, quantity)
        })
}

/// `subtotal + shipping_cost − discount_total`, never below zero.
#[must_use]
pub fn grand_total(subtotal: Decimal, shipping_cost: Decimal, discount_total: Decimal) -> Decimal {
    round_money(subtotal + shipping_cost - discount_total).max(Decimal::ZERO)
}

/// Coerce a requested quantity into range: negatives become zero and a
/// tracked stock level caps the result.
#[must_use]
pub fn clamp_quantity(requested: i64, stock: Option<u32>) -> u32 {
    let requested = u32::try_from(requested.max(0))
        .unwrap_or(MAX_QUANTITY)
        .min(MAX_QUANTITY);

    match stock {
        Some(stock) => requested.min(stock),
        None => requested,
    }
}

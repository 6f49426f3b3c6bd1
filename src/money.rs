//! Currency rounding and formatting.
//!
//! All amounts are [`Decimal`]s in US dollars. Derived fields are rounded once, when they
//! are produced, with [`round2`]; intermediate values keep full precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored and displayed for monetary amounts.
pub const DECIMAL_PLACES: u32 = 2;

/// Symbol prepended by [`format_currency`].
pub const CURRENCY_SYMBOL: &str = "$";

/// Round to two decimal places, half-up (midpoint away from zero).
#[inline]
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount as `$#,##0.00`.
///
/// Negative amounts render with a leading minus sign: `-$1,234.50`.
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    // `{:.2}` pads the scale so `12.5` renders as `12.50`
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{fraction}")
}

/// Express `rate` percent of `amount`, unrounded.
///
/// Returns `None` when the product does not fit in a [`Decimal`].
#[inline]
#[must_use]
pub(crate) fn percent_of(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount.checked_mul(rate)?.checked_div(Decimal::ONE_HUNDRED)
}

//! Pricing pipeline: subtotal → discount → tax → shipping → total.
//!
//! [`compute_breakdown`] is pure. Invoices call it again with the full set of inputs
//! whenever a line item or a term changes; a breakdown is never patched in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    entities::line_item::LineItem,
    error::{Error, Result},
    money::{percent_of, round2},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    #[default]
    Fixed,
    Percentage,
}

/// Invoice-level discount. A percentage `value` is nominally 0–100; the resulting
/// amount is always clamped to `[0, subtotal]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSpec {
    #[serde(rename = "type", default)]
    pub kind: DiscountKind,
    #[serde(default)]
    pub value: Decimal,
}

impl DiscountSpec {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fixed(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Fixed,
            value,
        }
    }

    #[must_use]
    pub fn percentage(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Percentage,
            value,
        }
    }

    /// Discount on `subtotal`, clamped to `[0, subtotal]` and unrounded.
    ///
    /// A percentage above 100 is treated as 100.
    pub fn amount_for(&self, subtotal: Decimal) -> Result<Decimal> {
        let raw = match self.kind {
            DiscountKind::Fixed => self.value,
            DiscountKind::Percentage => {
                let rate = self.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
                percent_of(subtotal, rate).ok_or_else(|| out_of_range("discount"))?
            }
        };
        Ok(raw.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO)))
    }
}

/// The pricing inputs an invoice keeps alongside its line items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTerms {
    #[serde(default)]
    pub discount: DiscountSpec,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
}

impl PricingTerms {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.discount.value < Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "discount value must not be negative, got {}",
                self.discount.value
            )));
        }
        if self.tax_rate < Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "tax rate must not be negative, got {}",
                self.tax_rate
            )));
        }
        if self.shipping_fee < Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "shipping fee must not be negative, got {}",
                self.shipping_fee
            )));
        }
        Ok(())
    }
}

/// Subtotal/discount/tax/shipping/total decomposition of an invoice.
///
/// Every amount is rounded to cents and `total_amount` is always the sum of the
/// rounded components: `subtotal - discount_amount + tax_amount + shipping_fee`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingBreakdown {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub discount: DiscountSpec,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
}

impl BillingBreakdown {
    /// The breakdown of a draft that has no line items yet.
    #[must_use]
    pub fn empty(terms: PricingTerms) -> Self {
        Self {
            discount: terms.discount,
            tax_rate: terms.tax_rate,
            ..Self::default()
        }
    }

    /// The inputs this breakdown was computed from.
    #[must_use]
    pub fn terms(&self) -> PricingTerms {
        PricingTerms {
            discount: self.discount,
            tax_rate: self.tax_rate,
            shipping_fee: self.shipping_fee,
        }
    }

    /// Amount the tax was levied on.
    #[must_use]
    pub fn taxable_amount(&self) -> Decimal {
        self.subtotal - self.discount_amount
    }
}

/// Price `line_items` under `terms`.
///
/// Fails with [`Error::InvalidInput`] when there are no line items, a quantity is zero,
/// a unit price is negative, or any of the terms is negative.
#[instrument(level = "debug", skip(line_items), fields(lines = line_items.len()))]
pub fn compute_breakdown(line_items: &[LineItem], terms: PricingTerms) -> Result<BillingBreakdown> {
    if line_items.is_empty() {
        return Err(Error::invalid_input("an invoice needs at least one line item"));
    }
    for item in line_items {
        item.validate()?;
    }
    terms.validate()?;

    let subtotal = line_items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(item.line_total()?)
            .ok_or_else(|| out_of_range("subtotal"))
    })?;
    let discount_amount = terms.discount.amount_for(subtotal)?;
    // shipping is never taxed
    let tax_amount = percent_of(subtotal - discount_amount, terms.tax_rate)
        .ok_or_else(|| out_of_range("tax amount"))?;

    let subtotal = round2(subtotal);
    let discount_amount = round2(discount_amount);
    let tax_amount = round2(tax_amount);
    let shipping_fee = round2(terms.shipping_fee);
    let total_amount = (subtotal - discount_amount)
        .checked_add(tax_amount)
        .and_then(|amount| amount.checked_add(shipping_fee))
        .map(round2)
        .ok_or_else(|| out_of_range("total amount"))?;

    let breakdown = BillingBreakdown {
        subtotal,
        discount_amount,
        discount: terms.discount,
        tax_rate: terms.tax_rate,
        tax_amount,
        shipping_fee,
        total_amount,
    };
    debug!(?breakdown, "computed billing breakdown");
    Ok(breakdown)
}

fn out_of_range(what: &str) -> Error {
    Error::invalid_input(format!("{what} is too large to represent"))
}

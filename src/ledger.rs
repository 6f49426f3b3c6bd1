//! The payment ledger: an append-only record of payments applied against an
//! invoice's total.
//!
//! Ledger amounts are stored at full precision. `paid_amount + remaining_balance`
//! always equals the billed total exactly.

use rust_decimal::Decimal;

use crate::{
    entities::{invoice::Invoice, payment::PaymentRecord},
    error::{Error, Result},
};

/// Sum of all payments applied to `invoice`.
#[must_use]
pub fn paid_amount(invoice: &Invoice) -> Decimal {
    invoice.ledger.iter().map(|record| record.amount).sum()
}

/// `total_amount - paid_amount`, floored at zero.
#[must_use]
pub fn remaining_balance(invoice: &Invoice) -> Decimal {
    let remaining = invoice.billing.total_amount - paid_amount(invoice);
    if remaining < Decimal::ZERO {
        // unreachable through apply_payment; the overpayment guard prevents it
        error!(
            invoice_number = %invoice.invoice_number,
            %remaining,
            "ledger exceeds invoice total"
        );
        return Decimal::ZERO;
    }
    remaining
}

/// Payments in the order they were applied.
#[must_use]
pub fn history(invoice: &Invoice) -> std::slice::Iter<'_, PaymentRecord> {
    invoice.ledger.iter()
}

/// Append `record` to the ledger, returning the updated invoice.
///
/// # Errors
/// - [`Error::InvalidInput`] if the amount is not positive, the transaction id is blank
///   or already on the ledger, or the invoice is a draft or has been superseded.
/// - [`Error::Overpayment`] if the amount exceeds the remaining balance.
///
/// On error `invoice` is unchanged.
pub fn apply_payment(invoice: &Invoice, record: PaymentRecord) -> Result<Invoice> {
    if record.amount <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "payment amount must be positive, got {}",
            record.amount
        )));
    }
    if record.transaction_id.trim().is_empty() {
        return Err(Error::invalid_input("payment transaction id must not be empty"));
    }
    if !invoice.is_finalized() {
        return Err(Error::invalid_input(format!(
            "invoice {} is still a draft and cannot take payments",
            invoice.invoice_number
        )));
    }
    if invoice.is_closed() {
        return Err(Error::invalid_input(format!(
            "invoice {} has been superseded and cannot take payments",
            invoice.invoice_number
        )));
    }
    if history(invoice).any(|existing| existing.transaction_id == record.transaction_id) {
        return Err(Error::invalid_input(format!(
            "transaction {} has already been applied to invoice {}",
            record.transaction_id, invoice.invoice_number
        )));
    }

    let remaining = remaining_balance(invoice);
    if record.amount > remaining {
        warn!(
            invoice_number = %invoice.invoice_number,
            amount = %record.amount,
            %remaining,
            "rejected overpayment"
        );
        return Err(Error::overpayment(
            &invoice.invoice_number,
            record.amount,
            remaining,
        ));
    }

    debug!(
        invoice_number = %invoice.invoice_number,
        amount = %record.amount,
        transaction_id = %record.transaction_id,
        "applying payment"
    );
    let mut updated = invoice.clone();
    updated.ledger.push(record);
    if remaining_balance(&updated).is_zero() {
        info!(invoice_number = %updated.invoice_number, "invoice paid in full");
    }
    Ok(updated)
}

//! Sentry integration for billing errors.
//!
//! Only available with the `sentry` feature:
//!
//! ```toml
//! [dependencies]
//! brand-billing = { version = "0.1", features = ["sentry"] }
//! ```
//!
//! Span traces are only populated when the subscriber has an `ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

/// Breadcrumb for a failed billing operation. Validation failures are recorded at
/// warning level; missing invoices and bad data at error level.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        let (category, level, message) = match error {
            Error::InvalidInput { reason, .. } => (
                "billing.validation",
                sentry_core::Level::Warning,
                format!("Invalid input: {reason}"),
            ),

            Error::Overpayment {
                invoice_number,
                amount,
                remaining_balance,
                ..
            } => {
                data.insert("invoice_number".to_string(), Value::from(invoice_number.clone()));
                data.insert("amount".to_string(), Value::from(amount.to_string()));
                data.insert(
                    "remaining_balance".to_string(),
                    Value::from(remaining_balance.to_string()),
                );
                (
                    "billing.ledger",
                    sentry_core::Level::Warning,
                    format!("Overpayment rejected on {invoice_number}"),
                )
            }

            Error::InvoiceFinalized { invoice_number, .. } => {
                data.insert("invoice_number".to_string(), Value::from(invoice_number.clone()));
                (
                    "billing.lifecycle",
                    sentry_core::Level::Warning,
                    format!("Revision of finalized invoice {invoice_number}"),
                )
            }

            Error::NotFound { entity, id, .. } => {
                data.insert("entity".to_string(), Value::from(entity.clone()));
                data.insert("id".to_string(), Value::from(id.clone()));
                (
                    "billing.store",
                    sentry_core::Level::Error,
                    format!("{entity} not found"),
                )
            }

            Error::Config { key, .. } => {
                data.insert("key".to_string(), Value::from(key.clone()));
                (
                    "billing.config",
                    sentry_core::Level::Error,
                    format!("Invalid setting {key}"),
                )
            }

            Error::Deserialization { source, .. } => (
                "billing.import",
                sentry_core::Level::Error,
                format!("Failed to decode invoice data: {source}"),
            ),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level,
            ..Default::default()
        }
    }
}

/// Extra Sentry context for `error`.
///
/// ```ignore
/// use sentry::configure_scope;
/// use brand_billing::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = book.apply_payment(invoice_id, amount, "ach", "TXN-1", today) {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert(
            "billing.span_trace".to_string(),
            Value::from(format!("{span_trace}")),
        );
    }

    if let Some(invoice_number) = error.invoice_number() {
        context.insert(
            "billing.invoice_number".to_string(),
            Value::from(invoice_number.to_string()),
        );
    }

    if let Error::Overpayment {
        amount,
        remaining_balance,
        ..
    } = error
    {
        context.insert("billing.amount".to_string(), Value::from(amount.to_string()));
        context.insert(
            "billing.remaining_balance".to_string(),
            Value::from(remaining_balance.to_string()),
        );
    }

    context
}

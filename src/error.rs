use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing_error::SpanTrace;

/// Errors returned by billing operations.
///
/// Every variant captures a [`SpanTrace`] where it is constructed, so an error raised
/// inside an instrumented `BillingBook` call carries the invoice it was working on.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Malformed quantities, negative prices or rates, empty line items, or an operation
    /// that the invoice's lifecycle stage does not allow.
    #[error("invalid input: {reason}")]
    #[diagnostic(
        code(brand_billing::invalid_input),
        help("Check line item quantities, prices, rates and payment amounts")
    )]
    InvalidInput { reason: String, span_trace: SpanTrace },

    /// A payment larger than the invoice's remaining balance. The ledger is left unchanged.
    #[error(
        "payment of {amount} exceeds the remaining balance of {remaining_balance} on invoice {invoice_number}"
    )]
    #[diagnostic(
        code(brand_billing::overpayment),
        help("Apply at most the remaining balance; overpayments are rejected, not clamped")
    )]
    Overpayment {
        invoice_number: String,
        amount: Decimal,
        remaining_balance: Decimal,
        span_trace: SpanTrace,
    },

    #[error("invoice {invoice_number} is finalized and can no longer be revised")]
    #[diagnostic(
        code(brand_billing::invoice_finalized),
        help("Supersede the invoice with a replacement draft instead")
    )]
    InvoiceFinalized {
        invoice_number: String,
        span_trace: SpanTrace,
    },

    #[error("object not found: {entity} {id}")]
    #[diagnostic(
        code(brand_billing::not_found),
        help("Verify that the {entity} exists in the invoice store")
    )]
    NotFound {
        entity: String,
        id: String,
        span_trace: SpanTrace,
    },

    #[error("invalid configuration value for {key}: {value:?}")]
    #[diagnostic(
        code(brand_billing::config),
        help("Fix or unset the {key} environment variable")
    )]
    Config {
        key: String,
        value: String,
        span_trace: SpanTrace,
    },

    #[error("error decoding invoice data: {source}")]
    #[diagnostic(
        code(brand_billing::deserialization_error),
        help("The invoice data is not in the expected format")
    )]
    Deserialization {
        source: serde_json::Error,
        span_trace: SpanTrace,
    },
}

impl Error {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn overpayment(
        invoice_number: impl Into<String>,
        amount: Decimal,
        remaining_balance: Decimal,
    ) -> Self {
        Self::Overpayment {
            invoice_number: invoice_number.into(),
            amount,
            remaining_balance,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn finalized(invoice_number: impl Into<String>) -> Self {
        Self::InvoiceFinalized {
            invoice_number: invoice_number.into(),
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            value: value.into(),
            span_trace: SpanTrace::capture(),
        }
    }

    /// The span trace captured when the error was created.
    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::InvalidInput { span_trace, .. }
            | Self::Overpayment { span_trace, .. }
            | Self::InvoiceFinalized { span_trace, .. }
            | Self::NotFound { span_trace, .. }
            | Self::Config { span_trace, .. }
            | Self::Deserialization { span_trace, .. } => Some(span_trace),
        }
    }

    /// The invoice number the error refers to, when there is one.
    #[must_use]
    pub fn invoice_number(&self) -> Option<&str> {
        match self {
            Self::Overpayment { invoice_number, .. }
            | Self::InvoiceFinalized { invoice_number, .. } => Some(invoice_number),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization {
            source: e,
            span_trace: SpanTrace::capture(),
        }
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;

//! # brand-billing
//!
//! Invoice pricing, payment ledger and payment-status lifecycle for a B2B brand
//! portal.
//!
//! An invoice is priced from its line items (subtotal, discount, tax on the
//! discounted amount, untaxed shipping), finalized, and then paid down through an
//! append-only ledger. Its status (`draft`, `pending`, `partial`, `paid`, `overdue`,
//! `closed`) is never stored; it is derived from the ledger and the due date each
//! time it is asked for.
//!
//! ```
//! use brand_billing::{BillingBook, InvoiceDraft, InvoiceStatus, LineItem, RetailerInfo};
//! use rust_decimal::Decimal;
//! use time::macros::date;
//!
//! # fn main() -> brand_billing::error::Result<()> {
//! let today = date!(2024 - 01 - 15);
//! let book = BillingBook::default();
//!
//! let draft = InvoiceDraft::new(RetailerInfo::new("Green Leaf Wellness"), "ORD-2024-001")
//!     .with_line_item(LineItem::new("SKU-VC-30", "Vitamin C Serum", Decimal::new(4500, 2), 10)?);
//! let invoice = book.create_invoice(draft, today)?;
//!
//! let invoice = book.apply_payment(invoice.invoice_id(), Decimal::new(200, 0), "ach", "TXN-1", today)?;
//! assert_eq!(invoice.status_of(today), InvoiceStatus::Partial);
//! assert_eq!(invoice.remaining_balance(), Decimal::new(250, 0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Sentry Integration
//!
//! Every [`Error`] captures a [`SpanTrace`] when it is created. With the `sentry`
//! feature enabled, errors convert into Sentry breadcrumbs and extra context
//! through the `sentry_integration` module.
//!
//! Span traces are only populated when the subscriber includes
//! `tracing_error::ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod book;
pub mod config;
pub mod entities;
pub mod error;
pub mod ledger;
pub mod money;
pub mod portfolio;
pub mod pricing;
pub mod status;
pub mod store;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use book::BillingBook;
pub use config::BillingConfig;
pub use entities::*;
pub use error::Error;
pub use portfolio::{
    DateRange, InvoiceFilter, PortfolioSummary, SortDirection, SortField, SortOrder,
};
pub use pricing::{BillingBreakdown, DiscountKind, DiscountSpec, PricingTerms};
pub use status::{DueDateBadge, InvoiceStatus};
pub use store::{InvoiceStore, MemoryStore};

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;

// Re-export the entity types for convenience
pub use entities::invoice::{Invoice, InvoiceDraft, Revision};
pub use entities::line_item::{LineItem, LineItems};
pub use entities::payment::{PaymentMethod, PaymentRecord};
pub use entities::retailer::RetailerInfo;

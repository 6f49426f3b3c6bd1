//! The invoice aggregate.
//!
//! An [`Invoice`] is an owned value. Every command ([`Invoice::recompute`],
//! [`Invoice::finalize`], [`Invoice::apply_payment`], [`Invoice::supersede`]) takes
//! `&self` and returns a new invoice, so a failed command never leaves a half-applied
//! change behind. Paid and remaining amounts and the status are derived on demand,
//! never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use uuid::Uuid;

use crate::{
    config::{BillingConfig, MAX_TERM_DAYS},
    entities::{
        line_item::{LineItem, LineItems},
        payment::{PaymentMethod, PaymentRecord},
        retailer::RetailerInfo,
    },
    error::{Error, Result},
    ledger,
    pricing::{BillingBreakdown, DiscountSpec, PricingTerms, compute_breakdown},
    status::{self, DueDateBadge, InvoiceStatus},
    utils::{
        date_format::{iso_date_format, iso_date_format_option},
        serde_helpers::blank_string_as_none,
    },
};

/// Input for opening or creating an invoice.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    /// Display number such as `INV-2024-001`; generated when not set.
    #[serde(default, deserialize_with = "blank_string_as_none", skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub retailer: RetailerInfo,
    pub order_id: String,
    #[serde(default, with = "iso_date_format_option", skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<Date>,
    #[serde(default, with = "iso_date_format_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discount: DiscountSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_string_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InvoiceDraft {
    #[must_use]
    pub fn new(retailer: RetailerInfo, order_id: impl Into<String>) -> Self {
        Self {
            retailer,
            order_id: order_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    #[must_use]
    pub fn with_discount(mut self, discount: DiscountSpec) -> Self {
        self.discount = discount;
        self
    }

    #[must_use]
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn with_shipping_fee(mut self, fee: Decimal) -> Self {
        self.shipping_fee = Some(fee);
        self
    }

    #[must_use]
    pub fn with_invoice_date(mut self, date: Date) -> Self {
        self.invoice_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, date: Date) -> Self {
        self.due_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn terms(&self, config: &BillingConfig) -> PricingTerms {
        PricingTerms {
            discount: self.discount,
            tax_rate: self.tax_rate.unwrap_or(config.default_tax_rate),
            shipping_fee: self.shipping_fee.unwrap_or(config.default_shipping_fee),
        }
    }
}

/// Changes to a draft invoice's line items or pricing terms.
///
/// Changes are applied in field order: `line_items` replaces the whole list, then
/// `upserts` and `quantities` edit it, then the terms are overridden.
#[derive(Default, Debug, Clone)]
pub struct Revision {
    pub line_items: Option<Vec<LineItem>>,
    pub upserts: Vec<LineItem>,
    pub quantities: Vec<(String, u32)>,
    pub discount: Option<DiscountSpec>,
    pub tax_rate: Option<Decimal>,
    pub shipping_fee: Option<Decimal>,
}

impl Revision {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn replace_line_items(mut self, items: Vec<LineItem>) -> Self {
        self.line_items = Some(items);
        self
    }

    #[must_use]
    pub fn upsert_line_item(mut self, item: LineItem) -> Self {
        self.upserts.push(item);
        self
    }

    /// Set the quantity of an existing line; zero removes it.
    #[must_use]
    pub fn set_quantity(mut self, product_id: impl Into<String>, quantity: u32) -> Self {
        self.quantities.push((product_id.into(), quantity));
        self
    }

    #[must_use]
    pub fn discount(mut self, discount: DiscountSpec) -> Self {
        self.discount = Some(discount);
        self
    }

    #[must_use]
    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn shipping_fee(mut self, fee: Decimal) -> Self {
        self.shipping_fee = Some(fee);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub(crate) invoice_id: Uuid,
    pub(crate) invoice_number: String,
    pub(crate) retailer: RetailerInfo,
    pub(crate) order_id: String,
    #[serde(with = "iso_date_format")]
    pub(crate) invoice_date: Date,
    #[serde(with = "iso_date_format")]
    pub(crate) due_date: Date,
    pub(crate) line_items: LineItems,
    pub(crate) terms: PricingTerms,
    pub(crate) billing: BillingBreakdown,
    pub(crate) ledger: Vec<PaymentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notes: Option<String>,
    #[serde(with = "iso_date_format_option", skip_serializing_if = "Option::is_none")]
    pub(crate) finalized_on: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) superseded_by: Option<Uuid>,
}

impl Invoice {
    /// Open a draft invoice. Billing is computed immediately when the draft has line
    /// items; a draft without line items has an all-zero breakdown until one is added.
    pub fn open(draft: InvoiceDraft, config: &BillingConfig, today: Date) -> Result<Self> {
        if draft.retailer.name.trim().is_empty() {
            return Err(Error::invalid_input("retailer name must not be empty"));
        }

        let invoice_date = draft.invoice_date.unwrap_or(today);
        let due_date = match draft.due_date {
            Some(due_date) => due_date,
            None => {
                let days = config.payment_terms_days;
                (0..=MAX_TERM_DAYS)
                    .contains(&days)
                    .then(|| invoice_date.checked_add(Duration::days(days)))
                    .flatten()
                    .ok_or_else(|| {
                        Error::invalid_input(format!(
                            "payment terms of {days} days are out of range"
                        ))
                    })?
            }
        };
        if due_date < invoice_date {
            return Err(Error::invalid_input(format!(
                "due date {due_date} is before invoice date {invoice_date}"
            )));
        }

        let terms = draft.terms(config);
        let mut line_items = LineItems::new();
        for item in draft.line_items {
            line_items.add(item)?;
        }
        let billing = price(&line_items, terms)?;

        let invoice_id = Uuid::new_v4();
        let invoice_number = draft
            .invoice_number
            .unwrap_or_else(|| generate_invoice_number(invoice_id, invoice_date));

        Ok(Self {
            invoice_id,
            invoice_number,
            retailer: draft.retailer,
            order_id: draft.order_id,
            invoice_date,
            due_date,
            line_items,
            terms,
            billing,
            ledger: Vec::new(),
            notes: draft.notes,
            finalized_on: None,
            superseded_by: None,
        })
    }

    /// Open and immediately finalize an invoice; the result is `pending` with an empty
    /// ledger.
    pub fn create(draft: InvoiceDraft, config: &BillingConfig, today: Date) -> Result<Self> {
        Self::open(draft, config, today)?.finalize(today)
    }

    /// Apply `revision` and recompute billing from scratch.
    ///
    /// Fails with [`Error::InvoiceFinalized`] once the invoice has been finalized or
    /// superseded.
    pub fn recompute(&self, revision: Revision) -> Result<Self> {
        if self.is_finalized() || self.is_closed() {
            return Err(Error::finalized(&self.invoice_number));
        }

        let mut line_items = match revision.line_items {
            Some(items) => {
                let mut replaced = LineItems::new();
                for item in items {
                    replaced.add(item)?;
                }
                replaced
            }
            None => self.line_items.clone(),
        };
        for item in revision.upserts {
            line_items.upsert(item)?;
        }
        for (product_id, quantity) in &revision.quantities {
            line_items.set_quantity(product_id, *quantity)?;
        }

        let terms = PricingTerms {
            discount: revision.discount.unwrap_or(self.terms.discount),
            tax_rate: revision.tax_rate.unwrap_or(self.terms.tax_rate),
            shipping_fee: revision.shipping_fee.unwrap_or(self.terms.shipping_fee),
        };
        let billing = price(&line_items, terms)?;

        Ok(Self {
            line_items,
            terms,
            billing,
            ..self.clone()
        })
    }

    /// Submit the invoice. After this, line items and pricing terms are immutable and
    /// only payments may be applied.
    pub fn finalize(&self, on: Date) -> Result<Self> {
        if self.is_finalized() {
            return Err(Error::finalized(&self.invoice_number));
        }
        if self.is_closed() {
            return Err(Error::invalid_input(format!(
                "invoice {} has been superseded",
                self.invoice_number
            )));
        }

        let billing = compute_breakdown(self.line_items.as_slice(), self.terms)?;
        info!(
            invoice_number = %self.invoice_number,
            total = %billing.total_amount,
            "invoice finalized"
        );
        Ok(Self {
            billing,
            finalized_on: Some(on),
            ..self.clone()
        })
    }

    /// Record a payment. See [`ledger::apply_payment`].
    pub fn apply_payment(
        &self,
        amount: Decimal,
        method: impl Into<PaymentMethod>,
        transaction_id: impl Into<String>,
        date: Date,
    ) -> Result<Self> {
        ledger::apply_payment(self, PaymentRecord::new(date, amount, method, transaction_id))
    }

    /// Close this invoice in favour of `replacement`. Only invoices without payments
    /// can be superseded.
    pub fn supersede(&self, replacement: Uuid) -> Result<Self> {
        if self.is_closed() {
            return Err(Error::invalid_input(format!(
                "invoice {} has already been superseded",
                self.invoice_number
            )));
        }
        if !self.ledger.is_empty() {
            return Err(Error::invalid_input(format!(
                "invoice {} has recorded payments and cannot be superseded",
                self.invoice_number
            )));
        }
        Ok(Self {
            superseded_by: Some(replacement),
            ..self.clone()
        })
    }

    /// Status as of `today`, always derived from the ledger and due date.
    #[must_use]
    pub fn status_of(&self, today: Date) -> InvoiceStatus {
        status::resolve(self, today)
    }

    /// Due-date decoration as of `today`; `None` for drafts and closed invoices.
    #[must_use]
    pub fn due_date_badge(&self, today: Date, due_soon_days: i64) -> Option<DueDateBadge> {
        status::due_date_badge(self, today, due_soon_days)
    }

    #[must_use]
    pub fn paid_amount(&self) -> Decimal {
        ledger::paid_amount(self)
    }

    #[must_use]
    pub fn remaining_balance(&self) -> Decimal {
        ledger::remaining_balance(self)
    }

    #[must_use]
    pub fn invoice_id(&self) -> Uuid {
        self.invoice_id
    }

    #[must_use]
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    #[must_use]
    pub fn retailer(&self) -> &RetailerInfo {
        &self.retailer
    }

    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    #[must_use]
    pub fn invoice_date(&self) -> Date {
        self.invoice_date
    }

    #[must_use]
    pub fn due_date(&self) -> Date {
        self.due_date
    }

    #[must_use]
    pub fn line_items(&self) -> &LineItems {
        &self.line_items
    }

    #[must_use]
    pub fn terms(&self) -> PricingTerms {
        self.terms
    }

    #[must_use]
    pub fn billing(&self) -> &BillingBreakdown {
        &self.billing
    }

    #[must_use]
    pub fn ledger(&self) -> &[PaymentRecord] {
        &self.ledger
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn finalized_on(&self) -> Option<Date> {
        self.finalized_on
    }

    #[must_use]
    pub fn superseded_by(&self) -> Option<Uuid> {
        self.superseded_by
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized_on.is_some()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.superseded_by.is_some()
    }
}

impl AsRef<Invoice> for Invoice {
    fn as_ref(&self) -> &Invoice {
        self
    }
}

fn price(line_items: &LineItems, terms: PricingTerms) -> Result<BillingBreakdown> {
    if line_items.is_empty() {
        terms.validate()?;
        return Ok(BillingBreakdown::empty(terms));
    }
    compute_breakdown(line_items.as_slice(), terms)
}

fn generate_invoice_number(invoice_id: Uuid, invoice_date: Date) -> String {
    let simple = invoice_id.simple().to_string().to_ascii_uppercase();
    format!("INV-{}-{}", invoice_date.year(), &simple[..8])
}

/// Serialized form of an [`Invoice`]. Deserializing goes through this snapshot so that
/// billing is recomputed from the line items and terms, and the ledger is checked
/// against the total, rather than trusting stored figures.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceSnapshot {
    #[serde(default)]
    invoice_id: Option<Uuid>,
    invoice_number: String,
    retailer: RetailerInfo,
    #[serde(default)]
    order_id: String,
    #[serde(with = "iso_date_format")]
    invoice_date: Date,
    #[serde(with = "iso_date_format")]
    due_date: Date,
    #[serde(default)]
    line_items: Vec<LineItem>,
    #[serde(default)]
    terms: Option<PricingTerms>,
    #[serde(default)]
    billing: Option<BillingBreakdown>,
    #[serde(default)]
    ledger: Vec<PaymentRecord>,
    #[serde(default, deserialize_with = "blank_string_as_none")]
    notes: Option<String>,
    #[serde(default, with = "iso_date_format_option")]
    finalized_on: Option<Date>,
    #[serde(default)]
    superseded_by: Option<Uuid>,
}

impl TryFrom<InvoiceSnapshot> for Invoice {
    type Error = Error;

    fn try_from(snapshot: InvoiceSnapshot) -> Result<Self> {
        // Portal exports carry the inputs inside `billing`; newer ones store `terms`
        let terms = snapshot
            .terms
            .or_else(|| snapshot.billing.map(|billing| billing.terms()))
            .unwrap_or_default();

        let mut line_items = LineItems::new();
        for item in snapshot.line_items {
            line_items.add(item)?;
        }
        let billing = if snapshot.finalized_on.is_some() {
            compute_breakdown(line_items.as_slice(), terms)?
        } else {
            price(&line_items, terms)?
        };

        let invoice = Self {
            invoice_id: snapshot.invoice_id.unwrap_or_else(Uuid::new_v4),
            invoice_number: snapshot.invoice_number,
            retailer: snapshot.retailer,
            order_id: snapshot.order_id,
            invoice_date: snapshot.invoice_date,
            due_date: snapshot.due_date,
            line_items,
            terms,
            billing,
            ledger: Vec::new(),
            notes: snapshot.notes,
            finalized_on: snapshot.finalized_on,
            superseded_by: snapshot.superseded_by,
        };

        // Replay the ledger so every record passes the same guards as a live payment
        snapshot
            .ledger
            .into_iter()
            .try_fold(invoice, |invoice, record| ledger::apply_payment(&invoice, record))
    }
}

impl<'de> Deserialize<'de> for Invoice {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let snapshot = InvoiceSnapshot::deserialize(deserializer)?;
        Self::try_from(snapshot).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 01 - 15);

    fn draft() -> InvoiceDraft {
        InvoiceDraft::new(RetailerInfo::new("Green Leaf Wellness"), "ORD-2024-001")
            .with_invoice_number("INV-2024-001")
            .with_line_item(LineItem::new("SKU-VC-30", "Vitamin C Serum", dec!(45.00), 10).unwrap())
            .with_line_item(LineItem::new("SKU-OM3", "Omega-3 Softgels", dec!(35.00), 15).unwrap())
            .with_discount(DiscountSpec::fixed(dec!(50.00)))
            .with_tax_rate(dec!(8.25))
            .with_shipping_fee(dec!(25.00))
    }

    #[test]
    fn create_prices_and_finalizes() {
        let invoice = Invoice::create(draft(), &BillingConfig::default(), TODAY).unwrap();
        assert_eq!(invoice.billing().total_amount, dec!(1026.31));
        assert_eq!(invoice.status_of(TODAY), InvoiceStatus::Pending);
        assert_eq!(invoice.due_date(), date!(2024 - 02 - 14));
        assert!(invoice.ledger().is_empty());
        assert_eq!(invoice.remaining_balance(), dec!(1026.31));
    }

    #[test]
    fn open_applies_config_defaults() {
        let config = BillingConfig::default()
            .with_default_tax_rate(dec!(10))
            .with_default_shipping_fee(dec!(5))
            .with_payment_terms_days(15);
        let draft = InvoiceDraft::new(RetailerInfo::new("Pure Glow"), "ORD-9")
            .with_line_item(LineItem::new("SKU-1", "Collagen", dec!(20), 1).unwrap());

        let invoice = Invoice::open(draft, &config, TODAY).unwrap();
        assert_eq!(invoice.billing().tax_amount, dec!(2.00));
        assert_eq!(invoice.billing().total_amount, dec!(27.00));
        assert_eq!(invoice.due_date(), date!(2024 - 01 - 30));
        assert_eq!(invoice.status_of(TODAY), InvoiceStatus::Draft);
        assert!(invoice.invoice_number().starts_with("INV-2024-"));
    }

    #[test]
    fn open_rejects_due_date_before_invoice_date() {
        let draft = draft().with_due_date(date!(2024 - 01 - 01));
        assert!(matches!(
            Invoice::open(draft, &BillingConfig::default(), TODAY),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn open_rejects_payment_terms_beyond_the_limit() {
        for days in [MAX_TERM_DAYS + 1, i64::MAX / 2, -1] {
            let config = BillingConfig::default().with_payment_terms_days(days);
            assert!(matches!(
                Invoice::create(draft(), &config, TODAY),
                Err(Error::InvalidInput { .. })
            ));
        }

        let config = BillingConfig::default().with_payment_terms_days(MAX_TERM_DAYS);
        let invoice = Invoice::create(draft(), &config, TODAY).unwrap();
        assert_eq!(invoice.due_date(), TODAY + Duration::days(MAX_TERM_DAYS));
    }

    #[test]
    fn open_rejects_a_product_listed_twice() {
        let repeated = InvoiceDraft::new(RetailerInfo::new("Green Leaf Wellness"), "ORD-DUP")
            .with_line_item(LineItem::new("SKU-1", "Vitamin C Serum", dec!(45.00), 10).unwrap())
            .with_line_item(LineItem::new("SKU-1", "Vitamin C Serum", dec!(45.00), 5).unwrap());
        assert!(matches!(
            Invoice::open(repeated, &BillingConfig::default(), TODAY),
            Err(Error::InvalidInput { .. })
        ));

        // revisions still replace an existing line explicitly
        let invoice = Invoice::open(draft(), &BillingConfig::default(), TODAY).unwrap();
        let revised = invoice
            .recompute(Revision::new().upsert_line_item(
                LineItem::new("SKU-VC-30", "Vitamin C Serum", dec!(45.00), 15).unwrap(),
            ))
            .unwrap();
        assert_eq!(revised.line_items().len(), 2);
        assert_eq!(revised.billing().subtotal, dec!(1200.00));
    }

    #[test]
    fn recompute_reprices_drafts() {
        let invoice = Invoice::open(draft(), &BillingConfig::default(), TODAY).unwrap();
        let revised = invoice
            .recompute(
                Revision::new()
                    .set_quantity("SKU-OM3", 0)
                    .discount(DiscountSpec::percentage(dec!(10)))
                    .shipping_fee(dec!(0)),
            )
            .unwrap();

        assert_eq!(revised.line_items().len(), 1);
        assert_eq!(revised.billing().subtotal, dec!(450.00));
        assert_eq!(revised.billing().discount_amount, dec!(45.00));
        // 405.00 * 8.25% = 33.4125
        assert_eq!(revised.billing().tax_amount, dec!(33.41));
        assert_eq!(revised.billing().total_amount, dec!(438.41));
        // the original value is untouched
        assert_eq!(invoice.billing().total_amount, dec!(1026.31));
    }

    #[test]
    fn emptied_draft_cannot_be_finalized() {
        let invoice = Invoice::open(draft(), &BillingConfig::default(), TODAY).unwrap();
        let emptied = invoice
            .recompute(Revision::new().replace_line_items(Vec::new()))
            .unwrap();
        assert_eq!(emptied.billing().total_amount, Decimal::ZERO);
        assert!(matches!(
            emptied.finalize(TODAY),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn finalized_invoices_reject_revisions() {
        let invoice = Invoice::create(draft(), &BillingConfig::default(), TODAY).unwrap();
        let err = invoice
            .recompute(Revision::new().tax_rate(dec!(0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvoiceFinalized { .. }));
        assert!(matches!(
            invoice.finalize(TODAY),
            Err(Error::InvoiceFinalized { .. })
        ));
    }

    #[test]
    fn supersede_requires_an_empty_ledger() {
        let invoice = Invoice::create(draft(), &BillingConfig::default(), TODAY).unwrap();
        let replacement = Uuid::new_v4();

        let closed = invoice.supersede(replacement).unwrap();
        assert_eq!(closed.status_of(TODAY), InvoiceStatus::Closed);
        assert!(closed.supersede(Uuid::new_v4()).is_err());

        let paid_in_part = invoice
            .apply_payment(dec!(100), "ach", "TXN-1", TODAY)
            .unwrap();
        assert!(matches!(
            paid_in_part.supersede(replacement),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn snapshot_recomputes_billing_and_replays_ledger() {
        let json = serde_json::json!({
            "invoiceNumber": "INV-2024-002",
            "retailer": { "name": "Vital Roots Market", "email": "" },
            "orderId": "ORD-2024-002",
            "invoiceDate": "2024-01-10",
            "dueDate": "2024-02-09",
            "lineItems": [
                { "productId": "SKU-A", "name": "Ashwagandha", "unitPrice": 25.0, "quantity": 20 },
                { "productId": "SKU-B", "name": "Biotin", "unitPrice": 18.75, "quantity": 20 }
            ],
            "billing": {
                "subtotal": 1.0,
                "discountAmount": 0,
                "discount": { "type": "fixed", "value": 0 },
                "taxRate": 0,
                "taxAmount": 0,
                "shippingFee": 0,
                "totalAmount": 1.0
            },
            "ledger": [
                { "date": "2024-01-20", "amount": 400.00, "method": "ach", "transactionId": "TXN-1" }
            ],
            "finalizedOn": "2024-01-10",
            "status": "paid"
        });

        let invoice: Invoice = serde_json::from_value(json).unwrap();
        assert_eq!(invoice.billing().total_amount, dec!(875.00));
        assert_eq!(invoice.paid_amount(), dec!(400.00));
        assert_eq!(invoice.retailer().email, None);
        assert_eq!(invoice.status_of(date!(2024 - 01 - 25)), InvoiceStatus::Partial);
    }

    #[test]
    fn snapshot_with_overpaid_ledger_is_rejected() {
        let json = serde_json::json!({
            "invoiceNumber": "INV-X",
            "retailer": { "name": "Overpaid Co" },
            "invoiceDate": "2024-01-10",
            "dueDate": "2024-02-09",
            "lineItems": [
                { "productId": "SKU-A", "name": "A", "unitPrice": 10, "quantity": 1 }
            ],
            "ledger": [
                { "date": "2024-01-20", "amount": 11, "method": "ach", "transactionId": "TXN-1" }
            ],
            "finalizedOn": "2024-01-10"
        });
        let err = serde_json::from_value::<Invoice>(json).unwrap_err();
        assert!(err.to_string().contains("exceeds the remaining balance"));
    }
}

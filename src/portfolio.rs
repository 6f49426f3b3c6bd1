//! Summary statistics, filtering and ordering over a collection of invoices.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{entities::invoice::Invoice, status::InvoiceStatus};

/// Totals across a set of invoices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    /// Sum of remaining balances.
    pub pending_amount: Decimal,
    pub overdue_count: usize,
    pub invoice_count: usize,
}

/// Summarize the issued invoices in `invoices` as of `today`.
///
/// Drafts and superseded invoices are skipped: drafts have not been billed yet, and a
/// superseded invoice is counted through its replacement.
#[must_use]
pub fn summarize<'a, I>(invoices: I, today: Date) -> PortfolioSummary
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let summary = invoices
        .into_iter()
        .filter(|invoice| invoice.is_finalized() && !invoice.is_closed())
        .fold(PortfolioSummary::default(), |mut summary, invoice| {
            summary.total_amount += invoice.billing().total_amount;
            summary.paid_amount += invoice.paid_amount();
            summary.pending_amount += invoice.remaining_balance();
            if invoice.status_of(today) == InvoiceStatus::Overdue {
                summary.overdue_count += 1;
            }
            summary.invoice_count += 1;
            summary
        });
    debug!(?summary, "summarized portfolio");
    summary
}

/// Window of invoice dates, counted back from today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 90 days.
    Quarter,
}

impl DateRange {
    fn max_age_days(self) -> Option<i64> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(0),
            DateRange::Week => Some(7),
            DateRange::Month => Some(30),
            DateRange::Quarter => Some(90),
        }
    }

    /// Whether an invoice dated `invoice_date` falls within the range. Invoices dated
    /// after `today` only match [`DateRange::All`].
    #[must_use]
    pub fn contains(self, invoice_date: Date, today: Date) -> bool {
        let Some(max_age) = self.max_age_days() else {
            return true;
        };
        let age = (today - invoice_date).whole_days();
        (0..=max_age).contains(&age)
    }
}

/// Criteria for [`filter`]. Unset criteria match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Case-insensitive substring of the invoice number, invoice id, retailer name or
    /// order id.
    pub text: Option<String>,
    /// Resolved status to match; `Unpaid` also matches `Pending`.
    pub status: Option<InvoiceStatus>,
    pub date_range: DateRange,
}

impl InvoiceFilter {
    #[must_use]
    pub fn builder() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    #[must_use]
    pub fn matches(&self, invoice: &Invoice, today: Date) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim)
            && !text.is_empty()
        {
            let needle = text.to_lowercase();
            let haystacks = [
                invoice.invoice_number().to_lowercase(),
                invoice.invoice_id().to_string(),
                invoice.retailer().name.to_lowercase(),
                invoice.order_id().to_lowercase(),
            ];
            if !haystacks.iter().any(|haystack| haystack.contains(&needle)) {
                return false;
            }
        }
        if let Some(status) = self.status
            && !status.matches(invoice.status_of(today))
        {
            return false;
        }
        self.date_range.contains(invoice.invoice_date(), today)
    }
}

/// The invoices in `invoices` matching `filter`, in their original order.
#[must_use]
pub fn filter<'a, I>(invoices: I, filter: &InvoiceFilter, today: Date) -> Vec<&'a Invoice>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    invoices
        .into_iter()
        .filter(|invoice| filter.matches(invoice, today))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    InvoiceNumber,
    Retailer,
    OrderId,
    #[default]
    InvoiceDate,
    DueDate,
    TotalAmount,
    PaidAmount,
    RemainingBalance,
    Status,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    #[must_use]
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    #[must_use]
    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    #[must_use]
    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    fn compare(self, a: &Invoice, b: &Invoice, today: Date) -> Ordering {
        let ordering = match self.field {
            SortField::InvoiceNumber => a.invoice_number().cmp(b.invoice_number()),
            SortField::Retailer => a.retailer().name.cmp(&b.retailer().name),
            SortField::OrderId => a.order_id().cmp(b.order_id()),
            SortField::InvoiceDate => a.invoice_date().cmp(&b.invoice_date()),
            SortField::DueDate => a.due_date().cmp(&b.due_date()),
            SortField::TotalAmount => a.billing().total_amount.cmp(&b.billing().total_amount),
            SortField::PaidAmount => a.paid_amount().cmp(&b.paid_amount()),
            SortField::RemainingBalance => a.remaining_balance().cmp(&b.remaining_balance()),
            SortField::Status => a.status_of(today).as_str().cmp(b.status_of(today).as_str()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Stable sort of `invoices` by `order`; ties keep their relative order in either
/// direction.
pub fn sort<T>(invoices: &mut [T], order: SortOrder, today: Date)
where
    T: AsRef<Invoice>,
{
    invoices.sort_by(|a, b| order.compare(a.as_ref(), b.as_ref(), today));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BillingConfig,
        entities::{invoice::InvoiceDraft, line_item::LineItem, retailer::RetailerInfo},
    };
    use rust_decimal_macros::dec;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 03 - 01);

    fn invoice(number: &str, retailer: &str, total: Decimal, dated: Date) -> Invoice {
        let draft = InvoiceDraft::new(RetailerInfo::new(retailer), format!("ORD-{number}"))
            .with_invoice_number(number)
            .with_invoice_date(dated)
            .with_line_item(LineItem::new("SKU-1", "Sea moss gel", total, 1).unwrap());
        Invoice::create(draft, &BillingConfig::default(), dated).unwrap()
    }

    fn portfolio() -> Vec<Invoice> {
        let paid = invoice("INV-001", "Green Leaf Wellness", dec!(1250.00), date!(2024 - 02 - 20))
            .apply_payment(dec!(1250.00), "wire", "TXN-1", date!(2024 - 02 - 21))
            .unwrap();
        // due 2024-02-14, so overdue on TODAY
        let overdue = invoice("INV-002", "Vital Roots Market", dec!(875.50), date!(2024 - 01 - 15))
            .apply_payment(dec!(400.00), "ach", "TXN-2", date!(2024 - 01 - 20))
            .unwrap();
        let pending = invoice("INV-003", "bloom botanicals", dec!(300.00), TODAY);
        vec![paid, overdue, pending]
    }

    #[test]
    fn summarizes_issued_invoices() {
        let mut invoices = portfolio();
        let draft = Invoice::open(
            InvoiceDraft::new(RetailerInfo::new("Draft Co"), "ORD-D")
                .with_line_item(LineItem::new("SKU-1", "Kelp", dec!(99), 1).unwrap()),
            &BillingConfig::default(),
            TODAY,
        )
        .unwrap();
        invoices.push(draft);

        let summary = summarize(&invoices, TODAY);
        assert_eq!(summary.total_amount, dec!(2425.50));
        assert_eq!(summary.paid_amount, dec!(1650.00));
        assert_eq!(summary.pending_amount, dec!(775.50));
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.invoice_count, 3);
        assert_eq!(
            summary.paid_amount + summary.pending_amount,
            summary.total_amount
        );
    }

    #[test]
    fn empty_portfolio_summarizes_to_zero() {
        assert_eq!(summarize(std::iter::empty(), TODAY), PortfolioSummary::default());
    }

    #[test]
    fn filters_by_text_status_and_date() {
        let invoices = portfolio();

        let by_text = filter(&invoices, &InvoiceFilter::builder().with_text("BLOOM"), TODAY);
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].invoice_number(), "INV-003");

        let by_order = filter(&invoices, &InvoiceFilter::builder().with_text("ord-inv-002"), TODAY);
        assert_eq!(by_order.len(), 1);

        let unpaid = filter(
            &invoices,
            &InvoiceFilter::builder().with_status(InvoiceStatus::Unpaid),
            TODAY,
        );
        assert_eq!(unpaid.len(), 1);
        assert_eq!(unpaid[0].invoice_number(), "INV-003");

        let overdue = filter(
            &invoices,
            &InvoiceFilter::builder().with_status(InvoiceStatus::Overdue),
            TODAY,
        );
        assert_eq!(overdue[0].invoice_number(), "INV-002");

        let this_week = filter(
            &invoices,
            &InvoiceFilter::builder().with_date_range(DateRange::Week),
            TODAY,
        );
        let numbers: Vec<&str> = this_week.iter().map(|i| i.invoice_number()).collect();
        assert_eq!(numbers, ["INV-003"]);

        let this_month = filter(
            &invoices,
            &InvoiceFilter::builder().with_date_range(DateRange::Month),
            TODAY,
        );
        assert_eq!(this_month.len(), 2);

        let all = filter(&invoices, &InvoiceFilter::default(), TODAY);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn date_ranges_exclude_future_invoices() {
        let tomorrow = date!(2024 - 03 - 02);
        assert!(DateRange::All.contains(tomorrow, TODAY));
        assert!(!DateRange::Quarter.contains(tomorrow, TODAY));
        assert!(DateRange::Today.contains(TODAY, TODAY));
        assert!(DateRange::Week.contains(date!(2024 - 02 - 23), TODAY));
        assert!(!DateRange::Week.contains(date!(2024 - 02 - 22), TODAY));
    }

    #[test]
    fn sorts_numerically_and_stably() {
        let mut invoices = portfolio();
        sort(&mut invoices, SortOrder::desc(SortField::TotalAmount), TODAY);
        let numbers: Vec<&str> = invoices.iter().map(Invoice::invoice_number).collect();
        assert_eq!(numbers, ["INV-001", "INV-002", "INV-003"]);

        sort(&mut invoices, SortOrder::asc(SortField::RemainingBalance), TODAY);
        let numbers: Vec<&str> = invoices.iter().map(Invoice::invoice_number).collect();
        assert_eq!(numbers, ["INV-001", "INV-003", "INV-002"]);

        // borrowed invoices sort the same way
        let mut refs: Vec<&Invoice> = invoices.iter().collect();
        refs.swap(0, 1);
        sort(&mut refs, SortOrder::asc(SortField::OrderId), TODAY);
        let numbers: Vec<&str> = refs.iter().map(|i| i.invoice_number()).collect();
        assert_eq!(numbers, ["INV-001", "INV-002", "INV-003"]);
    }

    #[test]
    fn sort_ties_keep_order_in_both_directions() {
        let a = invoice("INV-A", "Same Retailer", dec!(10), TODAY);
        let b = invoice("INV-B", "Same Retailer", dec!(10), TODAY);
        let mut invoices = vec![b, a];
        sort(&mut invoices, SortOrder::desc(SortField::Retailer), TODAY);
        assert_eq!(invoices[0].invoice_number(), "INV-B");
        sort(&mut invoices, SortOrder::asc(SortField::TotalAmount), TODAY);
        assert_eq!(invoices[0].invoice_number(), "INV-B");
    }
}

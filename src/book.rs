use rust_decimal::Decimal;
use time::Date;
use uuid::Uuid;

use crate::{
    config::BillingConfig,
    entities::{
        invoice::{Invoice, InvoiceDraft, Revision},
        payment::PaymentMethod,
    },
    error::Result,
    portfolio::{self, InvoiceFilter, PortfolioSummary, SortOrder},
    status::{DueDateBadge, InvoiceStatus},
    store::{InvoiceStore, MemoryStore},
};

/// The billing API of the brand portal: every invoice operation goes through here.
///
/// A `BillingBook` owns an [`InvoiceStore`] and the [`BillingConfig`] new invoices are
/// created under. Operations that change an invoice run as a single
/// read-modify-write against the store, so two payments racing on one invoice
/// cannot both pass the overpayment check.
///
/// Nothing reads the system clock: operations that depend on the date take `today`.
#[derive(Debug)]
pub struct BillingBook<S: InvoiceStore = MemoryStore> {
    store: S,
    config: BillingConfig,
}

impl BillingBook<MemoryStore> {
    #[must_use]
    pub fn new(config: BillingConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl Default for BillingBook<MemoryStore> {
    fn default() -> Self {
        Self::new(BillingConfig::default())
    }
}

impl<S: InvoiceStore> BillingBook<S> {
    #[must_use]
    pub fn with_store(store: S, config: BillingConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store a new invoice in `draft`, open for revision.
    #[instrument(skip(self, draft), fields(order_id = %draft.order_id))]
    pub fn open_draft(&self, draft: InvoiceDraft, today: Date) -> Result<Invoice> {
        let invoice = Invoice::open(draft, &self.config, today)?;
        let invoice = self.store.insert(invoice)?;
        info!(
            invoice_id = %invoice.invoice_id(),
            invoice_number = %invoice.invoice_number(),
            "opened draft invoice"
        );
        Ok(invoice)
    }

    /// Price, finalize and store a new invoice. The result is `pending` with an empty
    /// ledger.
    #[instrument(skip(self, draft), fields(order_id = %draft.order_id))]
    pub fn create_invoice(&self, draft: InvoiceDraft, today: Date) -> Result<Invoice> {
        let invoice = Invoice::create(draft, &self.config, today)?;
        let invoice = self.store.insert(invoice)?;
        info!(
            invoice_id = %invoice.invoice_id(),
            invoice_number = %invoice.invoice_number(),
            total = %invoice.billing().total_amount,
            "created invoice"
        );
        Ok(invoice)
    }

    /// Apply `revision` to a draft and reprice it.
    #[instrument(skip(self, revision))]
    pub fn revise(&self, invoice_id: Uuid, revision: Revision) -> Result<Invoice> {
        self.store
            .update(invoice_id, |invoice| invoice.recompute(revision))
    }

    #[instrument(skip(self))]
    pub fn finalize(&self, invoice_id: Uuid, today: Date) -> Result<Invoice> {
        self.transition(invoice_id, today, |invoice| invoice.finalize(today))
    }

    /// Record a payment against an invoice.
    ///
    /// # Errors
    /// - [`Error::NotFound`](crate::Error::NotFound) if no invoice has this id.
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) for a non-positive
    ///   amount, a blank or repeated transaction id, or an invoice that is a draft or
    ///   superseded.
    /// - [`Error::Overpayment`](crate::Error::Overpayment) if `amount` exceeds the
    ///   remaining balance.
    #[instrument(skip(self, method))]
    pub fn apply_payment(
        &self,
        invoice_id: Uuid,
        amount: Decimal,
        method: impl Into<PaymentMethod>,
        transaction_id: &str,
        date: Date,
    ) -> Result<Invoice> {
        let method = method.into();
        self.transition(invoice_id, date, |invoice| {
            invoice.apply_payment(amount, method, transaction_id, date)
        })
    }

    /// Close an unpaid invoice and open `replacement` as a new draft in its place.
    ///
    /// Returns the closed invoice and the replacement. The replacement is stored first,
    /// which claims its invoice number; if the original then cannot be closed the
    /// replacement is removed again, so either both changes land or neither does.
    #[instrument(skip(self, replacement))]
    pub fn supersede(
        &self,
        invoice_id: Uuid,
        replacement: InvoiceDraft,
        today: Date,
    ) -> Result<(Invoice, Invoice)> {
        let replacement = self
            .store
            .insert(Invoice::open(replacement, &self.config, today)?)?;

        let closed = match self.transition(invoice_id, today, |invoice| {
            invoice.supersede(replacement.invoice_id())
        }) {
            Ok(closed) => closed,
            Err(err) => {
                self.discard(replacement.invoice_id());
                return Err(err);
            }
        };
        info!(
            closed = %closed.invoice_number(),
            replacement = %replacement.invoice_number(),
            "superseded invoice"
        );
        Ok((closed, replacement))
    }

    pub fn get(&self, invoice_id: Uuid) -> Result<Invoice> {
        self.store.get(invoice_id)
    }

    pub fn find_by_number(&self, invoice_number: &str) -> Result<Invoice> {
        self.store.find_by_number(invoice_number)
    }

    #[instrument(skip(self))]
    pub fn get_status(&self, invoice_id: Uuid, today: Date) -> Result<InvoiceStatus> {
        Ok(self.store.get(invoice_id)?.status_of(today))
    }

    /// Due-date badge under the configured due-soon window.
    pub fn due_date_badge(&self, invoice_id: Uuid, today: Date) -> Result<Option<DueDateBadge>> {
        Ok(self
            .store
            .get(invoice_id)?
            .due_date_badge(today, self.config.due_soon_days))
    }

    /// Invoices matching `filter`, ordered by `sort`.
    #[instrument(skip(self))]
    pub fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        sort: SortOrder,
        today: Date,
    ) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .store
            .all()
            .into_iter()
            .filter(|invoice| filter.matches(invoice, today))
            .collect();
        portfolio::sort(&mut invoices, sort, today);
        debug!(count = invoices.len(), "listed invoices");
        invoices
    }

    #[instrument(skip(self))]
    pub fn portfolio_summary(&self, today: Date) -> PortfolioSummary {
        portfolio::summarize(&self.store.all(), today)
    }

    /// Load invoices from a JSON array, such as the portal's sample data.
    ///
    /// Every invoice is decoded and validated before any is stored. Storing is
    /// all-or-nothing: if any record's id or invoice number is already taken, the
    /// records stored so far are removed again and nothing is imported.
    #[instrument(skip(self, json))]
    pub fn import_json(&self, json: &str) -> Result<Vec<Invoice>> {
        let invoices: Vec<Invoice> = serde_json::from_str(json)?;

        let mut imported = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            match self.store.insert(invoice) {
                Ok(stored) => imported.push(stored),
                Err(err) => {
                    warn!(stored = imported.len(), "rolling back partial import");
                    for stored in &imported {
                        self.discard(stored.invoice_id());
                    }
                    return Err(err);
                }
            }
        }
        info!(count = imported.len(), "imported invoices");
        Ok(imported)
    }

    /// Remove an invoice this book stored as part of a command that then failed.
    fn discard(&self, invoice_id: Uuid) {
        if let Err(err) = self.store.remove(invoice_id) {
            error!(%invoice_id, ?err, "failed to roll back stored invoice");
        }
    }

    /// Run a lifecycle command and log the status change it causes.
    fn transition<F>(&self, invoice_id: Uuid, today: Date, command: F) -> Result<Invoice>
    where
        F: FnOnce(&Invoice) -> Result<Invoice>,
    {
        let mut before = None;
        let updated = self.store.update(invoice_id, |invoice| {
            before = Some(invoice.status_of(today));
            command(invoice)
        })?;

        let after = updated.status_of(today);
        if let Some(before) = before
            && before != after
        {
            debug_assert!(
                before.can_transition_to(after),
                "illegal status change {before} -> {after}"
            );
            info!(
                invoice_number = %updated.invoice_number(),
                from = %before,
                to = %after,
                "invoice status changed"
            );
        }
        Ok(updated)
    }
}

//! Invoice persistence.
//!
//! [`InvoiceStore`] is the seam between the [`crate::BillingBook`] facade and wherever
//! invoices live. [`MemoryStore`] keeps them in a sharded concurrent map; writes to one
//! invoice are serialized by holding that invoice's entry lock for the whole
//! read-modify-write.

use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

use crate::{
    entities::invoice::Invoice,
    error::{Error, Result},
};

/// Storage operations the billing facade needs.
pub trait InvoiceStore: Send + Sync {
    /// Store a new invoice. Fails if its id or invoice number is already taken.
    fn insert(&self, invoice: Invoice) -> Result<Invoice>;

    /// Delete an invoice and release its invoice number.
    fn remove(&self, invoice_id: Uuid) -> Result<Invoice>;

    /// Get an invoice by id.
    fn get(&self, invoice_id: Uuid) -> Result<Invoice>;

    /// Get an invoice by its display number.
    fn find_by_number(&self, invoice_number: &str) -> Result<Invoice>;

    /// Whether an invoice with this display number exists.
    fn contains_number(&self, invoice_number: &str) -> bool;

    /// Run `command` against the stored invoice and store its result.
    ///
    /// No other write to the same invoice may interleave with the command. If the
    /// command fails the stored invoice is left as it was.
    fn update<F>(&self, invoice_id: Uuid, command: F) -> Result<Invoice>
    where
        F: FnOnce(&Invoice) -> Result<Invoice>;

    /// Every stored invoice, ordered by invoice date then invoice number.
    fn all(&self) -> Vec<Invoice>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    invoices: DashMap<Uuid, Invoice>,
    numbers: DashMap<String, Uuid>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

impl InvoiceStore for MemoryStore {
    fn insert(&self, invoice: Invoice) -> Result<Invoice> {
        let invoice_id = invoice.invoice_id();
        // the vacant id slot stays locked until both indexes are written
        let Entry::Vacant(id_slot) = self.invoices.entry(invoice_id) else {
            return Err(Error::invalid_input(format!(
                "invoice id {invoice_id} is already in use"
            )));
        };
        match self.numbers.entry(invoice.invoice_number().to_string()) {
            Entry::Occupied(_) => {
                return Err(Error::invalid_input(format!(
                    "invoice number {} is already in use",
                    invoice.invoice_number()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(invoice_id);
            }
        }
        id_slot.insert(invoice.clone());
        trace!(%invoice_id, "stored invoice");
        Ok(invoice)
    }

    fn get(&self, invoice_id: Uuid) -> Result<Invoice> {
        self.invoices
            .get(&invoice_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found("Invoice", invoice_id))
    }

    fn find_by_number(&self, invoice_number: &str) -> Result<Invoice> {
        let invoice_id = self
            .numbers
            .get(invoice_number)
            .map(|entry| *entry.value())
            .ok_or_else(|| Error::not_found("Invoice", invoice_number))?;
        self.get(invoice_id)
    }

    fn contains_number(&self, invoice_number: &str) -> bool {
        self.numbers.contains_key(invoice_number)
    }

    fn remove(&self, invoice_id: Uuid) -> Result<Invoice> {
        let (_, invoice) = self
            .invoices
            .remove(&invoice_id)
            .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
        self.numbers
            .remove_if(invoice.invoice_number(), |_, owner| *owner == invoice_id);
        trace!(%invoice_id, "removed invoice");
        Ok(invoice)
    }

    fn update<F>(&self, invoice_id: Uuid, command: F) -> Result<Invoice>
    where
        F: FnOnce(&Invoice) -> Result<Invoice>,
    {
        let mut entry = self
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
        let updated = command(entry.value())?;
        debug_assert_eq!(updated.invoice_id(), invoice_id);
        debug_assert_eq!(updated.invoice_number(), entry.value().invoice_number());
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    fn all(&self) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        invoices.sort_by(|a, b| {
            a.invoice_date()
                .cmp(&b.invoice_date())
                .then_with(|| a.invoice_number().cmp(b.invoice_number()))
        });
        invoices
    }
}

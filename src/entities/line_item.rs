use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A product line on an invoice.
///
/// Line items are immutable once added: changing the quantity replaces the entry
/// (see [`LineItems::set_quantity`]) and a quantity of zero removes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item, rejecting a zero quantity or a negative unit price.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<Self> {
        let item = Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    /// `unit_price * quantity`, unrounded.
    ///
    /// Fails with [`Error::InvalidInput`] when the product is too large to represent.
    pub fn line_total(&self) -> Result<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "line item {} total is out of range ({} x {})",
                    self.product_id, self.unit_price, self.quantity
                ))
            })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(Error::invalid_input(format!(
                "line item {} must have a positive quantity",
                self.product_id
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "line item {} has a negative unit price of {}",
                self.product_id, self.unit_price
            )));
        }
        Ok(())
    }

    #[must_use]
    fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// Ordered line items of one invoice, keyed by product id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&LineItem> {
        self.0.iter().find(|item| item.product_id == product_id)
    }

    /// Append a new product line. A product that is already listed is rejected, so an
    /// order that names the same product twice never loses quantity silently.
    pub fn add(&mut self, item: LineItem) -> Result<()> {
        item.validate()?;
        if self.get(&item.product_id).is_some() {
            return Err(Error::invalid_input(format!(
                "product {} is listed more than once",
                item.product_id
            )));
        }
        self.0.push(item);
        Ok(())
    }

    /// Add or replace a line item. Adding a product that is already present replaces its entry
    /// in place, so the invoice never lists a product twice.
    pub fn upsert(&mut self, item: LineItem) -> Result<()> {
        item.validate()?;
        match self.0.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => *existing = item,
            None => self.0.push(item),
        }
        Ok(())
    }

    /// Replace the quantity of `product_id`; a quantity of zero removes the entry.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<()> {
        let position = self
            .0
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or_else(|| Error::not_found("LineItem", product_id))?;

        if quantity == 0 {
            self.0.remove(position);
        } else {
            self.0[position] = self.0[position].with_quantity(quantity);
        }
        Ok(())
    }

    /// Remove `product_id`, returning the removed entry.
    pub fn remove(&mut self, product_id: &str) -> Option<LineItem> {
        let position = self.0.iter().position(|item| item.product_id == product_id)?;
        Some(self.0.remove(position))
    }
}

impl From<Vec<LineItem>> for LineItems {
    fn from(items: Vec<LineItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<LineItem> for LineItems {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn serum() -> LineItem {
        LineItem::new("SKU-VC-30", "Vitamin C Serum 30ml", dec!(45.00), 10).unwrap()
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        assert_eq!(serum().line_total().unwrap(), dec!(450.00));
    }

    #[test]
    fn line_total_overflow_is_an_error() {
        let item = LineItem::new("SKU-BIG", "Bulk pallet", Decimal::MAX, 2).unwrap();
        assert!(matches!(item.line_total(), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn rejects_zero_quantity_and_negative_price() {
        assert!(matches!(
            LineItem::new("SKU-1", "Collagen", dec!(10), 0),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            LineItem::new("SKU-1", "Collagen", dec!(-0.01), 1),
            Err(Error::InvalidInput { .. })
        ));
        assert!(LineItem::new("SKU-FREE", "Sample sachet", dec!(0), 1).is_ok());
    }

    #[test]
    fn set_quantity_replaces_entry_and_zero_removes() {
        let mut items: LineItems = vec![serum()].into();
        items.set_quantity("SKU-VC-30", 3).unwrap();
        assert_eq!(items.get("SKU-VC-30").map(|i| i.quantity), Some(3));

        items.set_quantity("SKU-VC-30", 0).unwrap();
        assert!(items.is_empty());

        assert!(matches!(
            items.set_quantity("SKU-VC-30", 1),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn upsert_keeps_one_entry_per_product() {
        let mut items = LineItems::new();
        items.upsert(serum()).unwrap();
        items
            .upsert(LineItem::new("SKU-VC-30", "Vitamin C Serum 30ml", dec!(42.00), 12).unwrap())
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.as_slice()[0].unit_price, dec!(42.00));
    }

    #[test]
    fn add_rejects_a_product_listed_twice() {
        let mut items = LineItems::new();
        items.add(serum()).unwrap();
        let again = LineItem::new("SKU-VC-30", "Vitamin C Serum 30ml", dec!(45.00), 5).unwrap();
        assert!(matches!(items.add(again), Err(Error::InvalidInput { .. })));
        assert_eq!(items.get("SKU-VC-30").map(|i| i.quantity), Some(10));
    }

    #[test]
    fn deserializes_camel_case() {
        let item: LineItem = serde_json::from_value(serde_json::json!({
            "productId": "SKU-OM3",
            "name": "Omega-3 Softgels",
            "unitPrice": "35.00",
            "quantity": 15
        }))
        .unwrap();
        assert_eq!(item.line_total().unwrap(), dec!(525.00));
    }
}

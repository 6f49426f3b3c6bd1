use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::utils::date_format::iso_date_format;

/// How a retailer settled (part of) an invoice.
///
/// Serialized as its snake_case label. Deserializing goes through the same label
/// normalisation as [`PaymentMethod::from`], so `"Bank Transfer"` in imported data
/// and in a live payment both become [`PaymentMethod::BankTransfer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    Ach,
    Check,
    Wire,
    /// Anything the portal does not have a dedicated label for.
    Other(String),
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Ach => "ach",
            PaymentMethod::Check => "check",
            PaymentMethod::Wire => "wire",
            PaymentMethod::Other(label) => label,
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "bank_transfer" => PaymentMethod::BankTransfer,
            "credit_card" => PaymentMethod::CreditCard,
            "ach" => PaymentMethod::Ach,
            "check" | "cheque" => PaymentMethod::Check,
            "wire" | "wire_transfer" => PaymentMethod::Wire,
            _ => PaymentMethod::Other(s.to_string()),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(label: String) -> Self {
        match PaymentMethod::from(label.as_str()) {
            PaymentMethod::Other(_) => PaymentMethod::Other(label),
            known => known,
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// One payment applied against an invoice. Amounts are kept at full precision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(with = "iso_date_format")]
    pub date: Date,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: String,
}

impl PaymentRecord {
    #[must_use]
    pub fn new(
        date: Date,
        amount: Decimal,
        method: impl Into<PaymentMethod>,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            method: method.into(),
            transaction_id: transaction_id.into(),
        }
    }
}

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Largest day count accepted for [`BillingConfig::payment_terms_days`] and
/// [`BillingConfig::due_soon_days`].
pub const MAX_TERM_DAYS: i64 = 3650;

/// Environment variable overriding [`BillingConfig::payment_terms_days`].
pub const ENV_PAYMENT_TERMS_DAYS: &str = "BRAND_BILLING_PAYMENT_TERMS_DAYS";
/// Environment variable overriding [`BillingConfig::due_soon_days`].
pub const ENV_DUE_SOON_DAYS: &str = "BRAND_BILLING_DUE_SOON_DAYS";
/// Environment variable overriding [`BillingConfig::default_tax_rate`].
pub const ENV_DEFAULT_TAX_RATE: &str = "BRAND_BILLING_DEFAULT_TAX_RATE";
/// Environment variable overriding [`BillingConfig::default_shipping_fee`].
pub const ENV_DEFAULT_SHIPPING_FEE: &str = "BRAND_BILLING_DEFAULT_SHIPPING_FEE";

/// Settings shared by every invoice a [`crate::BillingBook`] creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingConfig {
    /// Days between invoice date and due date when a draft does not set a due date.
    pub payment_terms_days: i64,
    /// Window, in days, in which an open invoice is badged as due soon.
    pub due_soon_days: i64,
    /// Tax rate (percent) applied when a draft does not set one.
    pub default_tax_rate: Decimal,
    /// Shipping fee applied when a draft does not set one.
    pub default_shipping_fee: Decimal,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            payment_terms_days: 30,
            due_soon_days: 7,
            default_tax_rate: Decimal::ZERO,
            default_shipping_fee: Decimal::ZERO,
        }
    }
}

impl BillingConfig {
    /// Defaults overridden by any `BRAND_BILLING_*` environment variables that are set.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed, holds a
    /// negative value, or names more than [`MAX_TERM_DAYS`] days.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            payment_terms_days: env_days_or(ENV_PAYMENT_TERMS_DAYS, defaults.payment_terms_days)?,
            due_soon_days: env_days_or(ENV_DUE_SOON_DAYS, defaults.due_soon_days)?,
            default_tax_rate: env_or(ENV_DEFAULT_TAX_RATE, defaults.default_tax_rate)?,
            default_shipping_fee: env_or(ENV_DEFAULT_SHIPPING_FEE, defaults.default_shipping_fee)?,
        };
        debug!(?config, "loaded billing config from environment");
        Ok(config)
    }

    #[must_use]
    pub fn with_payment_terms_days(mut self, days: i64) -> Self {
        self.payment_terms_days = days;
        self
    }

    #[must_use]
    pub fn with_due_soon_days(mut self, days: i64) -> Self {
        self.due_soon_days = days;
        self
    }

    #[must_use]
    pub fn with_default_tax_rate(mut self, rate: Decimal) -> Self {
        self.default_tax_rate = rate;
        self
    }

    #[must_use]
    pub fn with_default_shipping_fee(mut self, fee: Decimal) -> Self {
        self.default_shipping_fee = fee;
        self
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
{
    parse_setting(key, std::env::var(key).ok(), default)
}

fn env_days_or(key: &str, default: i64) -> Result<i64> {
    parse_days(key, std::env::var(key).ok(), default)
}

fn parse_days(key: &str, raw: Option<String>, default: i64) -> Result<i64> {
    let days = parse_setting(key, raw, default)?;
    if days > MAX_TERM_DAYS {
        return Err(Error::config(key, days.to_string()));
    }
    Ok(days)
}

fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value >= T::default() => Ok(value),
        _ => Err(Error::config(key, raw)),
    }
}

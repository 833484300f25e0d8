//! Currency conversion seam.
//!
//! The engine never adds amounts in different currencies: everything goes
//! through a [`CurrencyConverter`] first. Rate sourcing lives outside this
//! crate; [`RateTable`] only holds the rates it is given.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::asset::Money;
use super::errors::PricingError;

pub trait CurrencyConverter: Send + Sync {
    /// Convert `amount` from `from` into `to`
    fn convert(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal, PricingError>;

    fn convert_money(&self, money: &Money, to: &str) -> Result<Decimal, PricingError> {
        self.convert(&money.currency, to, money.amount)
    }
}

/// Static exchange rates quoted against a base currency.
///
/// A rate of `1.08` for `USD` with base `EUR` means 1 EUR = 1.08 USD.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_ascii_uppercase(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: Decimal) -> Result<Self, PricingError> {
        if rate <= Decimal::ZERO {
            return Err(PricingError::configuration(format!(
                "exchange rate for {} must be positive",
                currency
            )));
        }
        self.rates.insert(currency.to_ascii_uppercase(), rate);
        Ok(self)
    }

    /// Parse a `USD=1.08,GBP=0.85` rate list
    pub fn parse(base: &str, spec: &str) -> Result<Self, PricingError> {
        let mut table = Self::new(base);
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, rate) = entry.split_once('=').ok_or_else(|| {
                PricingError::configuration(format!("malformed currency rate '{}'", entry))
            })?;
            let rate = rate.trim().parse::<Decimal>().map_err(|e| {
                PricingError::configuration(format!("invalid rate for {}: {}", code.trim(), e))
            })?;
            table = table.with_rate(code.trim(), rate)?;
        }
        Ok(table)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn rate(&self, currency: &str) -> Option<Decimal> {
        let currency = currency.to_ascii_uppercase();
        if currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }
}

impl CurrencyConverter for RateTable {
    fn convert(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal, PricingError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }

        let unsupported = || PricingError::UnsupportedCurrency {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_rate = self.rate(from).ok_or_else(unsupported)?;
        let to_rate = self.rate(to).ok_or_else(unsupported)?;

        Ok(amount / from_rate * to_rate)
    }
}

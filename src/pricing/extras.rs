//! Add-on charges.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::asset::{Asset, ExtraPayment, ExtraUnit};
use super::currency::CurrencyConverter;
use super::errors::PricingError;

/// Add-on subtotals in the target currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraSubtotals {
    /// Selected optional extras collected through the platform
    pub optional_invoice: Decimal,
    /// Obligatory extras collected through the platform
    pub obligatory_invoice: Decimal,
    /// Every charged extra, wherever it is paid
    pub total: Decimal,
}

pub trait ExtraChargesProvider: Send + Sync {
    fn subtotals(
        &self,
        selected: &[Uuid],
        asset: &Asset,
        guests: u32,
        nights: i64,
        currency: &str,
    ) -> Result<ExtraSubtotals, PricingError>;
}

/// Prices extras from the boat's own catalog
#[derive(Clone)]
pub struct CatalogExtras {
    converter: Arc<dyn CurrencyConverter>,
}

impl CatalogExtras {
    pub fn new(converter: Arc<dyn CurrencyConverter>) -> Self {
        Self { converter }
    }
}

impl ExtraChargesProvider for CatalogExtras {
    fn subtotals(
        &self,
        selected: &[Uuid],
        asset: &Asset,
        guests: u32,
        nights: i64,
        currency: &str,
    ) -> Result<ExtraSubtotals, PricingError> {
        let nights = Decimal::from(nights.max(0));
        let guests = Decimal::from(guests);
        let mut subtotals = ExtraSubtotals::default();

        for extra in &asset.extras {
            if !extra.obligatory && !selected.contains(&extra.id) {
                continue;
            }

            let quantity = match extra.unit {
                ExtraUnit::PerBooking => Decimal::ONE,
                ExtraUnit::PerNight => nights,
                ExtraUnit::PerGuest => guests,
                ExtraUnit::PerGuestNight => guests * nights,
            };
            let amount = self.converter.convert_money(&extra.price, currency)? * quantity;

            subtotals.total += amount;
            if extra.payment == ExtraPayment::Invoice {
                if extra.obligatory {
                    subtotals.obligatory_invoice += amount;
                } else {
                    subtotals.optional_invoice += amount;
                }
            }
        }

        Ok(subtotals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::asset::{Channel, Extra, Money};
    use crate::pricing::currency::RateTable;
    use rust_decimal_macros::dec;

    fn extra(id: u128, amount: Decimal, unit: ExtraUnit, obligatory: bool, payment: ExtraPayment) -> Extra {
        Extra {
            id: Uuid::from_u128(id),
            name: format!("extra-{}", id),
            price: Money::new(amount, "EUR"),
            unit,
            obligatory,
            payment,
        }
    }

    fn provider() -> CatalogExtras {
        CatalogExtras::new(Arc::new(RateTable::parse("EUR", "USD=2").unwrap()))
    }

    fn boat() -> Asset {
        let mut asset = Asset::new(Uuid::nil(), "Extras", Channel::Direct);
        asset.extras = vec![
            extra(1, dec!(50), ExtraUnit::PerBooking, true, ExtraPayment::Invoice),
            extra(2, dec!(10), ExtraUnit::PerNight, false, ExtraPayment::Invoice),
            extra(3, dec!(5), ExtraUnit::PerGuestNight, false, ExtraPayment::OnSite),
            extra(4, dec!(20), ExtraUnit::PerGuest, true, ExtraPayment::OnSite),
        ];
        asset
    }

    #[test]
    fn test_obligatory_extras_always_charged() {
        let subtotals = provider().subtotals(&[], &boat(), 2, 3, "EUR").unwrap();
        assert_eq!(subtotals.obligatory_invoice, dec!(50));
        assert_eq!(subtotals.optional_invoice, dec!(0));
        // 50 + 20 * 2 guests (on site)
        assert_eq!(subtotals.total, dec!(90));
    }

    #[test]
    fn test_selected_optional_extras() {
        let selected = [Uuid::from_u128(2), Uuid::from_u128(3)];
        let subtotals = provider().subtotals(&selected, &boat(), 2, 3, "EUR").unwrap();
        assert_eq!(subtotals.optional_invoice, dec!(30));
        // 90 + 30 + 5 * 2 * 3
        assert_eq!(subtotals.total, dec!(150));
    }

    #[test]
    fn test_extras_converted_to_target_currency() {
        let selected = [Uuid::from_u128(2)];
        let subtotals = provider().subtotals(&selected, &boat(), 1, 2, "USD").unwrap();
        assert_eq!(subtotals.optional_invoice, dec!(40));
        assert_eq!(subtotals.obligatory_invoice, dec!(100));
    }

    #[test]
    fn test_zero_nights_per_night_extras_cost_nothing() {
        let selected = [Uuid::from_u128(2)];
        let subtotals = provider().subtotals(&selected, &boat(), 1, 0, "EUR").unwrap();
        assert_eq!(subtotals.optional_invoice, dec!(0));
    }
}

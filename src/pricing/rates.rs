//! Rate schedule resolution.
//!
//! Prices the nights of a booking by carving rate tiers out of a [`Calendar`]
//! in a fixed order: owner-defined overrides before standing rates, coarse
//! tiers before fine ones. Each tier only sees the days earlier tiers left.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::PricingConfig;

use super::asset::{Asset, Money, PeriodKind};
use super::calendar::{run_end, Calendar};
use super::currency::CurrencyConverter;
use super::errors::PricingError;

/// Rate tier that priced a group of nights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    CustomMonthly,
    Monthly,
    CustomWeekly,
    Weekly,
    CustomDay,
    Daily,
}

/// Nights priced by one tier allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLine {
    pub tier: RateTier,
    /// First night of the allocation
    pub from: NaiveDate,
    pub nights: u32,
    /// Amount in the target currency
    pub amount: Decimal,
}

/// Every allocation made while pricing a booking, in allocation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateBreakdown {
    pub lines: Vec<RateLine>,
}

impl RateBreakdown {
    /// Raw rental price before discount
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }

    pub fn nights(&self) -> u32 {
        self.lines.iter().map(|line| line.nights).sum()
    }

    fn push(&mut self, tier: RateTier, from: NaiveDate, nights: u32, amount: Decimal) {
        debug!(?tier, %from, nights, %amount, "allocated nights");
        self.lines.push(RateLine {
            tier,
            from,
            nights,
            amount,
        });
    }
}

/// Prices the nights of a booking against a boat's rate schedule
pub struct RateResolver<'a> {
    asset: &'a Asset,
    config: &'a PricingConfig,
    converter: &'a dyn CurrencyConverter,
    currency: &'a str,
}

impl<'a> RateResolver<'a> {
    pub fn new(
        asset: &'a Asset,
        config: &'a PricingConfig,
        converter: &'a dyn CurrencyConverter,
        currency: &'a str,
    ) -> Self {
        Self {
            asset,
            config,
            converter,
            currency,
        }
    }

    /// Allocate every night of `[check_in, check_out)` to exactly one tier
    pub fn breakdown(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<RateBreakdown, PricingError> {
        let mut calendar = Calendar::new(check_in, check_out);
        let mut breakdown = RateBreakdown::default();
        let rates = &self.asset.rates;

        self.custom_periods(
            PeriodKind::Monthly,
            RateTier::CustomMonthly,
            check_in,
            check_out,
            &mut calendar,
            &mut breakdown,
        )?;
        self.standing_periods(
            rates.monthly.as_ref(),
            self.config.days_in_month,
            RateTier::Monthly,
            &mut calendar,
            &mut breakdown,
        )?;
        self.custom_periods(
            PeriodKind::Weekly,
            RateTier::CustomWeekly,
            check_in,
            check_out,
            &mut calendar,
            &mut breakdown,
        )?;
        self.standing_periods(
            rates.weekly.as_ref(),
            self.config.days_in_week,
            RateTier::Weekly,
            &mut calendar,
            &mut breakdown,
        )?;
        self.custom_days(check_in, check_out, &mut calendar, &mut breakdown)?;
        self.daily(&calendar, &mut breakdown)?;

        Ok(breakdown)
    }

    /// Un-discounted rental price of `[check_in, check_out)`
    pub fn raw_rental_price(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Decimal, PricingError> {
        Ok(self.breakdown(check_in, check_out)?.total())
    }

    fn custom_periods(
        &self,
        kind: PeriodKind,
        tier: RateTier,
        check_in: NaiveDate,
        check_out: NaiveDate,
        calendar: &mut Calendar,
        breakdown: &mut RateBreakdown,
    ) -> Result<(), PricingError> {
        for rule in self.asset.period_prices(kind, check_in, check_out) {
            let Some(last) = rule.last_day() else {
                continue;
            };
            if !calendar.check_period_integrity(rule.date_from, last) {
                debug!(?tier, from = %rule.date_from, to = %rule.date_to, "custom period not intact, skipped");
                continue;
            }

            let amount = self.converter.convert_money(&rule.price, self.currency)?;
            let nights = (rule.date_to - rule.date_from).num_days() as u32;
            calendar.remove_period(rule.date_from, last);
            breakdown.push(tier, rule.date_from, nights, amount);
        }
        Ok(())
    }

    fn standing_periods(
        &self,
        price: Option<&Money>,
        length: u32,
        tier: RateTier,
        calendar: &mut Calendar,
        breakdown: &mut RateBreakdown,
    ) -> Result<(), PricingError> {
        let Some(price) = price.filter(|price| price.is_set()) else {
            return Ok(());
        };

        // Converted lazily so a schedule that never fits the booking costs no lookup
        let mut amount = None;
        // Runs are found in date order and removal never creates new ones,
        // so each search resumes after the previous run
        let mut cursor = NaiveDate::MIN;
        while let Some(start) = calendar.solid_period_from(cursor, length) {
            let converted = match amount {
                Some(converted) => converted,
                None => *amount.insert(self.converter.convert_money(price, self.currency)?),
            };
            let end = run_end(start, length);
            calendar.remove_period(start, end);
            breakdown.push(tier, start, length, converted);
            match end.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Ok(())
    }

    fn custom_days(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        calendar: &mut Calendar,
        breakdown: &mut RateBreakdown,
    ) -> Result<(), PricingError> {
        for (day, price) in self.asset.day_prices(check_in, check_out) {
            if !calendar.check_period_integrity(day, day) {
                continue;
            }
            let amount = self.converter.convert_money(price, self.currency)?;
            calendar.remove_day(day);
            breakdown.push(RateTier::CustomDay, day, 1, amount);
        }
        Ok(())
    }

    fn daily(&self, calendar: &Calendar, breakdown: &mut RateBreakdown) -> Result<(), PricingError> {
        let Some(first) = calendar.first_day() else {
            return Ok(());
        };
        let nights = calendar.days_count() as u32;
        let amount = match &self.asset.rates.daily {
            Some(price) => self.converter.convert_money(price, self.currency)? * Decimal::from(nights),
            None => Decimal::ZERO,
        };
        breakdown.push(RateTier::Daily, first, nights, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::asset::{Channel, CustomPeriodPrice};
    use crate::pricing::currency::RateTable;
    use chrono::Days;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, "EUR")
    }

    fn boat() -> Asset {
        let mut asset = Asset::new(Uuid::nil(), "Sea Breeze", Channel::Direct);
        asset.rates.daily = Some(eur(dec!(100)));
        asset
    }

    fn custom(kind: PeriodKind, from: NaiveDate, nights: u64, amount: Decimal) -> CustomPeriodPrice {
        CustomPeriodPrice {
            kind,
            date_from: from,
            date_to: from.checked_add_days(Days::new(nights)).unwrap(),
            price: eur(amount),
        }
    }

    fn price(asset: &Asset, check_in: NaiveDate, check_out: NaiveDate) -> RateBreakdown {
        let config = PricingConfig::default();
        let rates = RateTable::parse("EUR", "USD=2").unwrap();
        RateResolver::new(asset, &config, &rates, "EUR")
            .breakdown(check_in, check_out)
            .unwrap()
    }

    #[test]
    fn test_daily_only() {
        let breakdown = price(&boat(), date(2024, 6, 1), date(2024, 6, 4));
        assert_eq!(breakdown.total(), dec!(300));
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.lines[0].tier, RateTier::Daily);
        assert_eq!(breakdown.lines[0].nights, 3);
    }

    #[test]
    fn test_weekly_rate_consumes_solid_week() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));

        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 8));
        assert_eq!(breakdown.total(), dec!(500));
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.lines[0].tier, RateTier::Weekly);
    }

    #[test]
    fn test_weeks_then_days() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));

        // 16 nights = 2 weeks + 2 days
        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 17));
        assert_eq!(breakdown.total(), dec!(1200));
        assert_eq!(breakdown.nights(), 16);
    }

    #[test]
    fn test_monthly_before_weekly() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));
        asset.rates.monthly = Some(eur(dec!(1800)));

        // 38 nights = 1 month (30) + 1 week + 1 day
        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 7, 9));
        assert_eq!(breakdown.total(), dec!(2400));
        let tiers: Vec<RateTier> = breakdown.lines.iter().map(|l| l.tier).collect();
        assert_eq!(tiers, vec![RateTier::Monthly, RateTier::Weekly, RateTier::Daily]);
    }

    #[test]
    fn test_custom_monthly_override_then_standing_tiers() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));
        asset.rates.monthly = Some(eur(dec!(1800)));
        asset.rates.custom = vec![custom(PeriodKind::Monthly, date(2024, 6, 1), 10, dec!(700))];

        // 40 nights: 10 by the override, remaining 30 form one standing month
        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 7, 11));
        assert_eq!(breakdown.total(), dec!(2500));
        assert_eq!(breakdown.lines[0].tier, RateTier::CustomMonthly);
        assert_eq!(breakdown.lines[0].nights, 10);
        assert_eq!(breakdown.lines[1].tier, RateTier::Monthly);
        assert_eq!(breakdown.lines[1].from, date(2024, 6, 11));
        assert_eq!(breakdown.nights(), 40);
    }

    #[test]
    fn test_custom_override_in_the_middle_breaks_standing_runs() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));
        asset.rates.custom = vec![custom(PeriodKind::Weekly, date(2024, 6, 5), 7, dec!(300))];

        // 18 nights: 4 days, override week, 7 days
        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 19));
        // 300 (override) + 500 (week from 06-12) + 4 * 100
        assert_eq!(breakdown.total(), dec!(1200));
        assert_eq!(breakdown.nights(), 18);
    }

    #[test]
    fn test_overlapping_custom_overrides_are_not_double_counted() {
        let mut asset = boat();
        asset.rates.custom = vec![
            custom(PeriodKind::Weekly, date(2024, 6, 1), 7, dec!(300)),
            custom(PeriodKind::Weekly, date(2024, 6, 4), 7, dec!(350)),
        ];

        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 11));
        // First override wins, second is skipped, 3 remaining days are daily
        assert_eq!(breakdown.total(), dec!(600));
        assert_eq!(breakdown.nights(), 10);
    }

    #[test]
    fn test_custom_override_reaching_past_check_out_is_skipped() {
        let mut asset = boat();
        asset.rates.custom = vec![custom(PeriodKind::Monthly, date(2024, 6, 1), 30, dec!(1000))];

        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 11));
        assert_eq!(breakdown.total(), dec!(1000));
        assert!(breakdown.lines.iter().all(|l| l.tier == RateTier::Daily));
    }

    #[test]
    fn test_custom_days_and_conversion() {
        let mut asset = boat();
        asset.rates.custom = vec![CustomPeriodPrice {
            kind: PeriodKind::Daily,
            date_from: date(2024, 6, 2),
            date_to: date(2024, 6, 3),
            price: Money::new(dec!(300), "USD"),
        }];

        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 4));
        // 150 EUR for the override day, 2 * 100 for the rest
        assert_eq!(breakdown.total(), dec!(350));
        assert_eq!(breakdown.lines[0].tier, RateTier::CustomDay);
    }

    #[test]
    fn test_allocation_completeness() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));
        asset.rates.monthly = Some(eur(dec!(1800)));
        asset.rates.custom = vec![
            custom(PeriodKind::Monthly, date(2024, 6, 20), 12, dec!(900)),
            custom(PeriodKind::Weekly, date(2024, 6, 3), 7, dec!(300)),
            custom(PeriodKind::Daily, date(2024, 6, 1), 3, dec!(90)),
        ];

        for nights in [0u64, 1, 6, 7, 13, 29, 30, 31, 45, 64, 90] {
            let check_in = date(2024, 6, 1);
            let check_out = check_in.checked_add_days(Days::new(nights)).unwrap();
            let breakdown = price(&asset, check_in, check_out);
            assert_eq!(u64::from(breakdown.nights()), nights, "nights = {}", nights);
        }
    }

    #[test]
    fn test_multi_year_booking() {
        let mut asset = boat();
        asset.rates.weekly = Some(eur(dec!(500)));
        asset.rates.monthly = Some(eur(dec!(1800)));

        // 3653 nights = 121 months + 3 weeks + 2 days
        let breakdown = price(&asset, date(2020, 1, 1), date(2030, 1, 1));
        assert_eq!(breakdown.nights(), 3653);
        let count = |tier: RateTier| breakdown.lines.iter().filter(|l| l.tier == tier).count();
        assert_eq!(count(RateTier::Monthly), 121);
        assert_eq!(count(RateTier::Weekly), 3);
        assert_eq!(breakdown.total(), dec!(219500));
        assert_eq!(breakdown.lines.last().unwrap().nights, 2);
    }

    #[test]
    fn test_no_daily_rate_prices_remaining_days_at_zero() {
        let asset = Asset::new(Uuid::nil(), "Bare", Channel::Direct);
        let breakdown = price(&asset, date(2024, 6, 1), date(2024, 6, 3));
        assert_eq!(breakdown.total(), dec!(0));
        assert_eq!(breakdown.nights(), 2);
    }

    #[test]
    fn test_unsupported_currency_propagates() {
        let mut asset = boat();
        asset.rates.daily = Some(Money::new(dec!(100), "JPY"));
        let config = PricingConfig::default();
        let rates = RateTable::new("EUR");

        let err = RateResolver::new(&asset, &config, &rates, "EUR")
            .raw_rental_price(date(2024, 6, 1), date(2024, 6, 3))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnsupportedCurrency { .. }));
    }
}

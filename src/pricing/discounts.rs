//! Discount resolution.
//!
//! Exactly one discount applies to the whole raw rental price. For direct
//! boats the candidates are tried in priority order and the first match wins.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PricingConfig;

use super::asset::{Asset, Channel, DiscountPeriodKind};
use super::booking::BookingRequest;
use super::calculators::percent;
use super::calendar::Calendar;
use super::errors::DiscountLookupError;

/// Discount lookup owned by an external inventory system
pub trait ExternalDiscountService: Send + Sync {
    /// Discount percentage (whole number) for a resource over the given
    /// `YYYY-MM-DDTHH:MM:SS` timestamps
    fn resource_discount(
        &self,
        resource_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Decimal, DiscountLookupError>;
}

/// Used when no external discount service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalDiscounts;

impl ExternalDiscountService for NoExternalDiscounts {
    fn resource_discount(&self, _: &str, _: &str, _: &str) -> Result<Decimal, DiscountLookupError> {
        Err(DiscountLookupError::NotConfigured)
    }
}

/// Which rule produced the applied discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    External,
    CustomMonthly,
    Monthly,
    CustomWeekly,
    Weekly,
    Daily,
    None,
}

/// Discount fraction (0..1) and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub rate: Decimal,
    pub source: DiscountSource,
}

impl AppliedDiscount {
    pub fn none() -> Self {
        Self {
            rate: Decimal::ZERO,
            source: DiscountSource::None,
        }
    }

    fn from_percent(value: Decimal, source: DiscountSource) -> Self {
        Self {
            rate: percent(value),
            source,
        }
    }
}

pub struct DiscountResolver<'a> {
    asset: &'a Asset,
    config: &'a PricingConfig,
    service: &'a dyn ExternalDiscountService,
}

impl<'a> DiscountResolver<'a> {
    pub fn new(
        asset: &'a Asset,
        config: &'a PricingConfig,
        service: &'a dyn ExternalDiscountService,
    ) -> Self {
        Self {
            asset,
            config,
            service,
        }
    }

    /// Resolve the discount for a booking; never fails
    pub fn resolve(&self, booking: &BookingRequest) -> AppliedDiscount {
        let applied = match &self.asset.channel {
            Channel::BookingManager { resource_id } => self.external(resource_id, booking.dates()),
            Channel::Syndicated => AppliedDiscount::none(),
            Channel::Direct => self.direct(booking.dates()),
        };
        debug!(boat_id = %self.asset.id, rate = %applied.rate, source = ?applied.source, "resolved discount");
        applied
    }

    fn external(&self, resource_id: &str, dates: Option<(NaiveDate, NaiveDate)>) -> AppliedDiscount {
        let Some((check_in, check_out)) = dates else {
            return AppliedDiscount::none();
        };

        let check_in = check_in.format("%Y-%m-%dT00:00:00").to_string();
        let check_out = check_out.format("%Y-%m-%dT00:00:00").to_string();

        match self.service.resource_discount(resource_id, &check_in, &check_out) {
            Ok(value) => AppliedDiscount::from_percent(
                value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
                DiscountSource::External,
            ),
            Err(e) => {
                warn!(resource_id, error = %e, "external discount lookup failed, applying none");
                AppliedDiscount::none()
            }
        }
    }

    fn direct(&self, dates: Option<(NaiveDate, NaiveDate)>) -> AppliedDiscount {
        let schedule = &self.asset.discounts;
        let standing_daily = match schedule.daily.filter(|d| !d.is_zero()) {
            Some(daily) => AppliedDiscount::from_percent(daily, DiscountSource::Daily),
            None => AppliedDiscount::none(),
        };

        let Some((check_in, check_out)) = dates else {
            return standing_daily;
        };
        let calendar = Calendar::new(check_in, check_out);

        if let Some(value) = self.intact_custom(DiscountPeriodKind::Monthly, &calendar, check_in, check_out) {
            return AppliedDiscount::from_percent(value, DiscountSource::CustomMonthly);
        }

        if let Some(monthly) = schedule.monthly.filter(|d| !d.is_zero()) {
            if calendar.is_whole_month(self.config.days_in_month) {
                return AppliedDiscount::from_percent(monthly, DiscountSource::Monthly);
            }
        }

        if let Some(value) = self.intact_custom(DiscountPeriodKind::Weekly, &calendar, check_in, check_out) {
            return AppliedDiscount::from_percent(value, DiscountSource::CustomWeekly);
        }

        if let Some(weekly) = schedule.weekly.filter(|d| !d.is_zero()) {
            if calendar.solid_period(self.config.days_in_week).is_some() {
                return AppliedDiscount::from_percent(weekly, DiscountSource::Weekly);
            }
        }

        standing_daily
    }

    /// First custom discount of `kind` whose whole range lies inside the booking
    fn intact_custom(
        &self,
        kind: DiscountPeriodKind,
        calendar: &Calendar,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<Decimal> {
        self.asset
            .period_discounts(kind, check_in, check_out)
            .find(|rule| {
                rule.last_day()
                    .is_some_and(|last| calendar.check_period_integrity(rule.date_from, last))
            })
            .map(|rule| rule.discount)
    }
}

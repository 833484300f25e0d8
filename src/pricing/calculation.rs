//! Price aggregation for a single booking request.
//!
//! Every derived amount is computed on first access and cached for the
//! lifetime of the [`PriceCalculation`]. Amounts feed into each other
//! (`total_price` needs `rental_price`, which needs `raw_rental_price` and
//! `discount`), so caching keeps conversions and the external discount lookup
//! to one call per request.

use std::cell::OnceCell;

use rust_decimal::Decimal;
use tracing::trace;

use crate::config::PricingConfig;

use super::asset::Asset;
use super::booking::BookingRequest;
use super::calculators::{fee_surcharge, per_night, percent};
use super::currency::CurrencyConverter;
use super::discounts::{AppliedDiscount, DiscountResolver, ExternalDiscountService};
use super::errors::PricingError;
use super::extras::{ExtraChargesProvider, ExtraSubtotals};
use super::fees;
use super::rates::{RateBreakdown, RateResolver};

/// Derived amounts of a price calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    RawRentalPrice,
    Discount,
    RentalPrice,
    RentalDailyPrice,
    CleanTotalPaidPrice,
    TotalPaidPrice,
    TotalPrice,
    DailyPaidPrice,
    DailyPrice,
    Fee,
    FeeForOwner,
    FeeSurcharge,
    OwnerFeeSurcharge,
    Deposit,
}

impl PriceField {
    pub const ALL: [PriceField; 14] = [
        PriceField::RawRentalPrice,
        PriceField::Discount,
        PriceField::RentalPrice,
        PriceField::RentalDailyPrice,
        PriceField::CleanTotalPaidPrice,
        PriceField::TotalPaidPrice,
        PriceField::TotalPrice,
        PriceField::DailyPaidPrice,
        PriceField::DailyPrice,
        PriceField::Fee,
        PriceField::FeeForOwner,
        PriceField::FeeSurcharge,
        PriceField::OwnerFeeSurcharge,
        PriceField::Deposit,
    ];

    const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PriceField::RawRentalPrice => "raw_rental_price",
            PriceField::Discount => "discount",
            PriceField::RentalPrice => "rental_price",
            PriceField::RentalDailyPrice => "rental_daily_price",
            PriceField::CleanTotalPaidPrice => "clean_total_paid_price",
            PriceField::TotalPaidPrice => "total_paid_price",
            PriceField::TotalPrice => "total_price",
            PriceField::DailyPaidPrice => "daily_paid_price",
            PriceField::DailyPrice => "daily_price",
            PriceField::Fee => "fee",
            PriceField::FeeForOwner => "fee_for_owner",
            PriceField::FeeSurcharge => "fee_surcharge",
            PriceField::OwnerFeeSurcharge => "owner_fee_surcharge",
            PriceField::Deposit => "deposit",
        }
    }
}

/// External collaborators of a price calculation
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub converter: &'a dyn CurrencyConverter,
    pub discounts: &'a dyn ExternalDiscountService,
    pub extras: &'a dyn ExtraChargesProvider,
}

/// Every amount of a priced booking, in the target currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResult {
    pub currency: String,
    pub nights: i64,
    pub raw_rental_price: Decimal,
    pub discount: AppliedDiscount,
    pub rental_price: Decimal,
    pub rental_daily_price: Decimal,
    pub clean_total_paid_price: Decimal,
    pub total_paid_price: Decimal,
    pub total_price: Decimal,
    pub daily_paid_price: Decimal,
    pub daily_price: Decimal,
    pub fee: Decimal,
    pub fee_for_owner: Decimal,
    pub fee_surcharge: Decimal,
    pub owner_fee_surcharge: Decimal,
    pub deposit: Decimal,
    pub extras: ExtraSubtotals,
    pub breakdown: RateBreakdown,
}

pub struct PriceCalculation<'a> {
    asset: &'a Asset,
    booking: &'a BookingRequest,
    config: &'a PricingConfig,
    deps: Collaborators<'a>,
    fields: [OnceCell<Decimal>; PriceField::COUNT],
    breakdown: OnceCell<RateBreakdown>,
    applied_discount: OnceCell<AppliedDiscount>,
    extras: OnceCell<ExtraSubtotals>,
}

impl<'a> PriceCalculation<'a> {
    pub fn new(
        asset: &'a Asset,
        booking: &'a BookingRequest,
        config: &'a PricingConfig,
        deps: Collaborators<'a>,
    ) -> Self {
        Self {
            asset,
            booking,
            config,
            deps,
            fields: std::array::from_fn(|_| OnceCell::new()),
            breakdown: OnceCell::new(),
            applied_discount: OnceCell::new(),
            extras: OnceCell::new(),
        }
    }

    /// Value of a single derived amount
    pub fn get(&self, field: PriceField) -> Result<Decimal, PricingError> {
        match field {
            PriceField::RawRentalPrice => self.raw_rental_price(),
            PriceField::Discount => Ok(self.discount()),
            PriceField::RentalPrice => self.rental_price(),
            PriceField::RentalDailyPrice => self.rental_daily_price(),
            PriceField::CleanTotalPaidPrice => self.clean_total_paid_price(),
            PriceField::TotalPaidPrice => self.total_paid_price(),
            PriceField::TotalPrice => self.total_price(),
            PriceField::DailyPaidPrice => self.daily_paid_price(),
            PriceField::DailyPrice => self.daily_price(),
            PriceField::Fee => Ok(self.fee()),
            PriceField::FeeForOwner => Ok(self.fee_for_owner()),
            PriceField::FeeSurcharge => self.fee_surcharge(),
            PriceField::OwnerFeeSurcharge => self.owner_fee_surcharge(),
            PriceField::Deposit => self.deposit(),
        }
    }

    fn memo(
        &self,
        field: PriceField,
        compute: impl FnOnce() -> Result<Decimal, PricingError>,
    ) -> Result<Decimal, PricingError> {
        let cell = &self.fields[field.index()];
        if let Some(value) = cell.get() {
            return Ok(*value);
        }
        let value = compute()?;
        trace!(field = field.name(), %value, "computed price field");
        Ok(*cell.get_or_init(|| value))
    }

    fn currency(&self) -> &str {
        self.booking.currency()
    }

    fn nights(&self) -> i64 {
        self.booking.nights()
    }

    /// Tier allocations of the booking nights; empty without a date range
    pub fn breakdown(&self) -> Result<&RateBreakdown, PricingError> {
        if let Some(breakdown) = self.breakdown.get() {
            return Ok(breakdown);
        }
        let breakdown = match self.booking.dates() {
            Some((check_in, check_out)) => {
                RateResolver::new(self.asset, self.config, self.deps.converter, self.currency())
                    .breakdown(check_in, check_out)?
            }
            None => RateBreakdown::default(),
        };
        Ok(self.breakdown.get_or_init(|| breakdown))
    }

    pub fn raw_rental_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::RawRentalPrice, || Ok(self.breakdown()?.total()))
    }

    pub fn applied_discount(&self) -> AppliedDiscount {
        *self.applied_discount.get_or_init(|| {
            DiscountResolver::new(self.asset, self.config, self.deps.discounts).resolve(self.booking)
        })
    }

    /// Discount fraction; infallible since lookup faults degrade to zero
    pub fn discount(&self) -> Decimal {
        *self.fields[PriceField::Discount.index()].get_or_init(|| self.applied_discount().rate)
    }

    pub fn rental_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::RentalPrice, || {
            Ok(self.raw_rental_price()? * (Decimal::ONE - self.discount()))
        })
    }

    /// Renter-side fee fraction
    pub fn fee(&self) -> Decimal {
        *self.fields[PriceField::Fee.index()].get_or_init(|| fees::renter_fee(self.asset, self.config))
    }

    pub fn fee_for_owner(&self) -> Decimal {
        *self.fields[PriceField::FeeForOwner.index()]
            .get_or_init(|| fees::owner_fee(self.asset, self.config))
    }

    pub fn extras(&self) -> Result<ExtraSubtotals, PricingError> {
        if let Some(extras) = self.extras.get() {
            return Ok(*extras);
        }
        let extras = self.deps.extras.subtotals(
            self.booking.extras(),
            self.asset,
            self.booking.guests().unwrap_or(1),
            self.nights(),
            self.currency(),
        )?;
        Ok(*self.extras.get_or_init(|| extras))
    }

    /// Rental price plus the extras collected through the platform
    pub fn clean_total_paid_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::CleanTotalPaidPrice, || {
            let extras = self.extras()?;
            Ok(self.rental_price()? + extras.optional_invoice + extras.obligatory_invoice)
        })
    }

    /// Renter fee surcharge, only on the platform's own payment rail
    pub fn fee_surcharge(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::FeeSurcharge, || self.surcharge(self.fee()))
    }

    pub fn owner_fee_surcharge(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::OwnerFeeSurcharge, || self.surcharge(self.fee_for_owner()))
    }

    fn surcharge(&self, fee: Decimal) -> Result<Decimal, PricingError> {
        if !self.asset.channel.is_platform_rail() || fee.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok(fee_surcharge(self.clean_total_paid_price()?, fee))
    }

    /// Payable deposit in the target currency, zero when not collected
    pub fn deposit(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::Deposit, || match self.asset.payment.payable_deposit() {
            Some(deposit) => self.deps.converter.convert_money(deposit, self.currency()),
            None => Ok(Decimal::ZERO),
        })
    }

    /// Amount collected through the platform at booking time
    pub fn total_paid_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::TotalPaidPrice, || {
            let terms = &self.asset.payment;
            let mut price = self.clean_total_paid_price()?;

            if terms.first_day_only {
                if let Some(first_night) = per_night(price, self.nights()) {
                    price = first_night;
                }
            }

            if terms.required_payment != Decimal::ONE_HUNDRED {
                price *= percent(terms.required_payment);
            }

            Ok(price + self.deposit()? + self.fee_surcharge()?)
        })
    }

    /// Everything the renter pays, through the platform or on site
    pub fn total_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::TotalPrice, || {
            Ok(self.rental_price()? + self.extras()?.total + self.deposit()? + self.fee_surcharge()?)
        })
    }

    /// Rental price per night, or the default daily rate without a date range
    pub fn rental_daily_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::RentalDailyPrice, || {
            if let Some(price) = per_night(self.rental_price()?, self.nights()) {
                return Ok(price);
            }
            match self.asset.rates.daily.as_ref().filter(|daily| daily.is_set()) {
                Some(daily) => self.deps.converter.convert_money(daily, self.currency()),
                None => Ok(Decimal::ZERO),
            }
        })
    }

    pub fn daily_paid_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::DailyPaidPrice, || {
            match per_night(self.total_paid_price()?, self.nights()) {
                Some(price) => Ok(price),
                None => self.rental_daily_price(),
            }
        })
    }

    pub fn daily_price(&self) -> Result<Decimal, PricingError> {
        self.memo(PriceField::DailyPrice, || {
            match per_night(self.total_price()?, self.nights()) {
                Some(price) => Ok(price),
                None => self.rental_daily_price(),
            }
        })
    }

    /// Evaluate every field
    pub fn result(&self) -> Result<PriceResult, PricingError> {
        Ok(PriceResult {
            currency: self.currency().to_string(),
            nights: self.nights(),
            raw_rental_price: self.raw_rental_price()?,
            discount: self.applied_discount(),
            rental_price: self.rental_price()?,
            rental_daily_price: self.rental_daily_price()?,
            clean_total_paid_price: self.clean_total_paid_price()?,
            total_paid_price: self.total_paid_price()?,
            total_price: self.total_price()?,
            daily_paid_price: self.daily_paid_price()?,
            daily_price: self.daily_price()?,
            fee: self.fee(),
            fee_for_owner: self.fee_for_owner(),
            fee_surcharge: self.fee_surcharge()?,
            owner_fee_surcharge: self.owner_fee_surcharge()?,
            deposit: self.deposit()?,
            extras: self.extras()?,
            breakdown: self.breakdown()?.clone(),
        })
    }
}

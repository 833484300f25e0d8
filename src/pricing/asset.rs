//! Domain model of a rentable boat as seen by the pricing engine.
//!
//! An [`Asset`] is a read-only snapshot assembled by the data-access layer.
//! The engine never mutates it; custom-period lookups are scoped to the
//! booking range on every call.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::PricingError;

/// An amount in a specific currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// True when the amount is strictly positive
    pub fn is_set(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// How the boat's availability and payments are managed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Inventory managed by the external booking manager, which owns discounts
    BookingManager { resource_id: String },
    /// Inventory syndicated from a partner feed
    Syndicated,
    /// Owned directly and paid through the platform's own rail
    Direct,
}

impl Channel {
    /// Build from the database representation
    pub fn from_parts(kind: &str, resource_id: Option<String>) -> Result<Self, PricingError> {
        match kind {
            "booking_manager" => resource_id
                .filter(|id| !id.is_empty())
                .map(|resource_id| Channel::BookingManager { resource_id })
                .ok_or_else(|| {
                    PricingError::configuration("booking_manager boat without resource_id")
                }),
            "syndicated" => Ok(Channel::Syndicated),
            "direct" => Ok(Channel::Direct),
            other => Err(PricingError::configuration(format!(
                "unknown distribution channel '{}'",
                other
            ))),
        }
    }

    pub fn is_external(&self) -> bool {
        match self {
            Channel::BookingManager { .. } | Channel::Syndicated => true,
            Channel::Direct => false,
        }
    }

    /// Fee surcharges are only collected on the platform's own payment rail
    pub fn is_platform_rail(&self) -> bool {
        matches!(self, Channel::Direct)
    }
}

/// Granularity tag of a custom price override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Monthly,
    Weekly,
    Daily,
}

impl FromStr for PeriodKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(PeriodKind::Monthly),
            "weekly" => Ok(PeriodKind::Weekly),
            "daily" => Ok(PeriodKind::Daily),
            other => Err(PricingError::configuration(format!(
                "unknown period kind '{}'",
                other
            ))),
        }
    }
}

/// Owner-defined price for an explicit date range.
///
/// `date_to` is exclusive: a single-date override spans `[day, day + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPeriodPrice {
    pub kind: PeriodKind,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub price: Money,
}

impl CustomPeriodPrice {
    /// Last night covered by the override, `None` for an empty range
    pub fn last_day(&self) -> Option<NaiveDate> {
        last_day(self.date_from, self.date_to)
    }

    fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date_from < to && self.date_to > from
    }
}

/// Default and custom rates of a boat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSchedule {
    pub daily: Option<Money>,
    pub weekly: Option<Money>,
    pub monthly: Option<Money>,
    pub custom: Vec<CustomPeriodPrice>,
}

/// Granularity tag of a custom discount override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPeriodKind {
    Monthly,
    Weekly,
}

impl FromStr for DiscountPeriodKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(DiscountPeriodKind::Monthly),
            "weekly" => Ok(DiscountPeriodKind::Weekly),
            other => Err(PricingError::configuration(format!(
                "unknown discount period kind '{}'",
                other
            ))),
        }
    }
}

/// Owner-defined discount (whole-number percentage) for a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPeriodDiscount {
    pub kind: DiscountPeriodKind,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub discount: Decimal,
}

impl CustomPeriodDiscount {
    pub fn last_day(&self) -> Option<NaiveDate> {
        last_day(self.date_from, self.date_to)
    }

    fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date_from < to && self.date_to > from
    }
}

/// Standing and custom discounts; all percentages are whole numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountSchedule {
    pub daily: Option<Decimal>,
    pub weekly: Option<Decimal>,
    pub monthly: Option<Decimal>,
    pub custom: Vec<CustomPeriodDiscount>,
}

/// Security deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub amount: Money,
    /// Collected through the platform together with the booking
    pub payable: bool,
}

/// Settings from the owner's pricing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTerms {
    /// Percentage of the booking collected upfront
    pub required_payment: Decimal,
    /// Only the first night is collected upfront
    pub first_day_only: bool,
    pub deposit: Option<Deposit>,
}

impl PaymentTerms {
    /// Deposit to add to the collected amounts, if any
    pub fn payable_deposit(&self) -> Option<&Money> {
        self.deposit
            .as_ref()
            .filter(|deposit| deposit.payable && deposit.amount.is_set())
            .map(|deposit| &deposit.amount)
    }
}

impl Default for PaymentTerms {
    fn default() -> Self {
        Self {
            required_payment: Decimal::ONE_HUNDRED,
            first_day_only: false,
            deposit: None,
        }
    }
}

/// What an extra's price is multiplied by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraUnit {
    PerBooking,
    PerNight,
    PerGuest,
    PerGuestNight,
}

impl FromStr for ExtraUnit {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_booking" => Ok(ExtraUnit::PerBooking),
            "per_night" => Ok(ExtraUnit::PerNight),
            "per_guest" => Ok(ExtraUnit::PerGuest),
            "per_guest_night" => Ok(ExtraUnit::PerGuestNight),
            other => Err(PricingError::configuration(format!(
                "unknown extra unit '{}'",
                other
            ))),
        }
    }
}

/// Where an extra is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPayment {
    /// Collected through the platform
    Invoice,
    /// Paid to the owner on site
    OnSite,
}

impl FromStr for ExtraPayment {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(ExtraPayment::Invoice),
            "on_site" => Ok(ExtraPayment::OnSite),
            other => Err(PricingError::configuration(format!(
                "unknown extra payment mode '{}'",
                other
            ))),
        }
    }
}

/// Optional or obligatory add-on offered with the boat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extra {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    pub unit: ExtraUnit,
    pub obligatory: bool,
    pub payment: ExtraPayment,
}

/// Boat snapshot consumed by the resolvers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub channel: Channel,
    /// Boat-level commission (whole percent)
    pub commission: Option<Decimal>,
    /// Owner-level fee (whole percent)
    pub owner_fee: Option<Decimal>,
    pub rates: RateSchedule,
    pub discounts: DiscountSchedule,
    pub payment: PaymentTerms,
    pub extras: Vec<Extra>,
}

impl Asset {
    pub fn new(id: Uuid, name: impl Into<String>, channel: Channel) -> Self {
        Self {
            id,
            name: name.into(),
            channel,
            commission: None,
            owner_fee: None,
            rates: RateSchedule::default(),
            discounts: DiscountSchedule::default(),
            payment: PaymentTerms::default(),
            extras: Vec::new(),
        }
    }

    /// Custom price overrides of `kind` overlapping `[from, to)`, in schedule order
    pub fn period_prices(
        &self,
        kind: PeriodKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &CustomPeriodPrice> + '_ {
        self.rates
            .custom
            .iter()
            .filter(move |rule| rule.kind == kind && rule.overlaps(from, to))
    }

    /// Per-day price overrides inside `[from, to)`.
    ///
    /// When several daily overrides cover the same day the later one wins.
    pub fn day_prices(&self, from: NaiveDate, to: NaiveDate) -> BTreeMap<NaiveDate, &Money> {
        let mut days = BTreeMap::new();
        for rule in self.period_prices(PeriodKind::Daily, from, to) {
            let start = rule.date_from.max(from);
            let end = rule.date_to.min(to);
            for day in start.iter_days().take_while(|day| *day < end) {
                days.insert(day, &rule.price);
            }
        }
        days
    }

    /// Custom discount overrides of `kind` overlapping `[from, to)`, in schedule order
    pub fn period_discounts(
        &self,
        kind: DiscountPeriodKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &CustomPeriodDiscount> + '_ {
        self.discounts
            .custom
            .iter()
            .filter(move |rule| rule.kind == kind && rule.overlaps(from, to))
    }
}

fn last_day(date_from: NaiveDate, date_to: NaiveDate) -> Option<NaiveDate> {
    if date_to <= date_from {
        return None;
    }
    date_to.pred_opt()
}

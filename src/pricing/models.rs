//! Database models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization
//! and are converted into the engine's [`Asset`] snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::asset::{
    Asset, Channel, CustomPeriodDiscount, CustomPeriodPrice, Deposit, DiscountSchedule, Extra,
    Money, PaymentTerms, RateSchedule,
};
use super::errors::PricingError;

/// Boat from boats joined with its owner
#[derive(Debug, Clone, FromRow)]
pub struct BoatRow {
    pub id: Uuid,
    pub name: String,
    pub channel: String,
    pub resource_id: Option<String>,
    pub commission: Option<Decimal>,
    pub owner_fee: Option<Decimal>,
}

/// Standing prices and payment settings from boat_prices
#[derive(Debug, Clone, FromRow)]
pub struct BoatPricesRow {
    pub daily_price: Option<Decimal>,
    pub daily_price_currency: Option<String>,
    pub weekly_price: Option<Decimal>,
    pub weekly_price_currency: Option<String>,
    pub monthly_price: Option<Decimal>,
    pub monthly_price_currency: Option<String>,
    pub required_payment: Option<Decimal>,
    pub is_required_payment_first_day: bool,
    pub deposit: Option<Decimal>,
    pub deposit_currency: Option<String>,
    pub deposit_payable: bool,
}

impl BoatPricesRow {
    fn payment_terms(&self) -> PaymentTerms {
        let deposit = money(self.deposit, self.deposit_currency.as_deref()).map(|amount| Deposit {
            amount,
            payable: self.deposit_payable,
        });
        PaymentTerms {
            required_payment: self.required_payment.unwrap_or(Decimal::ONE_HUNDRED),
            first_day_only: self.is_required_payment_first_day,
            deposit,
        }
    }
}

/// Standing discounts from boat_discounts
#[derive(Debug, Clone, FromRow)]
pub struct BoatDiscountRow {
    pub daily_discount: Option<Decimal>,
    pub weekly_discount: Option<Decimal>,
    pub monthly_discount: Option<Decimal>,
}

/// Custom period price from boat_period_prices
#[derive(Debug, Clone, FromRow)]
pub struct PeriodPriceRow {
    pub period: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub price: Decimal,
    pub price_currency: String,
}

impl TryFrom<PeriodPriceRow> for CustomPeriodPrice {
    type Error = PricingError;

    fn try_from(row: PeriodPriceRow) -> Result<Self, Self::Error> {
        Ok(CustomPeriodPrice {
            kind: row.period.parse()?,
            date_from: row.date_from,
            date_to: row.date_to,
            price: Money::new(row.price, row.price_currency),
        })
    }
}

/// Custom period discount from boat_period_discounts
#[derive(Debug, Clone, FromRow)]
pub struct PeriodDiscountRow {
    pub period: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub discount: Decimal,
}

impl TryFrom<PeriodDiscountRow> for CustomPeriodDiscount {
    type Error = PricingError;

    fn try_from(row: PeriodDiscountRow) -> Result<Self, Self::Error> {
        Ok(CustomPeriodDiscount {
            kind: row.period.parse()?,
            date_from: row.date_from,
            date_to: row.date_to,
            discount: row.discount,
        })
    }
}

/// Extra from boat_extras
#[derive(Debug, Clone, FromRow)]
pub struct ExtraRow {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub price_currency: String,
    pub unit: String,
    pub obligatory: bool,
    pub payment: String,
}

impl TryFrom<ExtraRow> for Extra {
    type Error = PricingError;

    fn try_from(row: ExtraRow) -> Result<Self, Self::Error> {
        Ok(Extra {
            id: row.id,
            name: row.name,
            price: Money::new(row.price, row.price_currency),
            unit: row.unit.parse()?,
            obligatory: row.obligatory,
            payment: row.payment.parse()?,
        })
    }
}

/// All rows describing one boat
#[derive(Debug, Clone)]
pub struct BoatRows {
    pub boat: BoatRow,
    pub prices: Option<BoatPricesRow>,
    pub discounts: Option<BoatDiscountRow>,
    pub period_prices: Vec<PeriodPriceRow>,
    pub period_discounts: Vec<PeriodDiscountRow>,
    pub extras: Vec<ExtraRow>,
}

impl TryFrom<BoatRows> for Asset {
    type Error = PricingError;

    fn try_from(rows: BoatRows) -> Result<Self, Self::Error> {
        let BoatRows {
            boat,
            prices,
            discounts,
            period_prices,
            period_discounts,
            extras,
        } = rows;

        let channel = Channel::from_parts(&boat.channel, boat.resource_id)?;

        let custom_prices = period_prices
            .into_iter()
            .map(CustomPeriodPrice::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let rates = match &prices {
            Some(p) => RateSchedule {
                daily: money(p.daily_price, p.daily_price_currency.as_deref()),
                weekly: money(p.weekly_price, p.weekly_price_currency.as_deref()),
                monthly: money(p.monthly_price, p.monthly_price_currency.as_deref()),
                custom: custom_prices,
            },
            None => RateSchedule {
                custom: custom_prices,
                ..RateSchedule::default()
            },
        };

        let custom_discounts = period_discounts
            .into_iter()
            .map(CustomPeriodDiscount::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let discounts = DiscountSchedule {
            daily: discounts.as_ref().and_then(|d| d.daily_discount),
            weekly: discounts.as_ref().and_then(|d| d.weekly_discount),
            monthly: discounts.as_ref().and_then(|d| d.monthly_discount),
            custom: custom_discounts,
        };

        let extras = extras
            .into_iter()
            .map(Extra::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Asset {
            id: boat.id,
            name: boat.name,
            channel,
            commission: boat.commission,
            owner_fee: boat.owner_fee,
            rates,
            discounts,
            payment: prices
                .as_ref()
                .map(BoatPricesRow::payment_terms)
                .unwrap_or_default(),
            extras,
        })
    }
}

fn money(amount: Option<Decimal>, currency: Option<&str>) -> Option<Money> {
    Some(Money::new(amount?, currency?))
}

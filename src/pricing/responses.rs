//! Response DTOs for pricing API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::CacheStats;

use super::calculation::PriceResult;
use super::calculators::round_money;
use super::discounts::DiscountSource;
use super::rates::{RateLine, RateTier};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    /// Rounded to cents
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount: round_money(amount, 2),
            currency: currency.to_string(),
        }
    }
}

/// Applied discount
#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    /// Percent, 0..100
    #[serde(with = "rust_decimal::serde::str")]
    pub percent: Decimal,
    pub source: DiscountSource,
}

/// One tier allocation of the rental price
#[derive(Debug, Serialize)]
pub struct RateLineResponse {
    pub tier: RateTier,
    pub from: NaiveDate,
    pub nights: u32,
    pub amount: MoneyResponse,
}

/// Add-on subtotals
#[derive(Debug, Serialize)]
pub struct ExtrasResponse {
    pub optional_invoice: MoneyResponse,
    pub obligatory_invoice: MoneyResponse,
    pub total: MoneyResponse,
}

/// Response for a charter quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub boat_id: Uuid,
    pub nights: i64,
    pub currency: String,
    pub raw_rental_price: MoneyResponse,
    pub discount: DiscountResponse,
    pub rental_price: MoneyResponse,
    pub rental_daily_price: MoneyResponse,
    /// Service fee percent charged to the renter
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    /// Service fee percent charged to the owner
    #[serde(with = "rust_decimal::serde::str")]
    pub fee_for_owner: Decimal,
    pub fee_surcharge: MoneyResponse,
    pub owner_fee_surcharge: MoneyResponse,
    pub deposit: MoneyResponse,
    pub extras: ExtrasResponse,
    pub clean_total_paid_price: MoneyResponse,
    pub total_paid_price: MoneyResponse,
    pub total_price: MoneyResponse,
    pub daily_paid_price: MoneyResponse,
    pub daily_price: MoneyResponse,
    pub breakdown: Vec<RateLineResponse>,
}

impl QuoteResponse {
    pub fn new(boat_id: Uuid, result: &PriceResult) -> Self {
        let currency = result.currency.as_str();
        let money = |amount: Decimal| MoneyResponse::new(amount, currency);
        let line = |line: &RateLine| RateLineResponse {
            tier: line.tier,
            from: line.from,
            nights: line.nights,
            amount: money(line.amount),
        };

        Self {
            boat_id,
            nights: result.nights,
            currency: currency.to_string(),
            raw_rental_price: money(result.raw_rental_price),
            discount: DiscountResponse {
                percent: round_money(result.discount.rate * Decimal::ONE_HUNDRED, 2),
                source: result.discount.source,
            },
            rental_price: money(result.rental_price),
            rental_daily_price: money(result.rental_daily_price),
            fee: round_money(result.fee * Decimal::ONE_HUNDRED, 2),
            fee_for_owner: round_money(result.fee_for_owner * Decimal::ONE_HUNDRED, 2),
            fee_surcharge: money(result.fee_surcharge),
            owner_fee_surcharge: money(result.owner_fee_surcharge),
            deposit: money(result.deposit),
            extras: ExtrasResponse {
                optional_invoice: money(result.extras.optional_invoice),
                obligatory_invoice: money(result.extras.obligatory_invoice),
                total: money(result.extras.total),
            },
            clean_total_paid_price: money(result.clean_total_paid_price),
            total_paid_price: money(result.total_paid_price),
            total_price: money(result.total_price),
            daily_paid_price: money(result.daily_paid_price),
            daily_price: money(result.daily_price),
            breakdown: result.breakdown.lines.iter().map(line).collect(),
        }
    }
}

/// Service health and cache occupancy
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: CacheStats,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

//! Service fee resolution.
//!
//! Fees are stored as whole percentages and returned as fractions.

use rust_decimal::Decimal;

use crate::config::PricingConfig;

use super::asset::{Asset, Channel};
use super::calculators::percent;

/// Renter-side service fee
pub fn renter_fee(asset: &Asset, config: &PricingConfig) -> Decimal {
    match asset.channel {
        Channel::BookingManager { .. } => Decimal::ZERO,
        Channel::Syndicated => percent(asset.commission.unwrap_or_default()),
        Channel::Direct => {
            let configured = asset
                .commission
                .filter(|fee| !fee.is_zero())
                .or_else(|| asset.owner_fee.filter(|fee| !fee.is_zero()))
                .unwrap_or(config.service_fee);
            percent(configured)
        }
    }
}

/// Owner-side service fee
pub fn owner_fee(asset: &Asset, config: &PricingConfig) -> Decimal {
    if asset.channel.is_external() {
        return Decimal::ZERO;
    }
    percent(config.owner_service_fee)
}

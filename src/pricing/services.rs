//! Pricing service functions with database access.
//!
//! These functions load boat snapshots through the cache and run the engine
//! on a blocking thread.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;
use crate::AppState;

use super::asset::Asset;
use super::booking::BookingRequest;
use super::calculation::{Collaborators, PriceCalculation, PriceResult};
use super::extras::CatalogExtras;
use super::queries;

/// Load a boat snapshot, from the cache when possible.
///
/// # Returns
/// `AppError::NotFound` when the boat does not exist
pub async fn load_asset(
    pool: &PgPool,
    cache: &AppCache,
    boat_id: Uuid,
) -> Result<Arc<Asset>, AppError> {
    if let Some(cached) = cache.assets.get(&boat_id).await {
        debug!(%boat_id, "asset cache hit");
        return Ok(cached);
    }

    let asset = queries::find_asset(pool, boat_id)
        .await?
        .map(Arc::new)
        .ok_or(AppError::NotFound)?;

    cache.assets.insert(boat_id, asset.clone()).await;
    Ok(asset)
}

/// Price a booking against a boat snapshot.
///
/// The engine is synchronous and may block on the booking manager, so it runs
/// on the blocking pool.
pub async fn price(
    state: &AppState,
    asset: Arc<Asset>,
    booking: BookingRequest,
) -> Result<PriceResult, AppError> {
    let config = state.pricing.clone();
    let converter = state.converter.clone();
    let discounts = state.discounts.clone();

    let result = tokio::task::spawn_blocking(move || {
        let extras = CatalogExtras::new(converter.clone());
        let deps = Collaborators {
            converter: converter.as_ref(),
            discounts: discounts.as_ref(),
            extras: &extras,
        };
        PriceCalculation::new(&asset, &booking, &config, deps).result()
    })
    .await
    .map_err(|e| AppError::Internal(format!("pricing task failed: {}", e)))??;

    Ok(result)
}

/// Load the boat and price the booking
pub async fn quote(state: &AppState, booking: BookingRequest) -> Result<PriceResult, AppError> {
    let booking = booking.within(state.pricing.max_nights)?;
    let boat_id = booking.boat_id();
    let asset = load_asset(&state.db, &state.cache, boat_id).await?;
    let result = price(state, asset, booking).await?;

    info!(
        %boat_id,
        nights = result.nights,
        currency = %result.currency,
        total_price = %result.total_price,
        "quote computed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::pricing::asset::{Channel, Money};
    use crate::pricing::currency::RateTable;
    use crate::pricing::discounts::NoExternalDiscounts;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn state() -> AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/charter_pricing_test")
            .unwrap();
        AppState {
            db,
            cache: AppCache::new(),
            pricing: Arc::new(PricingConfig::default()),
            converter: Arc::new(RateTable::new("EUR")),
            discounts: Arc::new(NoExternalDiscounts),
        }
    }

    fn boat(id: Uuid) -> Asset {
        let mut asset = Asset::new(id, "Aurora", Channel::Direct);
        asset.rates.daily = Some(Money::new(dec!(100), "EUR"));
        asset
    }

    #[tokio::test]
    async fn test_price_runs_engine() {
        let booking = BookingRequest::new(
            Uuid::nil(),
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 6, 4),
            "EUR",
        )
        .unwrap();

        let result = price(&state(), Arc::new(boat(Uuid::nil())), booking)
            .await
            .unwrap();
        assert_eq!(result.raw_rental_price, dec!(300));
        assert_eq!(result.nights, 3);
    }

    #[tokio::test]
    async fn test_cached_asset_skips_database() {
        let state = state();
        let id = Uuid::from_u128(42);
        state.cache.assets.insert(id, Arc::new(boat(id))).await;

        // The lazy pool would fail if it were ever used
        let asset = load_asset(&state.db, &state.cache, id).await.unwrap();
        assert_eq!(asset.id, id);
    }
}

//! Database queries for the pricing engine.
//!
//! Loads everything the engine needs about a boat into one [`Asset`] snapshot.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::asset::Asset;
use super::models::{
    BoatDiscountRow, BoatPricesRow, BoatRow, BoatRows, ExtraRow, PeriodDiscountRow,
    PeriodPriceRow,
};

/// Find a boat and its owner-level fee
pub async fn find_boat(pool: &PgPool, boat_id: Uuid) -> Result<Option<BoatRow>, AppError> {
    let boat = sqlx::query_as::<_, BoatRow>(
        r#"
        SELECT
            b.id, b.name, b.channel, b.resource_id,
            b.commission, o.fee AS owner_fee
        FROM boats b
        LEFT JOIN owners o ON o.id = b.owner_id
        WHERE b.id = $1
          AND b.deleted_at IS NULL
        "#,
    )
    .bind(boat_id)
    .fetch_optional(pool)
    .await?;

    Ok(boat)
}

/// Standing prices and payment settings of a boat
pub async fn find_boat_prices(
    pool: &PgPool,
    boat_id: Uuid,
) -> Result<Option<BoatPricesRow>, AppError> {
    let prices = sqlx::query_as::<_, BoatPricesRow>(
        r#"
        SELECT
            daily_price, daily_price_currency,
            weekly_price, weekly_price_currency,
            monthly_price, monthly_price_currency,
            required_payment, is_required_payment_first_day,
            deposit, deposit_currency, deposit_payable
        FROM boat_prices
        WHERE boat_id = $1
        "#,
    )
    .bind(boat_id)
    .fetch_optional(pool)
    .await?;

    Ok(prices)
}

/// Standing discounts of a boat
pub async fn find_boat_discounts(
    pool: &PgPool,
    boat_id: Uuid,
) -> Result<Option<BoatDiscountRow>, AppError> {
    let discounts = sqlx::query_as::<_, BoatDiscountRow>(
        r#"
        SELECT daily_discount, weekly_discount, monthly_discount
        FROM boat_discounts
        WHERE boat_id = $1
        "#,
    )
    .bind(boat_id)
    .fetch_optional(pool)
    .await?;

    Ok(discounts)
}

/// Custom period prices, in the order the engine should try them
pub async fn find_period_prices(
    pool: &PgPool,
    boat_id: Uuid,
) -> Result<Vec<PeriodPriceRow>, AppError> {
    let rows = sqlx::query_as::<_, PeriodPriceRow>(
        r#"
        SELECT period, date_from, date_to, price, price_currency
        FROM boat_period_prices
        WHERE boat_id = $1
        ORDER BY date_from, id
        "#,
    )
    .bind(boat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Custom period discounts, in the order the engine should try them
pub async fn find_period_discounts(
    pool: &PgPool,
    boat_id: Uuid,
) -> Result<Vec<PeriodDiscountRow>, AppError> {
    let rows = sqlx::query_as::<_, PeriodDiscountRow>(
        r#"
        SELECT period, date_from, date_to, discount
        FROM boat_period_discounts
        WHERE boat_id = $1
        ORDER BY date_from, id
        "#,
    )
    .bind(boat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Active extras offered with a boat
pub async fn find_extras(pool: &PgPool, boat_id: Uuid) -> Result<Vec<ExtraRow>, AppError> {
    let rows = sqlx::query_as::<_, ExtraRow>(
        r#"
        SELECT id, name, price, price_currency, unit, obligatory, payment
        FROM boat_extras
        WHERE boat_id = $1
          AND active = TRUE
        ORDER BY position, name
        "#,
    )
    .bind(boat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load the full pricing snapshot of a boat
pub async fn find_asset(pool: &PgPool, boat_id: Uuid) -> Result<Option<Asset>, AppError> {
    let Some(boat) = find_boat(pool, boat_id).await? else {
        return Ok(None);
    };

    let (prices, discounts, period_prices, period_discounts, extras) = tokio::try_join!(
        find_boat_prices(pool, boat_id),
        find_boat_discounts(pool, boat_id),
        find_period_prices(pool, boat_id),
        find_period_discounts(pool, boat_id),
        find_extras(pool, boat_id),
    )?;

    let asset = Asset::try_from(BoatRows {
        boat,
        prices,
        discounts,
        period_prices,
        period_discounts,
        extras,
    })?;

    Ok(Some(asset))
}

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use charter_pricing::cache::AppCache;
use charter_pricing::config::Config;
use charter_pricing::pricing::booking_manager::BookingManagerClient;
use charter_pricing::pricing::{ExternalDiscountService, NoExternalDiscounts, RateTable};
use charter_pricing::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("charter_pricing=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let converter = RateTable::parse(&config.currency_base, &config.currency_rates)
        .context("invalid CURRENCY_RATES")?;
    info!("Converting prices against base currency {}", converter.base());

    let discounts: Arc<dyn ExternalDiscountService> = match &config.booking_manager_url {
        Some(url) => Arc::new(
            BookingManagerClient::new(
                url,
                config.booking_manager_timeout,
                tokio::runtime::Handle::current(),
            )
            .context("failed to build booking manager client")?,
        ),
        None => {
            warn!("BOOKING_MANAGER_URL not set, booking manager discounts default to zero");
            Arc::new(NoExternalDiscounts)
        }
    };

    let state = AppState {
        db,
        cache: AppCache::new(),
        pricing: Arc::new(config.pricing.clone()),
        converter: Arc::new(converter),
        discounts,
    };

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

//! Pricing service for boat charter bookings.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::config::PricingConfig;
use crate::pricing::{CurrencyConverter, ExternalDiscountService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub pricing: Arc<PricingConfig>,
    pub converter: Arc<dyn CurrencyConverter>,
    pub discounts: Arc<dyn ExternalDiscountService>,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/pricing", pricing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

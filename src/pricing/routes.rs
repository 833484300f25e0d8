//! Pricing API route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::requests::QuoteRequest;
use super::responses::{HealthResponse, QuoteResponse};
use super::services;

/// Pricing routes, mounted under `/api/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/cache/invalidate", post(invalidate_all))
        .route("/cache/:boat_id/invalidate", post(invalidate))
        .route("/health", get(health))
}

/// Quote a charter
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let booking = request.into_booking()?;
    let boat_id = booking.boat_id();
    let result = services::quote(&state, booking).await?;

    Ok(Json(QuoteResponse::new(boat_id, &result)))
}

/// Drop a boat snapshot after its prices changed
async fn invalidate(State(state): State<AppState>, Path(boat_id): Path<Uuid>) -> StatusCode {
    state.cache.invalidate_asset(boat_id).await;
    StatusCode::NO_CONTENT
}

/// Drop every boat snapshot, e.g. after a bulk price import
async fn invalidate_all(State(state): State<AppState>) -> StatusCode {
    state.cache.invalidate_all();
    StatusCode::NO_CONTENT
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AppCache;
    use crate::config::PricingConfig;
    use crate::pricing::asset::{Asset, Channel, Money};
    use crate::pricing::currency::RateTable;
    use crate::pricing::discounts::NoExternalDiscounts;
    use axum::body::Body;
    use axum::http::{header, Request};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/charter_pricing_test")
            .unwrap();
        AppState {
            db,
            cache: AppCache::new(),
            pricing: Arc::new(PricingConfig::default()),
            converter: Arc::new(RateTable::parse("EUR", "USD=2").unwrap()),
            discounts: Arc::new(NoExternalDiscounts),
        }
    }

    fn app(state: AppState) -> Router {
        Router::new().nest("/api/pricing", router()).with_state(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_reversed_dates_unprocessable() {
        let response = app(state())
            .oneshot(post_json(
                "/api/pricing/quote",
                r#"{
                    "boat_id": "00000000-0000-0000-0000-000000000001",
                    "check_in": "2024-06-10",
                    "check_out": "2024-06-01"
                }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error_type"], "invalid_interval");
        assert_eq!(body["details"]["check_in"], "2024-06-10");
    }

    #[tokio::test]
    async fn test_overlong_booking_unprocessable() {
        // Rejected before the boat is loaded, so the lazy pool is never used
        let response = app(state())
            .oneshot(post_json(
                "/api/pricing/quote",
                r#"{
                    "boat_id": "00000000-0000-0000-0000-000000000001",
                    "check_in": "0001-01-01",
                    "check_out": "9999-12-31"
                }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error_type"], "invalid_interval");
        assert_eq!(body["details"]["max_nights"], 3650);
    }

    #[tokio::test]
    async fn test_quote_for_cached_boat() {
        let state = state();
        let id = Uuid::from_u128(1);
        let mut asset = Asset::new(id, "Aurora", Channel::Direct);
        asset.rates.daily = Some(Money::new(dec!(100), "EUR"));
        state.cache.assets.insert(id, Arc::new(asset)).await;

        let response = app(state)
            .oneshot(post_json(
                "/api/pricing/quote",
                r#"{
                    "boat_id": "00000000-0000-0000-0000-000000000001",
                    "check_in": "2024-06-01",
                    "check_out": "2024-06-04",
                    "currency": "usd"
                }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["nights"], 3);
        assert_eq!(body["raw_rental_price"]["amount"], "600");
        assert_eq!(body["breakdown"][0]["tier"], "daily");
    }

    #[tokio::test]
    async fn test_unsupported_currency_unprocessable() {
        let state = state();
        let id = Uuid::from_u128(2);
        let mut asset = Asset::new(id, "Boreas", Channel::Direct);
        asset.rates.daily = Some(Money::new(dec!(100), "EUR"));
        state.cache.assets.insert(id, Arc::new(asset)).await;

        let response = app(state)
            .oneshot(post_json(
                "/api/pricing/quote",
                r#"{
                    "boat_id": "00000000-0000-0000-0000-000000000002",
                    "check_in": "2024-06-01",
                    "check_out": "2024-06-02",
                    "currency": "XYZ"
                }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error_type"], "unsupported_currency");
    }

    #[tokio::test]
    async fn test_invalidate_drops_cached_boat() {
        let state = state();
        let id = Uuid::from_u128(3);
        state
            .cache
            .assets
            .insert(id, Arc::new(Asset::new(id, "Ceto", Channel::Direct)))
            .await;

        let response = app(state.clone())
            .oneshot(post_json(
                "/api/pricing/cache/00000000-0000-0000-0000-000000000003/invalidate",
                "",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.cache.assets.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_all_empties_cache() {
        let state = state();
        for n in 10..13 {
            let id = Uuid::from_u128(n);
            state
                .cache
                .assets
                .insert(id, Arc::new(Asset::new(id, "Fleet", Channel::Direct)))
                .await;
        }

        let response = app(state.clone())
            .oneshot(post_json("/api/pricing/cache/invalidate", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.cache.assets.get(&Uuid::from_u128(11)).await.is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(state())
            .oneshot(
                Request::builder()
                    .uri("/api/pricing/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }
}

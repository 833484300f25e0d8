//! HTTP client for the external booking manager's discount API.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::runtime::Handle;

use super::discounts::ExternalDiscountService;
use super::errors::DiscountLookupError;

#[derive(Debug, Deserialize)]
struct DiscountResponse {
    discount: Decimal,
}

/// Booking manager discount lookups.
///
/// The pricing engine is synchronous, so lookups block on the captured
/// runtime handle. Call it from a blocking thread (`spawn_blocking`), never
/// from inside an async task.
#[derive(Debug, Clone)]
pub struct BookingManagerClient {
    client: reqwest::Client,
    base_url: String,
    runtime: Handle,
}

impl BookingManagerClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        runtime: Handle,
    ) -> Result<Self, DiscountLookupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("charter-pricing/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| DiscountLookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            runtime,
        })
    }

    fn discount_url(&self, resource_id: &str) -> String {
        format!("{}/resources/{}/discount", self.base_url, resource_id)
    }

    async fn fetch(
        &self,
        resource_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Decimal, DiscountLookupError> {
        let response = self
            .client
            .get(self.discount_url(resource_id))
            .query(&[("check_in", check_in), ("check_out", check_out)])
            .send()
            .await
            .map_err(|e| DiscountLookupError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DiscountLookupError::Status(response.status().as_u16()));
        }

        let body: DiscountResponse = response
            .json()
            .await
            .map_err(|e| DiscountLookupError::Malformed(e.to_string()))?;

        Ok(body.discount)
    }
}

impl ExternalDiscountService for BookingManagerClient {
    fn resource_discount(
        &self,
        resource_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Decimal, DiscountLookupError> {
        self.runtime
            .block_on(self.fetch(resource_id, check_in, check_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_discount_url_strips_trailing_slash() {
        let client = BookingManagerClient::new(
            "https://bm.example.com/api/",
            Duration::from_secs(1),
            Handle::current(),
        )
        .unwrap();
        assert_eq!(
            client.discount_url("res-7"),
            "https://bm.example.com/api/resources/res-7/discount"
        );
    }

    #[test]
    fn test_discount_response_accepts_numbers_and_strings() {
        let parsed: DiscountResponse = serde_json::from_str(r#"{"discount": 15}"#).unwrap();
        assert_eq!(parsed.discount, dec!(15));

        let parsed: DiscountResponse = serde_json::from_str(r#"{"discount": "7.5"}"#).unwrap();
        assert_eq!(parsed.discount, dec!(7.5));

        assert!(serde_json::from_str::<DiscountResponse>(r#"{"percent": 15}"#).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_service_is_a_transport_error() {
        let client = BookingManagerClient::new(
            "http://127.0.0.1:9",
            Duration::from_millis(200),
            Handle::current(),
        )
        .unwrap();

        let result = tokio::task::spawn_blocking(move || {
            client.resource_discount("res-1", "2024-06-01T00:00:00", "2024-06-08T00:00:00")
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(DiscountLookupError::Transport(_))));
    }
}

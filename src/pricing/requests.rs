//! Request DTOs for pricing API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::booking::BookingRequest;
use super::errors::PricingError;

/// Request to quote a charter
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub boat_id: Uuid,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub guests: Option<u32>,
    /// Optional extras picked by the guest
    #[serde(default)]
    pub extras: Vec<Uuid>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl QuoteRequest {
    pub fn into_booking(self) -> Result<BookingRequest, PricingError> {
        let booking =
            BookingRequest::new(self.boat_id, self.check_in, self.check_out, &self.currency)?
                .with_extras(self.extras);

        Ok(match self.guests {
            Some(guests) => booking.with_guests(guests),
            None => booking,
        })
    }
}

//! Booking request handed to the engine.

use chrono::NaiveDate;
use uuid::Uuid;

use super::errors::PricingError;

/// What is being priced and in which currency.
///
/// Either date may be absent; date-dependent amounts then degrade to their
/// defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    boat_id: Uuid,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    guests: Option<u32>,
    extras: Vec<Uuid>,
    currency: String,
}

impl BookingRequest {
    pub fn new(
        boat_id: Uuid,
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
        currency: &str,
    ) -> Result<Self, PricingError> {
        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            if check_out < check_in {
                return Err(PricingError::InvalidInterval {
                    check_in,
                    check_out,
                });
            }
        }

        Ok(Self {
            boat_id,
            check_in,
            check_out,
            guests: None,
            extras: Vec::new(),
            currency: currency.trim().to_ascii_uppercase(),
        })
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = Some(guests);
        self
    }

    pub fn with_extras(mut self, extras: Vec<Uuid>) -> Self {
        self.extras = extras;
        self
    }

    pub fn boat_id(&self) -> Uuid {
        self.boat_id
    }

    /// Both dates, when both were given
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.check_in.zip(self.check_out)
    }

    /// Reject bookings longer than `max_nights`
    pub fn within(self, max_nights: u32) -> Result<Self, PricingError> {
        let nights = self.nights();
        if nights > i64::from(max_nights) {
            return Err(PricingError::IntervalTooLong { nights, max_nights });
        }
        Ok(self)
    }

    /// Number of nights; zero without a complete date range
    pub fn nights(&self) -> i64 {
        self.dates()
            .map(|(check_in, check_out)| (check_out - check_in).num_days())
            .unwrap_or(0)
    }

    pub fn guests(&self) -> Option<u32> {
        self.guests
    }

    pub fn extras(&self) -> &[Uuid] {
        &self.extras
    }

    /// Target currency code (upper case)
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

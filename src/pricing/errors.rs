//! Error types for the pricing engine.

use chrono::NaiveDate;

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Check-out {check_out} is before check-in {check_in}")]
    InvalidInterval {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Booking of {nights} nights exceeds the maximum of {max_nights}")]
    IntervalTooLong { nights: i64, max_nights: u32 },

    #[error("No exchange rate for {from} -> {to}")]
    UnsupportedCurrency { from: String, to: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PricingError {
    /// Stable identifier used in JSON error payloads
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::InvalidInterval { .. } | PricingError::IntervalTooLong { .. } => {
                "invalid_interval"
            }
            PricingError::UnsupportedCurrency { .. } => "unsupported_currency",
            PricingError::Configuration { .. } => "configuration_error",
        }
    }

    /// Structured context for JSON error payloads
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            PricingError::InvalidInterval {
                check_in,
                check_out,
            } => Some(serde_json::json!({
                "check_in": check_in,
                "check_out": check_out,
            })),
            PricingError::IntervalTooLong { nights, max_nights } => Some(serde_json::json!({
                "nights": nights,
                "max_nights": max_nights,
            })),
            PricingError::UnsupportedCurrency { from, to } => Some(serde_json::json!({
                "from": from,
                "to": to,
            })),
            PricingError::Configuration { .. } => None,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PricingError::Configuration {
            message: message.into(),
        }
    }
}

/// Failure of the external discount lookup.
///
/// Never leaves the discount resolver: every variant degrades to a zero discount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscountLookupError {
    #[error("Discount service is not configured")]
    NotConfigured,

    #[error("Discount service transport error: {0}")]
    Transport(String),

    #[error("Discount service responded with status {0}")]
    Status(u16),

    #[error("Malformed discount response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::InvalidInterval {
            check_in: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert!(err.to_string().contains("2024-06-01"));
        assert_eq!(err.error_type(), "invalid_interval");

        let err = PricingError::UnsupportedCurrency {
            from: "EUR".to_string(),
            to: "XYZ".to_string(),
        };
        assert!(err.to_string().contains("EUR -> XYZ"));

        let err = PricingError::configuration("unknown channel");
        assert!(err.to_string().contains("unknown channel"));
        assert_eq!(err.error_type(), "configuration_error");
    }

    #[test]
    fn test_details() {
        let err = PricingError::InvalidInterval {
            check_in: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let details = err.details().unwrap();
        assert_eq!(details["check_in"], "2024-06-10");
        assert_eq!(details["check_out"], "2024-06-01");

        let err = PricingError::IntervalTooLong {
            nights: 4000,
            max_nights: 3650,
        };
        assert_eq!(err.error_type(), "invalid_interval");
        assert_eq!(err.details().unwrap()["max_nights"], 3650);

        assert_eq!(PricingError::configuration("bad").details(), None);
    }

    #[test]
    fn test_discount_lookup_error_display() {
        assert!(DiscountLookupError::Status(503).to_string().contains("503"));
        assert!(DiscountLookupError::Malformed("eof".to_string())
            .to_string()
            .contains("eof"));
    }
}

//! Pricing engine module for boat charters.
//!
//! Computes the rental price, discount, fees and payment schedule of a
//! booking. The engine itself is synchronous and free of I/O; the HTTP and
//! database layers wrap it.

pub mod asset;
pub mod booking;
pub mod booking_manager;
pub mod calculation;
pub mod calculators;
pub mod calendar;
pub mod currency;
pub mod discounts;
pub mod errors;
pub mod extras;
pub mod fees;
pub mod models;
pub mod queries;
pub mod rates;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use asset::{Asset, Channel, Money};
pub use booking::BookingRequest;
pub use calculation::{Collaborators, PriceCalculation, PriceField, PriceResult};
pub use calculators::round_money;
pub use currency::{CurrencyConverter, RateTable};
pub use discounts::{ExternalDiscountService, NoExternalDiscounts};
pub use errors::{DiscountLookupError, PricingError};
pub use routes::router;

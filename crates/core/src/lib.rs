//! PromoCode Factory Core - partner limit entities, lifecycle, services, and traits.
//!
//! This crate contains the business logic for partner promo-code limits.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod clock;
pub mod errors;
pub mod partners;

pub use clock::{Clock, FixedClock, SystemClock};

// Re-export error types
pub use errors::Error;
pub use errors::Result;

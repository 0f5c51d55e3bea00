//! SQLite storage implementation for partners and their promo-code limits.

mod model;
mod repository;

pub use model::{NewPartnerDB, PartnerDB, PartnerPromoCodeLimitDB};
pub use repository::PartnerRepository;

//! Partners module - domain models, limit lifecycle, services, and traits.

mod partners_errors;
mod partners_lifecycle;
mod partners_model;
mod partners_service;
mod partners_traits;



pub use partners_errors::PartnerError;
pub use partners_lifecycle::{cancel_limit, set_limit};
pub use partners_model::{
    LimitChange, LimitEffect, NewPartner, Partner, PartnerPromoCodeLimit, SetPartnerLimitRequest,
};
pub use partners_service::PartnerService;
pub use partners_traits::{PartnerRepositoryTrait, PartnerServiceTrait};

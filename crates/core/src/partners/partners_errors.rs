use thiserror::Error;

/// Domain failures of the partner limit lifecycle.
///
/// Every variant is an expected outcome the caller branches on; the display
/// strings are returned verbatim to API consumers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartnerError {
    #[error("partner {0} not found")]
    NotFound(String),
    #[error("limit {limit_id} not found for partner {partner_id}")]
    LimitNotFound {
        partner_id: String,
        limit_id: String,
    },
    #[error("partner is not active")]
    Inactive,
    #[error("limit must be greater than 0")]
    InvalidLimit,
}

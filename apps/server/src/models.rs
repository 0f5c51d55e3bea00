use chrono::{DateTime, NaiveDate, NaiveDateTime};
use promocode_core::errors::ValidationError;
use promocode_core::partners as core_partners;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResponse {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub number_issued_promo_codes: i32,
    pub partner_limits: Vec<PartnerPromoCodeLimitResponse>,
}

impl From<core_partners::Partner> for PartnerResponse {
    fn from(p: core_partners::Partner) -> Self {
        Self {
            id: p.id,
            name: p.name,
            is_active: p.is_active,
            number_issued_promo_codes: p.number_issued_promo_codes,
            partner_limits: p
                .limits
                .into_iter()
                .map(PartnerPromoCodeLimitResponse::from)
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPromoCodeLimitResponse {
    pub id: String,
    pub partner_id: String,
    pub create_date: NaiveDateTime,
    pub cancel_date: Option<NaiveDate>,
    pub end_date: NaiveDateTime,
    pub limit: i32,
}

impl From<core_partners::PartnerPromoCodeLimit> for PartnerPromoCodeLimitResponse {
    fn from(l: core_partners::PartnerPromoCodeLimit) -> Self {
        Self {
            id: l.id,
            partner_id: l.partner_id,
            create_date: l.create_date,
            cancel_date: l.cancel_date,
            end_date: l.end_date,
            limit: l.limit,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SetPartnerPromoCodeLimitRequest {
    /// RFC 3339 timestamp, or a local one without offset taken as UTC.
    #[schema(example = "2025-09-01T00:00:00Z")]
    pub end_date: String,
    pub limit: i32,
}

/// Parses a client timestamp into naive UTC.
///
/// Offsets (`Z`, `+03:00`) are applied; a value without one is taken as-is.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_utc());
    }
    Ok(value.parse::<NaiveDateTime>()?)
}

impl TryFrom<SetPartnerPromoCodeLimitRequest> for core_partners::SetPartnerLimitRequest {
    type Error = ValidationError;

    fn try_from(r: SetPartnerPromoCodeLimitRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            end_date: parse_timestamp(&r.end_date)?,
            limit: r.limit,
        })
    }
}

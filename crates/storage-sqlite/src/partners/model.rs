//! Database models for partners.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use promocode_core::partners::{NewPartner, Partner, PartnerPromoCodeLimit};

/// Database model for partners
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::partners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PartnerDB {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub number_issued_promo_codes: i32,
}

/// Database model for creating a new partner
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::partners)]
#[serde(rename_all = "camelCase")]
pub struct NewPartnerDB {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub number_issued_promo_codes: i32,
}

/// Database model for partner limits
#[derive(
    Insertable,
    Queryable,
    Identifiable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(PartnerDB, foreign_key = partner_id))]
#[diesel(table_name = crate::schema::partner_promo_code_limits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PartnerPromoCodeLimitDB {
    pub id: String,
    pub partner_id: String,
    pub create_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub cancel_date: Option<NaiveDate>,
    pub limit_value: i32,
    /// Position in the partner's limit history.
    pub sort_order: i32,
}

impl PartnerPromoCodeLimitDB {
    pub fn from_domain(limit: &PartnerPromoCodeLimit, sort_order: i32) -> Self {
        Self {
            id: limit.id.clone(),
            partner_id: limit.partner_id.clone(),
            create_date: limit.create_date,
            end_date: limit.end_date,
            cancel_date: limit.cancel_date,
            limit_value: limit.limit,
            sort_order,
        }
    }
}

impl From<PartnerPromoCodeLimitDB> for PartnerPromoCodeLimit {
    fn from(db: PartnerPromoCodeLimitDB) -> Self {
        Self {
            id: db.id,
            partner_id: db.partner_id,
            create_date: db.create_date,
            end_date: db.end_date,
            cancel_date: db.cancel_date,
            limit: db.limit_value,
        }
    }
}

impl PartnerDB {
    /// Builds the domain aggregate. `limits` must already be in `sort_order`.
    pub fn into_domain(self, limits: Vec<PartnerPromoCodeLimitDB>) -> Partner {
        Partner {
            id: self.id,
            name: self.name,
            is_active: self.is_active,
            number_issued_promo_codes: self.number_issued_promo_codes,
            limits: limits.into_iter().map(PartnerPromoCodeLimit::from).collect(),
        }
    }
}

impl From<NewPartner> for NewPartnerDB {
    fn from(domain: NewPartner) -> Self {
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: domain.name,
            is_active: domain.is_active,
            number_issued_promo_codes: domain.number_issued_promo_codes,
        }
    }
}

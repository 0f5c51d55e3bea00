//! Partner domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::partners_errors::PartnerError;

/// Domain model representing a partner together with its limit history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub number_issued_promo_codes: i32,
    /// Creation order. Never reordered, entries are only ever appended.
    pub limits: Vec<PartnerPromoCodeLimit>,
}

impl Partner {
    /// The first limit, in creation order, that has not been cancelled.
    pub fn active_limit(&self) -> Option<&PartnerPromoCodeLimit> {
        self.limits.iter().find(|l| l.is_active())
    }

    pub(crate) fn active_limit_mut(&mut self) -> Option<&mut PartnerPromoCodeLimit> {
        self.limits.iter_mut().find(|l| l.is_active())
    }

    pub fn limit(&self, limit_id: &str) -> Option<&PartnerPromoCodeLimit> {
        self.limits.iter().find(|l| l.id == limit_id)
    }

    pub fn active_limit_count(&self) -> usize {
        self.limits.iter().filter(|l| l.is_active()).count()
    }
}

/// A time-bounded cap on the number of promo codes a partner may issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPromoCodeLimit {
    pub id: String,
    pub partner_id: String,
    pub create_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    /// Day the limit stopped being active. Only the date is kept.
    pub cancel_date: Option<NaiveDate>,
    pub limit: i32,
}

impl PartnerPromoCodeLimit {
    pub fn is_active(&self) -> bool {
        self.cancel_date.is_none()
    }

    /// Marks the limit cancelled as of `at`, dropping the time of day.
    ///
    /// Cancellation is terminal: an already cancelled limit keeps its date.
    pub fn cancel(&mut self, at: NaiveDateTime) -> Option<NaiveDate> {
        if self.cancel_date.is_some() {
            return None;
        }
        let day = at.date();
        self.cancel_date = Some(day);
        Some(day)
    }
}

/// Input model for registering a new partner.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    pub id: Option<String>,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub number_issued_promo_codes: i32,
}

/// Request to replace a partner's current limit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetPartnerLimitRequest {
    pub end_date: NaiveDateTime,
    pub limit: i32,
}

impl SetPartnerLimitRequest {
    pub fn validate(&self) -> Result<(), PartnerError> {
        if self.limit <= 0 {
            return Err(PartnerError::InvalidLimit);
        }
        Ok(())
    }
}

/// A single persisted consequence of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LimitEffect {
    LimitCancelled {
        limit_id: String,
        cancel_date: NaiveDate,
    },
    IssuedCounterReset,
    LimitCreated {
        limit_id: String,
    },
}

/// Result of a lifecycle operation: the partner as it must be stored, plus
/// the ordered list of effects that turn the stored state into it.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitChange {
    pub partner: Partner,
    pub effects: Vec<LimitEffect>,
}

impl LimitChange {
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn cancelled_limit_id(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            LimitEffect::LimitCancelled { limit_id, .. } => Some(limit_id.as_str()),
            _ => None,
        })
    }

    pub fn created_limit_id(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            LimitEffect::LimitCreated { limit_id } => Some(limit_id.as_str()),
            _ => None,
        })
    }

    pub fn created_limit(&self) -> Option<&PartnerPromoCodeLimit> {
        self.created_limit_id()
            .and_then(|limit_id| self.partner.limit(limit_id))
    }

    pub fn resets_counter(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, LimitEffect::IssuedCounterReset))
    }
}

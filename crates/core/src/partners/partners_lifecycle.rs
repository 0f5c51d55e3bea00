//! Partner limit lifecycle.
//!
//! Pure computations over a loaded [`Partner`]: they read the clock, never the
//! store, and hand back a [`LimitChange`] for the repository to persist. The
//! input partner is never modified, so a rejected request leaves it exactly as
//! it was.

use log::debug;
use uuid::Uuid;

use super::partners_errors::PartnerError;
use super::partners_model::{
    LimitChange, LimitEffect, Partner, PartnerPromoCodeLimit, SetPartnerLimitRequest,
};
use crate::clock::Clock;

/// Replaces the partner's active limit with a new one built from `request`.
///
/// If a limit is active it is cancelled as of today and the issuance counter
/// restarts at zero. A partner whose limits are all cancelled (or who has none)
/// keeps its counter. Only the first uncancelled limit is superseded; any
/// further uncancelled entries are left as they are.
pub fn set_limit(
    partner: &Partner,
    request: &SetPartnerLimitRequest,
    clock: &dyn Clock,
) -> Result<LimitChange, PartnerError> {
    request.validate()?;
    if !partner.is_active {
        return Err(PartnerError::Inactive);
    }

    let now = clock.now();
    let mut next = partner.clone();
    let mut effects = Vec::with_capacity(3);

    if let Some(active) = next.active_limit_mut() {
        if let Some(cancel_date) = active.cancel(now) {
            effects.push(LimitEffect::LimitCancelled {
                limit_id: active.id.clone(),
                cancel_date,
            });
        }
        next.number_issued_promo_codes = 0;
        effects.push(LimitEffect::IssuedCounterReset);
    }

    let limit = PartnerPromoCodeLimit {
        id: Uuid::new_v4().to_string(),
        partner_id: next.id.clone(),
        create_date: now,
        end_date: request.end_date,
        cancel_date: None,
        limit: request.limit,
    };
    debug!(
        "Partner {}: new limit {} of {} until {}",
        next.id, limit.id, limit.limit, limit.end_date
    );
    effects.push(LimitEffect::LimitCreated {
        limit_id: limit.id.clone(),
    });
    next.limits.push(limit);

    Ok(LimitChange {
        partner: next,
        effects,
    })
}

/// Cancels the partner's active limit without installing a new one.
///
/// The issuance counter is untouched. With no active limit the change is
/// empty.
pub fn cancel_limit(partner: &Partner, clock: &dyn Clock) -> Result<LimitChange, PartnerError> {
    if !partner.is_active {
        return Err(PartnerError::Inactive);
    }

    let mut next = partner.clone();
    let mut effects = Vec::new();

    if let Some(active) = next.active_limit_mut() {
        if let Some(cancel_date) = active.cancel(clock.now()) {
            debug!("Partner {}: cancelled limit {}", partner.id, active.id);
            effects.push(LimitEffect::LimitCancelled {
                limit_id: active.id.clone(),
                cancel_date,
            });
        }
    }

    Ok(LimitChange {
        partner: next,
        effects,
    })
}

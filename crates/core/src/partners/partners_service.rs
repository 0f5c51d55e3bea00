use log::{debug, info};
use std::sync::Arc;

use super::partners_errors::PartnerError;
use super::partners_lifecycle::{cancel_limit, set_limit};
use super::partners_model::{NewPartner, Partner, PartnerPromoCodeLimit, SetPartnerLimitRequest};
use super::partners_traits::{PartnerRepositoryTrait, PartnerServiceTrait};
use crate::clock::Clock;
use crate::errors::{Error, Result};
use async_trait::async_trait;

/// Service for managing partners and their promo-code limits
pub struct PartnerService {
    repository: Arc<dyn PartnerRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl PartnerService {
    pub fn new(repository: Arc<dyn PartnerRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        PartnerService { repository, clock }
    }

    fn load(&self, partner_id: &str) -> Result<Partner> {
        self.repository
            .get_by_id(partner_id)?
            .ok_or_else(|| PartnerError::NotFound(partner_id.to_string()).into())
    }
}

#[async_trait]
impl PartnerServiceTrait for PartnerService {
    fn get_partners(&self) -> Result<Vec<Partner>> {
        self.repository.get_partners()
    }

    fn get_partner(&self, partner_id: &str) -> Result<Partner> {
        self.load(partner_id)
    }

    fn get_partner_limit(
        &self,
        partner_id: &str,
        limit_id: &str,
    ) -> Result<PartnerPromoCodeLimit> {
        let partner = self.load(partner_id)?;
        partner.limit(limit_id).cloned().ok_or_else(|| {
            PartnerError::LimitNotFound {
                partner_id: partner_id.to_string(),
                limit_id: limit_id.to_string(),
            }
            .into()
        })
    }

    async fn create_partner(&self, new_partner: NewPartner) -> Result<Partner> {
        debug!("Creating partner {}", new_partner.name);
        self.repository.add(new_partner).await
    }

    async fn set_partner_limit(
        &self,
        partner_id: &str,
        request: SetPartnerLimitRequest,
    ) -> Result<PartnerPromoCodeLimit> {
        let partner = self.load(partner_id)?;
        let change = set_limit(&partner, &request, self.clock.as_ref())?;
        let limit_id = change
            .created_limit_id()
            .map(str::to_string)
            .ok_or_else(|| Error::Unexpected("limit change produced no new limit".to_string()))?;

        let stored = self.repository.update(change).await?;
        info!(
            "Partner {}: limit {} set to {} until {}",
            partner_id, limit_id, request.limit, request.end_date
        );

        stored.limit(&limit_id).cloned().ok_or_else(|| {
            Error::Unexpected(format!("limit {} missing after update", limit_id))
        })
    }

    async fn cancel_partner_limit(
        &self,
        partner_id: &str,
    ) -> Result<Option<PartnerPromoCodeLimit>> {
        let partner = self.load(partner_id)?;
        let change = cancel_limit(&partner, self.clock.as_ref())?;
        let Some(limit_id) = change.cancelled_limit_id().map(str::to_string) else {
            debug!("Partner {} has no active limit to cancel", partner_id);
            return Ok(None);
        };

        let stored = self.repository.update(change).await?;
        info!("Partner {}: limit {} cancelled", partner_id, limit_id);
        Ok(stored.limit(&limit_id).cloned())
    }
}

use crate::errors::Result;
use crate::partners::partners_model::{
    LimitChange, NewPartner, Partner, PartnerPromoCodeLimit, SetPartnerLimitRequest,
};
use async_trait::async_trait;

/// Trait for partner repository operations
#[async_trait]
pub trait PartnerRepositoryTrait: Send + Sync {
    fn get_partners(&self) -> Result<Vec<Partner>>;
    /// Loads a partner with its limits in creation order. `None` when absent.
    fn get_by_id(&self, partner_id: &str) -> Result<Option<Partner>>;
    async fn add(&self, new_partner: NewPartner) -> Result<Partner>;
    /// Applies every effect of `change` in a single transaction and returns
    /// the partner as stored afterwards.
    async fn update(&self, change: LimitChange) -> Result<Partner>;
}

/// Trait for partner service operations
#[async_trait]
pub trait PartnerServiceTrait: Send + Sync {
    fn get_partners(&self) -> Result<Vec<Partner>>;
    fn get_partner(&self, partner_id: &str) -> Result<Partner>;
    fn get_partner_limit(&self, partner_id: &str, limit_id: &str)
        -> Result<PartnerPromoCodeLimit>;
    async fn create_partner(&self, new_partner: NewPartner) -> Result<Partner>;
    /// Installs a new limit and returns it as persisted.
    async fn set_partner_limit(
        &self,
        partner_id: &str,
        request: SetPartnerLimitRequest,
    ) -> Result<PartnerPromoCodeLimit>;
    /// Cancels the active limit, returning it, or `None` if nothing was active.
    async fn cancel_partner_limit(&self, partner_id: &str)
        -> Result<Option<PartnerPromoCodeLimit>>;
}

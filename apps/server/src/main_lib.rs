use std::sync::Arc;

use crate::config::Config;
use promocode_core::{
    partners::{
        NewPartner, PartnerRepositoryTrait, PartnerService, PartnerServiceTrait,
        SetPartnerLimitRequest,
    },
    Clock, SystemClock,
};
use promocode_storage_sqlite::{db, partners::PartnerRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub partner_service: Arc<dyn PartnerServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("PCF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_clock(config, Arc::new(SystemClock)).await
}

/// Same as [`build_state`] but with an injected clock, so limit dates are
/// deterministic.
pub async fn build_state_with_clock(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let partner_repository = Arc::new(PartnerRepository::new(pool, writer));
    let partner_service = Arc::new(PartnerService::new(partner_repository.clone(), clock.clone()));

    if config.seed_demo_data {
        seed_demo_partners(partner_repository.as_ref(), partner_service.as_ref(), clock.as_ref())
            .await?;
    }

    Ok(Arc::new(AppState { partner_service }))
}

async fn seed_demo_partners(
    repository: &dyn PartnerRepositoryTrait,
    service: &dyn PartnerServiceTrait,
    clock: &dyn Clock,
) -> anyhow::Result<()> {
    if !repository.get_partners()?.is_empty() {
        tracing::debug!("Partners already present, skipping demo data");
        return Ok(());
    }

    let demo = [
        ("7d994823-8226-4273-b063-1a95f3cc1df8", "Super Toys", true, 100),
        ("894b6e9b-eb5f-406c-aefa-8ccb35d39319", "Cat for Everyone", true, 0),
        ("0da65561-cf56-4942-bff2-22f50cf70d43", "Fish Your Master", false, 3),
    ];
    for (id, name, is_active, issued) in demo {
        repository
            .add(NewPartner {
                id: Some(id.to_string()),
                name: name.to_string(),
                is_active,
                number_issued_promo_codes: issued,
            })
            .await?;
    }

    // One running limit so the supersede path is visible straight away.
    let end_date = clock.now() + chrono::Duration::days(365);
    service
        .set_partner_limit(demo[0].0, SetPartnerLimitRequest { end_date, limit: 1000 })
        .await?;

    tracing::info!("Seeded {} demo partners", demo.len());
    Ok(())
}

//! Integration tests for the SQLite partner repository.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use promocode_core::errors::Error;
use promocode_core::partners::{
    cancel_limit, set_limit, LimitEffect, NewPartner, PartnerRepositoryTrait, PartnerService,
    PartnerServiceTrait, SetPartnerLimitRequest,
};
use promocode_core::FixedClock;
use promocode_storage_sqlite::partners::PartnerRepository;
use promocode_storage_sqlite::{create_pool, init, run_migrations, spawn_writer};
use tempfile::TempDir;

async fn setup() -> (TempDir, Arc<PartnerRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("test.db");
    let db_path = init(path.to_str().unwrap()).unwrap();
    let pool = create_pool(&db_path).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());
    (dir, Arc::new(PartnerRepository::new(pool, writer)))
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 30, 0)
        .unwrap()
}

fn new_partner(id: &str, is_active: bool, issued: i32) -> NewPartner {
    NewPartner {
        id: Some(id.to_string()),
        name: format!("Partner {id}"),
        is_active,
        number_issued_promo_codes: issued,
    }
}

fn request(limit: i32, end_date: NaiveDateTime) -> SetPartnerLimitRequest {
    SetPartnerLimitRequest { end_date, limit }
}

#[tokio::test]
async fn add_and_load_partner() {
    let (_dir, repo) = setup().await;

    let added = repo.add(new_partner("p1", true, 12)).await.unwrap();
    assert_eq!(added.id, "p1");
    assert!(added.limits.is_empty());

    let loaded = repo.get_by_id("p1").unwrap().unwrap();
    assert_eq!(loaded, added);
    assert!(repo.get_by_id("nope").unwrap().is_none());
}

#[tokio::test]
async fn add_generates_id_when_missing() {
    let (_dir, repo) = setup().await;

    let added = repo
        .add(NewPartner {
            id: None,
            name: "Anonymous".to_string(),
            is_active: true,
            number_issued_promo_codes: 0,
        })
        .await
        .unwrap();

    assert!(!added.id.is_empty());
    assert!(repo.get_by_id(&added.id).unwrap().is_some());
}

#[tokio::test]
async fn duplicate_partner_id_is_rejected() {
    let (_dir, repo) = setup().await;
    repo.add(new_partner("p1", true, 0)).await.unwrap();

    let err = repo.add(new_partner("p1", true, 0)).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn first_limit_is_persisted_without_touching_counter() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 9)).await.unwrap();

    let clock = FixedClock(at(2024, 5, 1, 8));
    let change = set_limit(&partner, &request(50, at(2024, 12, 31, 0)), &clock).unwrap();
    let stored = repo.update(change).await.unwrap();

    assert_eq!(stored.number_issued_promo_codes, 9);
    assert_eq!(stored.limits.len(), 1);
    assert_eq!(stored.limits[0].limit, 50);
    assert_eq!(stored.limits[0].end_date, at(2024, 12, 31, 0));
    assert_eq!(stored.limits[0].create_date, at(2024, 5, 1, 8));
    assert!(stored.limits[0].is_active());
}

#[tokio::test]
async fn superseding_a_limit_round_trips() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 0)).await.unwrap();

    let first = set_limit(
        &partner,
        &request(10, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 1, 10, 9)),
    )
    .unwrap();
    let partner = repo.update(first).await.unwrap();
    let old_id = partner.limits[0].id.clone();

    // Some codes were issued under the first limit.
    let partner = {
        let mut p = partner;
        p.number_issued_promo_codes = 5;
        p
    };

    let second = set_limit(
        &partner,
        &request(30, at(2025, 6, 30, 0)),
        &FixedClock(at(2024, 3, 2, 23)),
    )
    .unwrap();
    let new_id = second.created_limit_id().unwrap().to_string();
    repo.update(second).await.unwrap();

    let reloaded = repo.get_by_id("p1").unwrap().unwrap();
    assert_eq!(reloaded.number_issued_promo_codes, 0);
    assert_eq!(reloaded.limits.len(), 2);
    assert_eq!(reloaded.limits[0].id, old_id);
    assert_eq!(
        reloaded.limits[0].cancel_date,
        NaiveDate::from_ymd_opt(2024, 3, 2)
    );
    assert_eq!(reloaded.limits[1].id, new_id);
    let matching: Vec<_> = reloaded
        .limits
        .iter()
        .filter(|l| l.limit == 30 && l.end_date == at(2025, 6, 30, 0))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(reloaded.active_limit().unwrap().id, new_id);
}

#[tokio::test]
async fn limit_history_keeps_creation_order() {
    let (_dir, repo) = setup().await;
    let mut partner = repo.add(new_partner("p1", true, 0)).await.unwrap();

    let mut created = Vec::new();
    for (i, value) in [5, 15, 25, 35].into_iter().enumerate() {
        let clock = FixedClock(at(2024, 1, 1 + i as u32, 12));
        let change = set_limit(&partner, &request(value, at(2025, 1, 1, 0)), &clock).unwrap();
        created.push(change.created_limit_id().unwrap().to_string());
        partner = repo.update(change).await.unwrap();
    }

    let ids: Vec<_> = partner.limits.iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, created);
    assert_eq!(partner.active_limit_count(), 1);
    assert_eq!(partner.active_limit().unwrap().limit, 35);
}

#[tokio::test]
async fn stale_cancellation_is_a_conflict() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 0)).await.unwrap();
    let seeded = set_limit(
        &partner,
        &request(10, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 1, 1, 0)),
    )
    .unwrap();
    let partner = repo.update(seeded).await.unwrap();

    // Two requests computed from the same snapshot.
    let clock = FixedClock(at(2024, 2, 1, 0));
    let a = set_limit(&partner, &request(20, at(2024, 12, 31, 0)), &clock).unwrap();
    let b = set_limit(&partner, &request(30, at(2024, 12, 31, 0)), &clock).unwrap();

    repo.update(a).await.unwrap();
    let err = repo.update(b).await.unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    let reloaded = repo.get_by_id("p1").unwrap().unwrap();
    assert_eq!(reloaded.limits.len(), 2);
    assert_eq!(reloaded.active_limit_count(), 1);
    assert_eq!(reloaded.active_limit().unwrap().limit, 20);
}

#[tokio::test]
async fn concurrent_first_limits_conflict() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 3)).await.unwrap();

    let clock = FixedClock(at(2024, 2, 1, 0));
    let a = set_limit(&partner, &request(1, at(2024, 12, 31, 0)), &clock).unwrap();
    let b = set_limit(&partner, &request(2, at(2024, 12, 31, 0)), &clock).unwrap();

    repo.update(a).await.unwrap();
    let err = repo.update(b).await.unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert_eq!(repo.get_by_id("p1").unwrap().unwrap().limits.len(), 1);
}

#[tokio::test]
async fn failed_change_is_rolled_back() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 4)).await.unwrap();
    let seeded = set_limit(
        &partner,
        &request(10, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 1, 1, 0)),
    )
    .unwrap();
    let partner = repo.update(seeded).await.unwrap();

    let mut change = set_limit(
        &partner,
        &request(20, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 2, 1, 0)),
    )
    .unwrap();
    // A second cancellation of a limit that does not exist aborts the change.
    change.effects.insert(
        1,
        LimitEffect::LimitCancelled {
            limit_id: "ghost".to_string(),
            cancel_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        },
    );

    assert!(repo.update(change).await.is_err());

    let reloaded = repo.get_by_id("p1").unwrap().unwrap();
    assert_eq!(reloaded, partner);
    assert_eq!(reloaded.number_issued_promo_codes, 4);
    assert!(reloaded.limits[0].is_active());
}

#[tokio::test]
async fn cancel_change_keeps_counter() {
    let (_dir, repo) = setup().await;
    let partner = repo.add(new_partner("p1", true, 6)).await.unwrap();
    let seeded = set_limit(
        &partner,
        &request(10, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 1, 1, 0)),
    )
    .unwrap();
    let partner = repo.update(seeded).await.unwrap();

    let change = cancel_limit(&partner, &FixedClock(at(2024, 4, 4, 16))).unwrap();
    let stored = repo.update(change).await.unwrap();

    assert_eq!(stored.number_issued_promo_codes, 6);
    assert!(stored.active_limit().is_none());
    assert_eq!(
        stored.limits[0].cancel_date,
        NaiveDate::from_ymd_opt(2024, 4, 4)
    );
}

#[tokio::test]
async fn get_partners_groups_limits_by_partner() {
    let (_dir, repo) = setup().await;
    let a = repo.add(new_partner("a", true, 0)).await.unwrap();
    repo.add(new_partner("b", false, 0)).await.unwrap();

    let change = set_limit(
        &a,
        &request(7, at(2024, 12, 31, 0)),
        &FixedClock(at(2024, 1, 1, 0)),
    )
    .unwrap();
    repo.update(change).await.unwrap();

    let partners = repo.get_partners().unwrap();
    assert_eq!(partners.len(), 2);
    let a = partners.iter().find(|p| p.id == "a").unwrap();
    let b = partners.iter().find(|p| p.id == "b").unwrap();
    assert_eq!(a.limits.len(), 1);
    assert!(b.limits.is_empty());
    assert!(!b.is_active);
}

#[tokio::test]
async fn service_over_sqlite_end_to_end() {
    let (_dir, repo) = setup().await;
    let service = PartnerService::new(repo.clone(), Arc::new(FixedClock(at(2024, 7, 7, 7))));

    service
        .create_partner(new_partner("p1", true, 0))
        .await
        .unwrap();
    let first = service
        .set_partner_limit("p1", request(100, at(2024, 12, 31, 0)))
        .await
        .unwrap();
    let second = service
        .set_partner_limit("p1", request(200, at(2025, 12, 31, 0)))
        .await
        .unwrap();

    let old = service.get_partner_limit("p1", &first.id).unwrap();
    assert_eq!(old.cancel_date, NaiveDate::from_ymd_opt(2024, 7, 7));
    assert_eq!(
        service.get_partner("p1").unwrap().active_limit().unwrap().id,
        second.id
    );

    let cancelled = service.cancel_partner_limit("p1").await.unwrap().unwrap();
    assert_eq!(cancelled.id, second.id);
    assert_eq!(service.cancel_partner_limit("p1").await.unwrap(), None);
}

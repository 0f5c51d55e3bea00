use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, warn};
use std::sync::Arc;

use promocode_core::errors::{Error, Result};
use promocode_core::partners::{
    LimitChange, LimitEffect, NewPartner, Partner, PartnerError, PartnerRepositoryTrait,
};

use super::model::{NewPartnerDB, PartnerDB, PartnerPromoCodeLimitDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::partner_promo_code_limits as limits;
use crate::schema::partners;

/// Repository for partners and their limit history
pub struct PartnerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PartnerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PartnerRepository { pool, writer }
    }

    fn load_partner(conn: &mut SqliteConnection, partner_id: &str) -> Result<Option<Partner>> {
        let Some(partner_db) = partners::table
            .find(partner_id)
            .select(PartnerDB::as_select())
            .first::<PartnerDB>(conn)
            .optional()
            .into_core()?
        else {
            return Ok(None);
        };

        let limits_db = PartnerPromoCodeLimitDB::belonging_to(&partner_db)
            .select(PartnerPromoCodeLimitDB::as_select())
            .order(limits::sort_order.asc())
            .load::<PartnerPromoCodeLimitDB>(conn)
            .into_core()?;

        Ok(Some(partner_db.into_domain(limits_db)))
    }

    fn cancel_limit_row(
        conn: &mut SqliteConnection,
        partner_id: &str,
        limit_id: &str,
        cancel_date: chrono::NaiveDate,
    ) -> Result<()> {
        let affected = diesel::update(
            limits::table
                .filter(limits::id.eq(limit_id))
                .filter(limits::partner_id.eq(partner_id))
                .filter(limits::cancel_date.is_null()),
        )
        .set(limits::cancel_date.eq(Some(cancel_date)))
        .execute(conn)
        .into_core()?;

        if affected == 0 {
            warn!(
                "Partner {}: limit {} was already cancelled or removed",
                partner_id, limit_id
            );
            return Err(Error::ConstraintViolation(format!(
                "limit {} is no longer active",
                limit_id
            )));
        }
        Ok(())
    }

    fn insert_limit_row(
        conn: &mut SqliteConnection,
        partner: &Partner,
        limit_id: &str,
        replaces_active: bool,
    ) -> Result<()> {
        // Without a cancellation in the same change, the partner must still
        // have no active limit; otherwise another writer got there first.
        if !replaces_active {
            let active: i64 = limits::table
                .filter(limits::partner_id.eq(partner.id.as_str()))
                .filter(limits::cancel_date.is_null())
                .count()
                .get_result(conn)
                .into_core()?;
            if active > 0 {
                return Err(Error::ConstraintViolation(format!(
                    "partner {} already has an active limit",
                    partner.id
                )));
            }
        }

        let limit = partner.limit(limit_id).ok_or_else(|| {
            Error::Unexpected(format!("limit {} is not part of the partner state", limit_id))
        })?;

        let last: Option<i32> = limits::table
            .filter(limits::partner_id.eq(partner.id.as_str()))
            .select(diesel::dsl::max(limits::sort_order))
            .get_result(conn)
            .into_core()?;
        let row = PartnerPromoCodeLimitDB::from_domain(limit, last.map_or(0, |n| n + 1));

        diesel::insert_into(limits::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        Ok(())
    }
}

#[async_trait]
impl PartnerRepositoryTrait for PartnerRepository {
    fn get_partners(&self) -> Result<Vec<Partner>> {
        let mut conn = get_connection(&self.pool)?;

        let partners_db = partners::table
            .select(PartnerDB::as_select())
            .order(partners::name.asc())
            .load::<PartnerDB>(&mut conn)
            .into_core()?;

        let limits_db = PartnerPromoCodeLimitDB::belonging_to(&partners_db)
            .select(PartnerPromoCodeLimitDB::as_select())
            .order(limits::sort_order.asc())
            .load::<PartnerPromoCodeLimitDB>(&mut conn)
            .into_core()?;

        let grouped = limits_db.grouped_by(&partners_db);
        Ok(partners_db
            .into_iter()
            .zip(grouped)
            .map(|(partner, limits)| partner.into_domain(limits))
            .collect())
    }

    fn get_by_id(&self, partner_id: &str) -> Result<Option<Partner>> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_partner(&mut conn, partner_id)
    }

    async fn add(&self, new_partner: NewPartner) -> Result<Partner> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Partner> {
                let row: NewPartnerDB = new_partner.into();
                let stored = diesel::insert_into(partners::table)
                    .values(&row)
                    .returning(PartnerDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(stored.into_domain(Vec::new()))
            })
            .await
    }

    async fn update(&self, change: LimitChange) -> Result<Partner> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Partner> {
                let replaces_active = change.cancelled_limit_id().is_some();
                let LimitChange { partner, effects } = change;

                for effect in &effects {
                    match effect {
                        LimitEffect::LimitCancelled {
                            limit_id,
                            cancel_date,
                        } => {
                            Self::cancel_limit_row(conn, &partner.id, limit_id, *cancel_date)?;
                        }
                        LimitEffect::IssuedCounterReset => {
                            diesel::update(partners::table.find(partner.id.as_str()))
                                .set(
                                    partners::number_issued_promo_codes
                                        .eq(partner.number_issued_promo_codes),
                                )
                                .execute(conn)
                                .into_core()?;
                        }
                        LimitEffect::LimitCreated { limit_id } => {
                            Self::insert_limit_row(conn, &partner, limit_id, replaces_active)?;
                        }
                    }
                }
                debug!(
                    "Partner {}: applied {} limit effect(s)",
                    partner.id,
                    effects.len()
                );

                Self::load_partner(conn, &partner.id)?
                    .ok_or_else(|| PartnerError::NotFound(partner.id.clone()).into())
            })
            .await
    }
}

use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{PartnerPromoCodeLimitResponse, PartnerResponse, SetPartnerPromoCodeLimitRequest},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use promocode_core::{errors::Error as CoreError, partners::SetPartnerLimitRequest};

/// List all partners together with their limit history.
#[utoipa::path(
    get,
    path = "/api/v1/partners",
    tag = "partners",
    responses((status = 200, description = "All partners", body = [PartnerResponse]))
)]
pub async fn get_partners(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PartnerResponse>>> {
    let partners = state.partner_service.get_partners()?;
    Ok(Json(partners.into_iter().map(PartnerResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/{id}",
    tag = "partners",
    params(("id" = String, Path, description = "Partner id")),
    responses(
        (status = 200, description = "The partner", body = PartnerResponse),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn get_partner(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PartnerResponse>> {
    let partner = state.partner_service.get_partner(&id)?;
    Ok(Json(partner.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/{id}/limits/{limit_id}",
    tag = "partners",
    params(
        ("id" = String, Path, description = "Partner id"),
        ("limit_id" = String, Path, description = "Limit id")
    ),
    responses(
        (status = 200, description = "The limit", body = PartnerPromoCodeLimitResponse),
        (status = 404, description = "Partner or limit not found")
    )
)]
pub async fn get_partner_limit(
    Path((id, limit_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PartnerPromoCodeLimitResponse>> {
    let limit = state.partner_service.get_partner_limit(&id, &limit_id)?;
    Ok(Json(limit.into()))
}

/// Set a new promo-code limit, superseding the partner's active one.
///
/// Responds with `201 Created` and a `Location` pointing at the new limit.
#[utoipa::path(
    post,
    path = "/api/v1/partners/{id}/limits",
    tag = "partners",
    params(("id" = String, Path, description = "Partner id")),
    request_body = SetPartnerPromoCodeLimitRequest,
    responses(
        (status = 201, description = "Limit created", body = PartnerPromoCodeLimitResponse),
        (status = 400, description = "Malformed body, partner not active or limit not positive"),
        (status = 404, description = "Partner not found"),
        (status = 409, description = "Partner limits changed concurrently")
    )
)]
pub async fn set_partner_promo_code_limit(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetPartnerPromoCodeLimitRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let request = SetPartnerLimitRequest::try_from(payload).map_err(CoreError::from)?;
    let limit = state.partner_service.set_partner_limit(&id, request).await?;
    let location = format!("/api/v1/partners/{}/limits/{}", id, limit.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PartnerPromoCodeLimitResponse::from(limit)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/partners/{id}/canceledLimits",
    tag = "partners",
    params(("id" = String, Path, description = "Partner id")),
    responses(
        (status = 204, description = "Active limit cancelled, or there was none"),
        (status = 400, description = "Partner is not active"),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn cancel_partner_promo_code_limit(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.partner_service.cancel_partner_limit(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/partners", get(get_partners))
        .route("/partners/{id}", get(get_partner))
        .route("/partners/{id}/limits", post(set_partner_promo_code_limit))
        .route("/partners/{id}/limits/{limit_id}", get(get_partner_limit))
        .route(
            "/partners/{id}/canceledLimits",
            post(cancel_partner_promo_code_limit),
        )
}

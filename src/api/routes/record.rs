//! Record Routes
//!
//! JSON mirror of the page controls, sharing the caller's session.
//!
//! - GET /api/v1/record - Session record with derived values
//! - POST /api/v1/water - Add 200 or 500 ml
//! - POST /api/v1/vitamins/:index/take - Mark a vitamin taken today
//! - POST /api/v1/refresh - Re-fetch the record
//!
//! A failed save returns an error but, as on the page, the mutation stays
//! in the session until the next refresh.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::{AddWaterRequest, RecordResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::session::{Session, SessionCookie, SessionHandle};
use crate::api::state::AppState;
use crate::record::WaterPortion;

/// GET /api/v1/record
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> ApiResult<(SessionCookie, Json<RecordResponse>)> {
    let mut session = handle.session.lock().await;
    session.ensure_loaded(state.store()).await?;

    Ok((handle.cookie(), Json(respond(&session)?)))
}

/// POST /api/v1/water
pub async fn add_water(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
    Json(req): Json<AddWaterRequest>,
) -> ApiResult<(SessionCookie, Json<RecordResponse>)> {
    let portion = WaterPortion::try_from(req.amount)?;

    let mut session = handle.session.lock().await;
    session
        .add_water(state.store(), portion, &Local::now())
        .await?;

    tracing::info!(amount = portion.ml(), "Water logged");
    Ok((handle.cookie(), Json(respond(&session)?)))
}

/// POST /api/v1/vitamins/:index/take
pub async fn take_vitamin(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
    Path(index): Path<usize>,
) -> ApiResult<(SessionCookie, Json<RecordResponse>)> {
    let mut session = handle.session.lock().await;
    session
        .take_vitamin(state.store(), index, &Local::now())
        .await?;

    tracing::info!(index, "Vitamin marked taken");
    Ok((handle.cookie(), Json(respond(&session)?)))
}

/// POST /api/v1/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> ApiResult<(SessionCookie, Json<RecordResponse>)> {
    let mut session = handle.session.lock().await;
    session.refresh(state.store()).await?;

    Ok((handle.cookie(), Json(respond(&session)?)))
}

fn respond(session: &Session) -> ApiResult<RecordResponse> {
    let record = session.record.as_ref().ok_or(ApiError::RecordUnavailable)?;
    Ok(RecordResponse::new(record, &Local::now()))
}

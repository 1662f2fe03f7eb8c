//! Page Routes
//!
//! The HTML page and the form posts behind its buttons.
//!
//! - GET / - Render the page
//! - POST /water - Add 200 or 500 ml
//! - POST /vitamins/:index/take - Mark a vitamin taken today
//! - POST /refresh - Re-fetch the record
//!
//! Every post answers with a redirect to `/`. Failures never abort the
//! request, a body the form extractor rejects included: they are queued as
//! notices and shown by the next render.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{Html, Redirect},
    Form,
};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::AddWaterRequest;
use crate::api::render::{self, PageView};
use crate::api::session::{InteractionError, Notice, Session, SessionCookie, SessionHandle};
use crate::api::state::AppState;
use crate::record::WaterPortion;

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> (SessionCookie, Html<String>) {
    let mut session = handle.session.lock().await;

    if let Err(e) = session.ensure_loaded(state.store()).await {
        queue_failure(&mut session, e);
    }

    let notices = session.take_notices();
    let html = render::page(&PageView {
        record: session.record.as_ref(),
        notices: &notices,
        store_error: state.store_error.as_deref(),
        now: Local::now(),
    });

    (handle.cookie(), Html(html))
}

/// POST /water
pub async fn add_water(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
    form: Result<Form<AddWaterRequest>, FormRejection>,
) -> (SessionCookie, Redirect) {
    let mut session = handle.session.lock().await;

    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected water form");
            session.notify(Notice::error(format!(
                "Geçersiz miktar: {}",
                rejection.body_text()
            )));
            return (handle.cookie(), Redirect::to("/"));
        }
    };

    let result = match WaterPortion::try_from(form.amount) {
        Ok(portion) => {
            session
                .add_water(state.store(), portion, &Local::now())
                .await
        }
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        queue_failure(&mut session, e);
    }

    (handle.cookie(), Redirect::to("/"))
}

/// POST /vitamins/:index/take
pub async fn take_vitamin(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
    Path(index): Path<usize>,
) -> (SessionCookie, Redirect) {
    let mut session = handle.session.lock().await;

    if let Err(e) = session
        .take_vitamin(state.store(), index, &Local::now())
        .await
    {
        queue_failure(&mut session, e);
    }

    (handle.cookie(), Redirect::to("/"))
}

/// POST /refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> (SessionCookie, Redirect) {
    let mut session = handle.session.lock().await;

    if let Err(e) = session.refresh(state.store()).await {
        queue_failure(&mut session, e);
    }

    (handle.cookie(), Redirect::to("/"))
}

fn queue_failure(session: &mut Session, err: InteractionError) {
    let message = match &err {
        InteractionError::Load(e) => format!("Bağlantı hatası: {}", e),
        InteractionError::Save(e) => format!("Kayıt hatası: {}", e),
        // the warning banner already covers a missing record
        InteractionError::NotLoaded => return,
        InteractionError::Record(e) => e.to_string(),
    };
    session.notify(Notice::error(message));
}

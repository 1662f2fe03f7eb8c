//! Browser Sessions
//!
//! Each browser gets its own in-memory copy of the record, identified by the
//! `sid` cookie. Once loaded, the copy is only replaced by an explicit
//! refresh, so an optimistic mutation whose save failed stays visible until
//! the user refreshes. A session without a record retries the load on its
//! next interaction.
//!
//! A session sits behind an async mutex that handlers hold for the whole
//! interaction, network round-trip included.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::record::{Record, RecordError, WaterPortion};
use crate::store::{RecordStore, StoreError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sid";

/// Severity of a notice shown on the next render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

/// One-shot message for the page
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Why an interaction did not complete
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("Record is not loaded")]
    NotLoaded,

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Load failed: {0}")]
    Load(StoreError),

    #[error("Save failed: {0}")]
    Save(StoreError),
}

/// One browser's view of the record
#[derive(Debug, Default)]
pub struct Session {
    /// Cached record; `None` before the first load or after a failed one
    pub record: Option<Record>,
    notices: Vec<Notice>,
}

impl Session {
    /// Load the record unless a copy is already cached
    pub async fn ensure_loaded(
        &mut self,
        store: Option<&dyn RecordStore>,
    ) -> Result<(), InteractionError> {
        if self.record.is_some() {
            return Ok(());
        }
        self.refresh(store).await
    }

    /// Drop the cached record and fetch it again
    pub async fn refresh(&mut self, store: Option<&dyn RecordStore>) -> Result<(), InteractionError> {
        self.record = None;

        let store = store.ok_or(InteractionError::Load(StoreError::NotConnected))?;
        match store.load().await {
            Ok(record) => {
                tracing::debug!(store = %store.describe(), "Record loaded");
                self.record = Some(record);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(store = %store.describe(), error = %e, "Record load failed");
                Err(InteractionError::Load(e))
            }
        }
    }

    /// Log a drink and write the record back
    pub async fn add_water(
        &mut self,
        store: Option<&dyn RecordStore>,
        portion: WaterPortion,
        now: &DateTime<Local>,
    ) -> Result<(), InteractionError> {
        self.ensure_loaded(store).await?;
        let record = self.record.as_mut().ok_or(InteractionError::NotLoaded)?;
        record.add_water(portion, now);
        self.persist(store).await
    }

    /// Mark a vitamin as taken today and write the record back
    pub async fn take_vitamin(
        &mut self,
        store: Option<&dyn RecordStore>,
        index: usize,
        now: &DateTime<Local>,
    ) -> Result<(), InteractionError> {
        self.ensure_loaded(store).await?;
        let record = self.record.as_mut().ok_or(InteractionError::NotLoaded)?;
        record.mark_vitamin_taken(index, now)?;
        self.persist(store).await
    }

    // The in-memory mutation is kept even when the save fails.
    async fn persist(&self, store: Option<&dyn RecordStore>) -> Result<(), InteractionError> {
        let Some(record) = &self.record else {
            return Err(InteractionError::NotLoaded);
        };
        let store = store.ok_or(InteractionError::Save(StoreError::NotConnected))?;

        store.save(record).await.map_err(|e| {
            tracing::warn!(store = %store.describe(), error = %e, "Record save failed");
            InteractionError::Save(e)
        })
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Notices queued since the last render
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// All live sessions, keyed by cookie id
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionSlot>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    /// `max_sessions` below one is treated as one
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Find the session for `requested`, or start a new one.
    ///
    /// Starting a session also drops every session idle past the TTL, then
    /// evicts the least recently seen ones until there is room under the cap.
    pub async fn resolve(&self, requested: Option<Uuid>) -> SessionHandle {
        let now = Instant::now();
        let ttl = self.idle_ttl;
        let mut sessions = self.sessions.lock().await;

        if let Some(id) = requested {
            if let Some(slot) = sessions.get_mut(&id) {
                if now.duration_since(slot.last_seen) < ttl {
                    slot.last_seen = now;
                    return SessionHandle {
                        id,
                        session: Arc::clone(&slot.session),
                        is_new: false,
                    };
                }
            }
        }

        let before = sessions.len();
        sessions.retain(|_, slot| now.duration_since(slot.last_seen) < ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Dropped idle sessions");
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    tracing::debug!(session_id = %id, "Evicted session at capacity");
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::default()));
        sessions.insert(
            id,
            SessionSlot {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        tracing::debug!(session_id = %id, "Started session");

        SessionHandle {
            id,
            session,
            is_new: true,
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Extracted per request: the caller's session
pub struct SessionHandle {
    pub id: Uuid,
    pub session: Arc<Mutex<Session>>,
    is_new: bool,
}

impl SessionHandle {
    /// Cookie to send back; empty unless the session was just created
    pub fn cookie(&self) -> SessionCookie {
        SessionCookie(self.is_new.then_some(self.id))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionHandle {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let requested = session_id_from_headers(&parts.headers);
        Ok(state.sessions.resolve(requested).await)
    }
}

/// Read the session id out of the `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` for a freshly created session
pub struct SessionCookie(Option<Uuid>);

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(id) = self.0 {
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                res.headers_mut().append(SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

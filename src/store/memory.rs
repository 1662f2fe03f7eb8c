//! In-memory store used by the web layer tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{RecordStore, StoreError, StoreResult};
use crate::record::Record;

/// Holds the record in a mutex; loads and saves can be made to fail
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<Record>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with_record(record: Record) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Option<Record> {
        self.record.lock().unwrap().clone()
    }

    /// Replace the stored record behind the sessions' backs
    pub fn put(&self, record: Record) {
        *self.record.lock().unwrap() = Some(record);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self) -> StoreResult<Record> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.record
            .lock()
            .unwrap()
            .clone()
            .ok_or(StoreError::RecordNotFound(1))
    }

    async fn save(&self, record: &Record) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "backend down".to_string(),
            });
        }
        *self.record.lock().unwrap() = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

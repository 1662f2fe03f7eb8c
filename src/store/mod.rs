//! State Store Adapter
//!
//! Owns the one row that holds the record. The web layer only sees the
//! `RecordStore` trait; `connect` builds the Supabase-backed implementation
//! from the resolved credentials.
//!
//! ## Data Flow
//!
//! 1. `connect` resolves credentials (environment first, config file second)
//! 2. `load` fetches the `data` column of the fixed row
//! 3. `save` overwrites that column with the mutated record
//!
//! There is no retry and no versioning: concurrent writers overwrite each
//! other and the last write wins.

mod error;
#[cfg(test)]
pub(crate) mod memory;
mod supabase;

pub use error::{StoreError, StoreResult};
pub use supabase::{SupabaseConfig, SupabaseStore};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::record::Record;

/// Read-modify-write access to the single tracked record
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Human-readable location of the record, for logs
    fn describe(&self) -> String;

    /// Fetch the record
    async fn load(&self) -> StoreResult<Record>;

    /// Overwrite the stored record
    async fn save(&self, record: &Record) -> StoreResult<()>;
}

/// Errors raised while opening the store
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve credentials and open the store handle.
///
/// Called once at startup; the handle is shared for the life of the process.
pub fn connect(config: &Config) -> Result<Arc<dyn RecordStore>, ConnectError> {
    let credentials = config.credentials()?;
    tracing::info!(
        source = %credentials.source,
        url = %credentials.url,
        "Resolved store credentials"
    );

    let store = SupabaseStore::new(SupabaseConfig::new(&credentials, &config.store))?;
    Ok(Arc::new(store))
}

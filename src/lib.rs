//! # Health Assistant
//!
//! Personal water intake and vitamin tracker. The whole state is one JSON
//! record kept in a Supabase table; this crate loads it, applies the changes
//! made on a small web page, and writes it back.
//!
//! ## Modules
//!
//! - [`record`]: The tracked record and its mutations
//! - [`store`]: Remote table access (load / save of the fixed row)
//! - [`api`]: Web page, JSON API and health probes with Axum
//! - [`config`]: TOML configuration, environment overrides, credentials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use health_assistant::record::WaterPortion;
//! use health_assistant::{store, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default().config;
//!     let store = store::connect(&config)?;
//!
//!     let mut record = store.load().await?;
//!     record.add_water(WaterPortion::Glass, &chrono::Local::now());
//!     store.save(&record).await?;
//!
//!     println!("{} / {} ml", record.water_consumed_ml, record.water_target_ml);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod record;
pub mod store;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, CredentialSource, Credentials, LoadedConfig};

pub use record::{Record, RecordError, Vitamin, WaterPortion};

pub use store::{connect, ConnectError, RecordStore, StoreError, StoreResult, SupabaseStore};

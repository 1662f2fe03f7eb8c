//! Supabase REST Client
//!
//! Reads and writes the `data` column of one row through the PostgREST
//! endpoint that Supabase exposes under `/rest/v1`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use super::RecordStore;
use crate::config::{Credentials, StoreConfig};
use crate::record::Record;

/// Configuration for the Supabase client
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "https://abc.supabase.co")
    pub base_url: String,
    /// Anon or service key
    pub api_key: String,
    /// Table holding the record
    pub table: String,
    /// Primary key of the record row
    pub record_id: i64,
    /// Per-request timeout, none by default
    pub request_timeout: Option<std::time::Duration>,
}

impl SupabaseConfig {
    pub fn new(credentials: &Credentials, store: &StoreConfig) -> Self {
        Self {
            base_url: credentials.url.trim_end_matches('/').to_string(),
            api_key: credentials.key.clone(),
            table: store.table.clone(),
            record_id: store.record_id,
            request_timeout: store.request_timeout(),
        }
    }
}

/// PostgREST-backed record store
pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    /// Create a new client with the given configuration
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url,
            urlencoding::encode(&self.config.table)
        )
    }

    fn row_filter(&self) -> String {
        format!("eq.{}", self.config.record_id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check_status(response: Response) -> StoreResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(StoreError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    fn describe(&self) -> String {
        format!(
            "{} (table {}, id {})",
            self.config.base_url, self.config.table, self.config.record_id
        )
    }

    async fn load(&self) -> StoreResult<Record> {
        let filter = self.row_filter();
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "data"), ("id", filter.as_str())]);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(StoreError::from_transport)?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await.map_err(StoreError::from_transport)?;
        let rows: Vec<DataRow> = serde_json::from_slice(&body)?;

        let row = rows
            .into_iter()
            .next()
            .ok_or(StoreError::RecordNotFound(self.config.record_id))?;

        Ok(serde_json::from_value(row.data)?)
    }

    async fn save(&self, record: &Record) -> StoreResult<()> {
        let filter = self.row_filter();
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&DataUpdate { data: record });

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(StoreError::from_transport)?;
        Self::check_status(response).await?;

        Ok(())
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct DataRow {
    data: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct DataUpdate<'a> {
    data: &'a Record,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Rows of the fake table, keyed by id
    type Rows = Arc<Mutex<HashMap<i64, Value>>>;

    const KEY: &str = "test-key";

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(KEY)
            && headers.get("authorization").and_then(|v| v.to_str().ok())
                == Some("Bearer test-key")
    }

    fn requested_id(params: &HashMap<String, String>) -> Option<i64> {
        params.get("id")?.strip_prefix("eq.")?.parse().ok()
    }

    async fn select_rows(
        State(rows): State<Rows>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let id = requested_id(&params).ok_or(StatusCode::BAD_REQUEST)?;
        let rows = rows.lock().unwrap();
        let found: Vec<Value> = rows
            .get(&id)
            .map(|data| json!({ "data": data }))
            .into_iter()
            .collect();
        Ok(Json(Value::Array(found)))
    }

    async fn update_row(
        State(rows): State<Rows>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        let Some(id) = requested_id(&params) else {
            return StatusCode::BAD_REQUEST;
        };
        if let Some(row) = rows.lock().unwrap().get_mut(&id) {
            *row = body["data"].clone();
        }
        StatusCode::NO_CONTENT
    }

    /// Serve a minimal PostgREST stand-in on a random local port
    async fn spawn_backend(rows: Rows) -> String {
        spawn_slow_backend(rows, Duration::ZERO).await
    }

    /// Same stand-in, but reads stall for `delay` before answering
    async fn spawn_slow_backend(rows: Rows, delay: Duration) -> String {
        let select = move |state: State<Rows>,
                           headers: HeaderMap,
                           query: Query<HashMap<String, String>>| async move {
            tokio::time::sleep(delay).await;
            select_rows(state, headers, query).await
        };
        let app = Router::new()
            .route("/rest/v1/user_settings", get(select).patch(update_row))
            .with_state(rows);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn store_for(base_url: &str, key: &str) -> SupabaseStore {
        store_with(base_url, key, StoreConfig::default())
    }

    fn store_with(base_url: &str, key: &str, store: StoreConfig) -> SupabaseStore {
        let credentials = Credentials {
            url: format!("{}/", base_url),
            key: key.to_string(),
            source: CredentialSource::Environment,
        };
        SupabaseStore::new(SupabaseConfig::new(&credentials, &store)).unwrap()
    }

    fn seeded_rows() -> Rows {
        let mut rows = HashMap::new();
        rows.insert(
            1,
            json!({
                "su_icilen": 800,
                "su_hedef": 2000,
                "vitaminler": [{"isim": "D3", "saat": "09:00"}],
                "not": "kept"
            }),
        );
        Arc::new(Mutex::new(rows))
    }

    #[test]
    fn test_config_from_credentials() {
        let credentials = Credentials {
            url: "https://abc.supabase.co/".to_string(),
            key: KEY.to_string(),
            source: CredentialSource::ConfigFile,
        };
        let config = SupabaseConfig::new(&credentials, &StoreConfig::default());

        assert_eq!(config.base_url, "https://abc.supabase.co");
        assert_eq!(config.table, "user_settings");
        assert_eq!(config.record_id, 1);
        assert!(config.request_timeout.is_none());

        let store = SupabaseStore::new(config).unwrap();
        assert_eq!(store.table_url(), "https://abc.supabase.co/rest/v1/user_settings");
        assert_eq!(store.row_filter(), "eq.1");
    }

    #[tokio::test]
    async fn test_load_record() {
        let base_url = spawn_backend(seeded_rows()).await;
        let store = store_for(&base_url, KEY);

        let record = store.load().await.unwrap();
        assert_eq!(record.water_consumed_ml, 800);
        assert_eq!(record.vitamins[0].name, "D3");
    }

    #[tokio::test]
    async fn test_save_round_trips_through_backend() {
        let rows = seeded_rows();
        let base_url = spawn_backend(Arc::clone(&rows)).await;
        let store = store_for(&base_url, KEY);

        let mut record = store.load().await.unwrap();
        record.water_consumed_ml += 200;
        store.save(&record).await.unwrap();

        let stored = rows.lock().unwrap().get(&1).cloned().unwrap();
        assert_eq!(stored["su_icilen"], 1000);
        assert_eq!(stored["not"], "kept");
    }

    #[tokio::test]
    async fn test_missing_row() {
        let base_url = spawn_backend(Arc::new(Mutex::new(HashMap::new()))).await;
        let store = store_for(&base_url, KEY);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound(1)));
    }

    #[tokio::test]
    async fn test_malformed_row() {
        let mut rows = HashMap::new();
        rows.insert(1, json!({"su_hedef": "lots"}));
        let base_url = spawn_backend(Arc::new(Mutex::new(rows))).await;
        let store = store_for(&base_url, KEY);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let base_url = spawn_backend(seeded_rows()).await;
        let store = store_for(&base_url, "wrong-key");

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 401, .. }));

        let err = store.save(&Record::new(2000)).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = store_for(&format!("http://{}", addr), KEY);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_backend_hits_configured_timeout() {
        let base_url = spawn_slow_backend(seeded_rows(), Duration::from_secs(3)).await;
        let store = store_with(
            &base_url,
            KEY,
            StoreConfig {
                request_timeout_secs: Some(1),
                ..StoreConfig::default()
            },
        );
        assert_eq!(store.config().request_timeout, Some(Duration::from_secs(1)));

        let started = std::time::Instant::now();
        let err = store.load().await.unwrap_err();

        assert!(matches!(err, StoreError::Timeout), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_no_timeout_by_default() {
        let base_url = spawn_slow_backend(seeded_rows(), Duration::from_millis(1500)).await;
        let store = store_for(&base_url, KEY);
        assert!(store.config().request_timeout.is_none());

        let record = store.load().await.unwrap();
        assert_eq!(record.water_consumed_ml, 800);
    }
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use formsheet::clock::{Clock, SystemClock};
use formsheet::config::{Config, RecaptchaConfig, StorageBackend, SubmissionPolicy};
use formsheet::models::PersistedRow;
use formsheet::state::AppState;
use formsheet::store::{self, MemoryStore, Sheet, SheetStore};

pub const SHEET: &str = "Submissions";

/// A running test server backed by an in-memory sheet.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub sheet: Sheet,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit JSON, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/v1/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/v1/submit"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn rows(&self) -> Vec<PersistedRow> {
        self.store
            .read_all_rows(&self.sheet)
            .await
            .expect("read rows failed")
    }

    pub async fn seed(&self, row: PersistedRow) {
        self.store
            .append_row(&self.sheet, &row)
            .await
            .expect("seed row failed");
    }
}

pub fn test_config(recaptcha: RecaptchaConfig) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: 16 * 1024,
        cors_origins: vec![],
        log_level: "warn".to_string(),
        storage: StorageBackend::Memory,
        sheet_name: SHEET.to_string(),
        policy: SubmissionPolicy::default(),
        recaptcha,
    }
}

pub fn recaptcha_at(url: &str) -> RecaptchaConfig {
    RecaptchaConfig {
        secret: Some("test-secret".to_string()),
        min_score: 0.5,
        verify_url: url.to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(RecaptchaConfig::disabled())).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    spawn_app_with_clock(config, Arc::new(SystemClock)).await
}

pub async fn spawn_app_with_clock(config: Config, clock: Arc<dyn Clock>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let sheet = store::setup_sheet(store.as_ref(), &config.sheet_name)
        .await
        .expect("Failed to set up sheet");

    let state = AppState::new(config, store.clone(), clock)
        .expect("Failed to build app state");
    let app = formsheet::build_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        store,
        sheet,
        client: Client::new(),
    }
}

//! Common test utilities for E2E tests

#![allow(dead_code)]

use apcollections::data::{Activity, ActivityStore, ReferenceType};
use apcollections::{AppState, config};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use url::Url;

pub const SERVICE_IRI: &str = "https://example1.com/services/orb";
pub const OBJECT_ID: &str = "d607506e-6964-4991-a19f-674952380760";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server backed by the in-memory store
    pub async fn new() -> Self {
        Self::with_backend(config::StoreBackend::Memory).await
    }

    /// Create a new test server with the given store backend
    pub async fn with_backend(backend: config::StoreBackend) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "example1.com".to_string(),
                protocol: "https".to_string(),
            },
            database: config::DatabaseConfig {
                backend,
                path: db_path,
            },
            activitypub: config::ActivityPubConfig {
                service_path: "/services/orb".to_string(),
                objects_path: "/transactions".to_string(),
                page_size: 4,
                max_body_bytes: 64 * 1024,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        apcollections::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = apcollections::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// GET a path and decode the JSON body, asserting a 200
    pub async fn get_json(&self, path: &str) -> Value {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 200, "GET {path}");
        response.json().await.unwrap()
    }

    /// Add `count` Create activities to the outbox, oldest first
    pub async fn seed_outbox(&self, count: usize) {
        let service_iri = Url::parse(SERVICE_IRI).unwrap();
        let store = &self.state.activity_store;

        for i in 0..count {
            let activity = create_activity(i);
            store.add_activity(&activity).await.unwrap();
            store
                .add_reference(ReferenceType::Outbox, &service_iri, &activity.id)
                .await
                .unwrap();
        }
    }

    /// Add `count` Announce activities as shares of `OBJECT_ID`, oldest first
    pub async fn seed_shares(&self, count: usize) {
        let object_iri = Url::parse(&transactions_iri(OBJECT_ID)).unwrap();
        let store = &self.state.activity_store;

        for i in 0..count {
            let activity = announce_activity(i);
            store.add_activity(&activity).await.unwrap();
            store
                .add_reference(ReferenceType::Share, &object_iri, &activity.id)
                .await
                .unwrap();
        }
    }
}

pub fn transactions_iri(object_id: &str) -> String {
    format!("https://example1.com/transactions/{object_id}")
}

pub fn create_activity_id(i: usize) -> String {
    format!("https://example1.com/activities/activity_{i}")
}

pub fn announce_activity_id(i: usize) -> String {
    format!("https://example{i}.com/activities/announce_activity_{i}")
}

pub fn create_activity(i: usize) -> Activity {
    Activity::new(Url::parse(&create_activity_id(i)).unwrap(), "Create").with_object(
        serde_json::json!({
            "@context": [
                "https://www.w3.org/ns/activitystreams",
                "https://trustbloc.github.io/Context/orb-v1.json"
            ],
            "id": format!("https://example1.com/obj_{i}"),
            "target": {
                "id": "https://example.com/cas/bafkd34G7hD6gbj94fnKm5D",
                "cid": "bafkd34G7hD6gbj94fnKm5D",
                "type": "ContentAddressedStorage"
            },
            "type": "AnchorCredentialReference"
        }),
    )
}

pub fn announce_activity(i: usize) -> Activity {
    let id = announce_activity_id(i);
    Activity::new(Url::parse(&id).unwrap(), "Announce").with_object(Value::String(id))
}

/// JSON of the stored Create activity `i`
pub fn create_activity_json(i: usize) -> Value {
    serde_json::to_value(create_activity(i)).unwrap()
}

/// JSON of share `i` as rendered in a shares page
pub fn share_json(i: usize) -> Value {
    let id = announce_activity_id(i);
    serde_json::json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "id": id,
        "object": id,
        "type": "Announce"
    })
}

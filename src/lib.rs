//! apcollections - paginated ActivityPub collections and accept lists
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - outbox / inbox / shares / likes collections              │
//! │  - accept list read/write                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Collection resolvers                                     │
//! │  - Paging and document building                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - Store traits                                             │
//! │  - In-memory store / SQLite (sqlx)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Paging, resolution and document rendering
//! - `data`: Store traits and implementations
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

use service::{CollectionResolver, Marshaller};

/// The resolvers for every collection served by this instance
#[derive(Debug, Clone)]
pub struct Collections {
    pub outbox: CollectionResolver,
    pub inbox: CollectionResolver,
    pub shares: CollectionResolver,
    pub likes: CollectionResolver,
}

impl Collections {
    /// Derive resolvers from the configured service and object IRIs
    pub fn from_config(config: &config::AppConfig) -> Result<Self, error::AppError> {
        let service_iri = config
            .activitypub
            .service_iri(&config.server)
            .map_err(|e| error::AppError::Config(format!("invalid service IRI: {e}")))?;
        let objects_iri = config
            .activitypub
            .objects_iri(&config.server)
            .map_err(|e| error::AppError::Config(format!("invalid objects IRI: {e}")))?;

        Ok(Self {
            outbox: CollectionResolver::Outbox {
                service_iri: service_iri.clone(),
            },
            inbox: CollectionResolver::Inbox { service_iri },
            shares: CollectionResolver::Shares {
                objects_iri: objects_iri.clone(),
            },
            likes: CollectionResolver::Likes { objects_iri },
        })
    }
}

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the stores and collection resolvers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Activities and collection references
    pub activity_store: Arc<dyn data::ActivityStore>,

    /// Accept lists
    pub accept_list_store: Arc<dyn data::AcceptListStore>,

    pub collections: Arc<Collections>,

    /// Response body serializer
    pub marshal: Marshaller,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Open the configured store backend
    /// 2. Derive collection resolvers
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        match config.database.backend {
            config::StoreBackend::Memory => {
                let store = Arc::new(data::MemoryStore::new());
                tracing::info!("Using in-memory store");
                Self::with_stores(config, store.clone(), store)
            }
            config::StoreBackend::Sqlite => {
                let db = Arc::new(data::Database::connect(&config.database.path).await?);
                tracing::info!("Database connected");
                Self::with_stores(config, db.clone(), db)
            }
        }
    }

    /// Build state around externally constructed stores
    pub fn with_stores(
        config: config::AppConfig,
        activity_store: Arc<dyn data::ActivityStore>,
        accept_list_store: Arc<dyn data::AcceptListStore>,
    ) -> Result<Self, error::AppError> {
        let collections = Collections::from_config(&config)?;

        tracing::info!(
            outbox = ?collections.outbox,
            shares = ?collections.shares,
            page_size = config.activitypub.page_size,
            "Application state initialized successfully"
        );

        Ok(Self {
            config: Arc::new(config),
            activity_store,
            accept_list_store,
            collections: Arc::new(collections),
            marshal: service::marshal_json,
        })
    }

    /// Replace the response body serializer
    pub fn with_marshaller(mut self, marshal: Marshaller) -> Self {
        self.marshal = marshal;
        self
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{
        compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    let cors_layer = build_cors_layer(&state.config.server);
    let activitypub = &state.config.activitypub;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::activitypub_router(activitypub))
        .merge(api::acceptlist_router(activitypub))
        .layer(RequestBodyLimitLayer::new(activitypub.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

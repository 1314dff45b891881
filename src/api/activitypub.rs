//! ActivityPub collection endpoints
//!
//! - Outbox / Inbox of the service actor
//! - Shares / Likes of an object
//!
//! All four are served by [`handle_collection`], parameterized by the
//! collection's resolver.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use url::Url;

use crate::AppState;
use crate::config::ActivityPubConfig;
use crate::error::AppError;
use crate::metrics::{
    COLLECTION_DOCUMENTS_SERVED, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::service::document::{collection_document, page_document, render_item};
use crate::service::{CollectionDocument, ResolveCollection, Window, compute_window};

/// Content-Type of ActivityStreams documents
pub const ACTIVITY_JSON: &str = "application/activity+json";

/// Query parameters controlling collection paging
///
/// Unrecognized values never fail the request: a `page` that is not
/// truthy serves the collection envelope, and a `page-num` that is not a
/// non-negative integer serves the most recent page. When a key is
/// repeated, the first value wins.
#[derive(Debug, Default)]
pub struct PagingParams {
    pub page: Option<String>,
    pub page_num: Option<String>,
}

impl PagingParams {
    /// Pick `page` and `page-num` out of the raw query pairs
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" if params.page.is_none() => params.page = Some(value),
                "page-num" if params.page_num.is_none() => params.page_num = Some(value),
                _ => {}
            }
        }
        params
    }

    pub fn is_paged(&self) -> bool {
        matches!(
            self.page.as_deref(),
            Some("1" | "t" | "T" | "true" | "TRUE" | "True")
        )
    }

    pub fn page_num(&self) -> Option<usize> {
        self.page_num.as_deref()?.parse().ok()
    }
}

/// Create ActivityPub router
///
/// Routes:
/// - GET {service_path}/outbox - Outbox
/// - GET {service_path}/inbox - Inbox
/// - GET {objects_path}/:id/shares - Shares of an object
/// - GET {objects_path}/:id/likes - Likes of an object
pub fn activitypub_router(config: &ActivityPubConfig) -> Router<AppState> {
    Router::new()
        .route(&format!("{}/outbox", config.service_path), get(outbox))
        .route(&format!("{}/inbox", config.service_path), get(inbox))
        .route(&format!("{}/:id/shares", config.objects_path), get(shares))
        .route(&format!("{}/:id/likes", config.objects_path), get(likes))
}

/// GET {service_path}/outbox
async fn outbox(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = PagingParams::from_pairs(query);
    handle_collection(&state, &state.collections.outbox, None, &params).await
}

/// GET {service_path}/inbox
async fn inbox(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = PagingParams::from_pairs(query);
    handle_collection(&state, &state.collections.inbox, None, &params).await
}

/// GET {objects_path}/:id/shares
async fn shares(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = PagingParams::from_pairs(query);
    handle_collection(&state, &state.collections.shares, Some(&id), &params).await
}

/// GET {objects_path}/:id/likes
async fn likes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = PagingParams::from_pairs(query);
    handle_collection(&state, &state.collections.likes, Some(&id), &params).await
}

/// Serve one collection request
///
/// # Steps
/// 1. Resolve the owning IRI and the collection id
/// 2. Count references and compute the page window
/// 3. Fetch and render the window's members (paged requests only)
/// 4. Serialize the document
///
/// Any failure aborts before a response body is produced.
#[tracing::instrument(skip_all, fields(collection = resolver.name()))]
pub async fn handle_collection<R>(
    state: &AppState,
    resolver: &R,
    object_id: Option<&str>,
    params: &PagingParams,
) -> Result<Response, AppError>
where
    R: ResolveCollection + ?Sized,
{
    let endpoint = resolver.name();
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", endpoint])
        .start_timer();

    let object_iri = resolver.object_iri(object_id)?;
    let collection_id = resolver.collection_id(&object_iri)?;

    let total = state
        .activity_store
        .count_references(resolver.reference_type(), &object_iri)
        .await?;

    let window = compute_window(
        total,
        state.config.activitypub.page_size,
        params.is_paged(),
        params.page_num(),
    );

    let document = if window.current.is_none() {
        CollectionDocument::Collection(collection_document(&collection_id, &window))
    } else {
        let items = fetch_items(state, resolver, &object_iri, &window).await?;
        CollectionDocument::Page(page_document(&collection_id, &window, items))
    };

    let body = (state.marshal)(&document.to_value()?).map_err(AppError::Serialization)?;

    tracing::debug!(
        id = %collection_id,
        total,
        page = ?window.current,
        items = window.items.len(),
        "Serving collection document"
    );

    COLLECTION_DOCUMENTS_SERVED
        .with_label_values(&[endpoint, document.kind()])
        .inc();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", endpoint, "200"])
        .inc();

    Ok(([(header::CONTENT_TYPE, ACTIVITY_JSON)], body).into_response())
}

/// Fetch the members of `window` newest-first and render them
async fn fetch_items<R>(
    state: &AppState,
    resolver: &R,
    object_iri: &Url,
    window: &Window,
) -> Result<Vec<serde_json::Value>, AppError>
where
    R: ResolveCollection + ?Sized,
{
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let members = state
        .activity_store
        .references_before(
            resolver.reference_type(),
            object_iri,
            window.items.end,
            window.items.len(),
        )
        .await?;

    let mut items = Vec::with_capacity(members.len());
    for member in &members {
        let activity = state
            .activity_store
            .get_activity(member)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "activity {member} referenced by {object_iri} not found"
                ))
            })?;
        items.push(render_item(&activity, member, resolver.item_form())?);
    }

    Ok(items)
}

//! Accept-list endpoints
//!
//! - GET {service_path}/acceptlist[?type=...] - read one or all accept lists
//! - POST {service_path}/acceptlist - apply a batch of additions/removals

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::config::ActivityPubConfig;
use crate::error::AppError;
use crate::metrics::{
    ACCEPT_LIST_UPDATES_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::service::{AcceptListDocument, parse_update_request};

const ENDPOINT: &str = "acceptlist";

#[derive(Debug, Default, Deserialize)]
struct AcceptListQuery {
    #[serde(rename = "type")]
    accept_type: Option<String>,
}

/// Create accept-list router
pub fn acceptlist_router(config: &ActivityPubConfig) -> Router<AppState> {
    Router::new().route(
        &format!("{}/acceptlist", config.service_path),
        get(read_accept_list).post(write_accept_list),
    )
}

/// POST {service_path}/acceptlist
///
/// The whole batch is validated before the first update is applied.
/// Entries are then applied in order; a store failure part way through
/// leaves the earlier entries applied.
async fn write_accept_list(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", ENDPOINT])
        .start_timer();

    tracing::debug!(
        body = %String::from_utf8_lossy(&body),
        "Got request to update accept list"
    );

    let updates = parse_update_request(&body).inspect_err(|error| {
        tracing::info!(%error, "Rejected accept list request");
    })?;

    for update in &updates {
        state
            .accept_list_store
            .update(&update.accept_type, &update.additions, &update.removals)
            .await?;

        ACCEPT_LIST_UPDATES_TOTAL
            .with_label_values(&[update.accept_type.as_str()])
            .inc();
        tracing::info!(
            accept_type = %update.accept_type,
            added = update.additions.len(),
            removed = update.removals.len(),
            "Accept list updated"
        );
    }

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", ENDPOINT, "200"])
        .inc();

    Ok(StatusCode::OK)
}

/// GET {service_path}/acceptlist
///
/// Without `type` returns every accept list; with `type` returns that
/// list, which is empty for unknown types.
async fn read_accept_list(
    State(state): State<AppState>,
    Query(query): Query<AcceptListQuery>,
) -> Result<Response, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", ENDPOINT])
        .start_timer();

    let document = match query.accept_type.filter(|t| !t.is_empty()) {
        None => {
            let lists = state.accept_list_store.get_all().await?;
            serde_json::to_value(
                lists
                    .iter()
                    .map(AcceptListDocument::from)
                    .collect::<Vec<_>>(),
            )
        }
        Some(accept_type) => {
            let urls = state.accept_list_store.get(&accept_type).await?;
            serde_json::to_value(AcceptListDocument::new(&accept_type, &urls))
        }
    }
    .map_err(AppError::Serialization)?;

    let body = (state.marshal)(&document).map_err(AppError::Serialization)?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", ENDPOINT, "200"])
        .inc();

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

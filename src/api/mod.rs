//! API layer
//!
//! HTTP handlers for:
//! - ActivityPub collections (outbox, inbox, shares, likes)
//! - Accept lists
//! - Metrics (Prometheus)

mod acceptlist;
mod activitypub;
pub mod metrics;

pub use acceptlist::acceptlist_router;
pub use activitypub::{ACTIVITY_JSON, PagingParams, activitypub_router, handle_collection};
pub use metrics::metrics_router;

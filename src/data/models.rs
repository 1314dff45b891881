//! Data models
//!
//! Rust structs representing stored activities, references and accept lists.

use serde::{Deserialize, Serialize};
use url::Url;

/// JSON-LD context for ActivityStreams documents
pub const ACTIVITY_STREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

fn default_context() -> serde_json::Value {
    serde_json::Value::String(ACTIVITY_STREAMS_CONTEXT.to_string())
}

// =============================================================================
// References
// =============================================================================

/// Kind of relationship a reference records between an owner and a member
///
/// Stored as the lowercase name in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Outbox,
    Inbox,
    Share,
    Like,
    Follower,
    Following,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Outbox => "outbox",
            ReferenceType::Inbox => "inbox",
            ReferenceType::Share => "share",
            ReferenceType::Like => "like",
            ReferenceType::Follower => "follower",
            ReferenceType::Following => "following",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Activity
// =============================================================================

/// An already-persisted ActivityStreams activity
///
/// Only `id`, `type`, `actor` and `object` are modelled explicitly; every
/// other property is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "@context", default = "default_context")]
    pub context: serde_json::Value,
    pub id: Url,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Activity {
    /// Create a bare activity with the default ActivityStreams context
    pub fn new(id: Url, activity_type: impl Into<String>) -> Self {
        Self {
            context: default_context(),
            id,
            activity_type: activity_type.into(),
            actor: None,
            object: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_actor(mut self, actor: Url) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_object(mut self, object: serde_json::Value) -> Self {
        self.object = Some(object);
        self
    }

    /// Render this activity as a reference whose `object` is `member`
    ///
    /// Properties other than the identity, type and actor are dropped so the
    /// referenced object graph is never expanded.
    pub fn as_reference(&self, member: &Url) -> Self {
        Self {
            context: self.context.clone(),
            id: self.id.clone(),
            activity_type: self.activity_type.clone(),
            actor: self.actor.clone(),
            object: Some(serde_json::Value::String(member.to_string())),
            extra: serde_json::Map::new(),
        }
    }
}

// =============================================================================
// Accept list
// =============================================================================

/// The set of URIs accepted for one accept type (e.g. "follow")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    pub accept_type: String,
    pub urls: Vec<Url>,
}

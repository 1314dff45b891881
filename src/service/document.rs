//! Collection documents
//!
//! Renders a computed [`Window`] into ActivityStreams `OrderedCollection`
//! and `OrderedCollectionPage` documents.

use serde::Serialize;
use url::Url;

use super::paging::Window;
use super::resolver::ItemForm;
use crate::data::{ACTIVITY_STREAMS_CONTEXT, Activity};
use crate::error::AppError;

/// Serializer used for response bodies; swappable so failures can be injected
pub type Marshaller = fn(&serde_json::Value) -> serde_json::Result<Vec<u8>>;

/// Default [`Marshaller`]
pub fn marshal_json(value: &serde_json::Value) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(value)
}

/// Top-level collection envelope (no items)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollection {
    #[serde(rename = "@context")]
    pub context: &'static str,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub total_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// One page of a collection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollectionPage {
    #[serde(rename = "@context")]
    pub context: &'static str,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub total_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ordered_items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CollectionDocument {
    Collection(OrderedCollection),
    Page(OrderedCollectionPage),
}

impl CollectionDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionDocument::Collection(doc) => doc.kind,
            CollectionDocument::Page(doc) => doc.kind,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, AppError> {
        serde_json::to_value(self).map_err(AppError::Serialization)
    }
}

/// Build the unpaged collection envelope
pub fn collection_document(collection_id: &Url, window: &Window) -> OrderedCollection {
    OrderedCollection {
        context: ACTIVITY_STREAMS_CONTEXT,
        id: collection_id.to_string(),
        kind: "OrderedCollection",
        total_items: window.total,
        first: window.first.map(|link| link.href(collection_id)),
        last: window.last.map(|link| link.href(collection_id)),
    }
}

/// Build a collection page from already rendered, newest-first items
pub fn page_document(
    collection_id: &Url,
    window: &Window,
    ordered_items: Vec<serde_json::Value>,
) -> OrderedCollectionPage {
    let id = window
        .current
        .map_or_else(|| collection_id.to_string(), |link| link.href(collection_id));

    OrderedCollectionPage {
        context: ACTIVITY_STREAMS_CONTEXT,
        id,
        kind: "OrderedCollectionPage",
        total_items: window.total,
        prev: window.prev.map(|link| link.href(collection_id)),
        next: window.next.map(|link| link.href(collection_id)),
        ordered_items,
    }
}

/// Render one member of a collection
pub fn render_item(
    activity: &Activity,
    member: &Url,
    form: ItemForm,
) -> Result<serde_json::Value, AppError> {
    let rendered = match form {
        ItemForm::Hydrated => serde_json::to_value(activity),
        ItemForm::Reference => serde_json::to_value(activity.as_reference(member)),
    };
    rendered.map_err(AppError::Serialization)
}

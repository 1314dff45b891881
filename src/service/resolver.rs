//! Collection resolvers
//!
//! Each collection kind derives its owning IRI, its own `id` and the
//! reference type to query differently. Outbox and inbox hang off the
//! configured service IRI; shares and likes hang off an object addressed
//! by the `{id}` path parameter.

use thiserror::Error;
use url::Url;

use crate::data::ReferenceType;
use crate::error::AppError;

/// Errors raised while resolving a collection from a request
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("id not specified in URL")]
    MissingObjectId,

    #[error("invalid object id in URL: {0:?}")]
    InvalidObjectId(String),

    #[error("IRI cannot carry path segments: {0}")]
    OpaqueIri(Url),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::MissingObjectId | ResolveError::InvalidObjectId(_) => {
                AppError::Validation(err.to_string())
            }
            ResolveError::OpaqueIri(_) => AppError::Internal(err.into()),
        }
    }
}

/// How members of a collection are rendered in `orderedItems`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemForm {
    /// The full stored activity
    Hydrated,
    /// The activity with `object` set to the member IRI
    Reference,
}

/// Strategy for deriving a collection from an incoming request
pub trait ResolveCollection: Send + Sync {
    /// IRI that the collection's references are keyed by
    ///
    /// * `object_id` - the `{id}` path parameter, if the route has one
    fn object_iri(&self, object_id: Option<&str>) -> Result<Url, ResolveError>;

    /// The collection's own `id`
    fn collection_id(&self, object_iri: &Url) -> Result<Url, ResolveError>;

    fn reference_type(&self) -> ReferenceType;

    fn item_form(&self) -> ItemForm;

    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;
}

/// The four collection kinds served by this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionResolver {
    Outbox { service_iri: Url },
    Inbox { service_iri: Url },
    Shares { objects_iri: Url },
    Likes { objects_iri: Url },
}

impl CollectionResolver {
    fn suffix(&self) -> &'static str {
        match self {
            CollectionResolver::Outbox { .. } => "outbox",
            CollectionResolver::Inbox { .. } => "inbox",
            CollectionResolver::Shares { .. } => "shares",
            CollectionResolver::Likes { .. } => "likes",
        }
    }
}

/// Append one percent-encoded path segment to `base`
fn append_segment(base: &Url, segment: &str) -> Result<Url, ResolveError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ResolveError::OpaqueIri(base.clone()))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

impl ResolveCollection for CollectionResolver {
    fn object_iri(&self, object_id: Option<&str>) -> Result<Url, ResolveError> {
        match self {
            CollectionResolver::Outbox { service_iri }
            | CollectionResolver::Inbox { service_iri } => Ok(service_iri.clone()),
            CollectionResolver::Shares { objects_iri }
            | CollectionResolver::Likes { objects_iri } => {
                let id = object_id
                    .filter(|id| !id.is_empty())
                    .ok_or(ResolveError::MissingObjectId)?;
                if id == "." || id == ".." {
                    return Err(ResolveError::InvalidObjectId(id.to_string()));
                }
                append_segment(objects_iri, id)
            }
        }
    }

    fn collection_id(&self, object_iri: &Url) -> Result<Url, ResolveError> {
        append_segment(object_iri, self.suffix())
    }

    fn reference_type(&self) -> ReferenceType {
        match self {
            CollectionResolver::Outbox { .. } => ReferenceType::Outbox,
            CollectionResolver::Inbox { .. } => ReferenceType::Inbox,
            CollectionResolver::Shares { .. } => ReferenceType::Share,
            CollectionResolver::Likes { .. } => ReferenceType::Like,
        }
    }

    fn item_form(&self) -> ItemForm {
        match self {
            CollectionResolver::Outbox { .. } | CollectionResolver::Inbox { .. } => {
                ItemForm::Hydrated
            }
            CollectionResolver::Shares { .. } | CollectionResolver::Likes { .. } => {
                ItemForm::Reference
            }
        }
    }

    fn name(&self) -> &'static str {
        self.suffix()
    }
}

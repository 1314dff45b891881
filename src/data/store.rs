//! Store interfaces
//!
//! Handlers only see these traits, so the in-memory store, the SQLite
//! database and test mocks are interchangeable.

use async_trait::async_trait;
use url::Url;

use super::models::{AcceptList, Activity, ReferenceType};
use crate::error::AppError;

/// Append-only store of activities and the references that group them
/// into collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Persist an activity, replacing any activity with the same id
    async fn add_activity(&self, activity: &Activity) -> Result<(), AppError>;

    /// Fetch an activity by its IRI
    async fn get_activity(&self, iri: &Url) -> Result<Option<Activity>, AppError>;

    /// Append `member` to the collection keyed by (`reference_type`, `owner`)
    async fn add_reference(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        member: &Url,
    ) -> Result<(), AppError>;

    /// Number of references in the collection keyed by (`reference_type`, `owner`)
    async fn count_references(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
    ) -> Result<usize, AppError>;

    /// Up to `limit` references immediately before insertion `position`,
    /// newest first.
    ///
    /// Positions index the collection in insertion order, so
    /// `references_before(t, o, total, n)` returns the `n` most recent
    /// references.
    async fn references_before(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        position: usize,
        limit: usize,
    ) -> Result<Vec<Url>, AppError>;
}

/// Keyed sets of accepted URIs, one set per accept type.
///
/// Additions of present URIs and removals of absent URIs are no-ops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AcceptListStore: Send + Sync {
    async fn update(
        &self,
        accept_type: &str,
        additions: &[Url],
        removals: &[Url],
    ) -> Result<(), AppError>;

    /// URIs for one accept type; an unknown type yields an empty list
    async fn get(&self, accept_type: &str) -> Result<Vec<Url>, AppError>;

    async fn get_all(&self) -> Result<Vec<AcceptList>, AppError>;
}

/// Clip a (`position`, `limit`) request against the collection bounds,
/// returning the ascending index range it covers.
pub(crate) fn clip_range(total: usize, position: usize, limit: usize) -> std::ops::Range<usize> {
    let end = position.min(total);
    let start = end.saturating_sub(limit);
    start..end
}

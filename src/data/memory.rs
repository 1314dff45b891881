//! In-memory store
//!
//! Volatile implementation of both store traits. State is cleared on restart.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use super::models::{AcceptList, Activity, ReferenceType};
use super::store::{AcceptListStore, ActivityStore, clip_range};
use crate::error::AppError;

/// In-memory activity and accept-list store
#[derive(Default)]
pub struct MemoryStore {
    activities: RwLock<HashMap<Url, Activity>>,
    /// (type, owner) -> members in insertion order
    references: RwLock<HashMap<(ReferenceType, Url), Vec<Url>>>,
    accept_lists: RwLock<BTreeMap<String, BTreeSet<Url>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn add_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.activities
            .write()
            .await
            .insert(activity.id.clone(), activity.clone());
        Ok(())
    }

    async fn get_activity(&self, iri: &Url) -> Result<Option<Activity>, AppError> {
        Ok(self.activities.read().await.get(iri).cloned())
    }

    async fn add_reference(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        member: &Url,
    ) -> Result<(), AppError> {
        self.references
            .write()
            .await
            .entry((reference_type, owner.clone()))
            .or_default()
            .push(member.clone());
        Ok(())
    }

    async fn count_references(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
    ) -> Result<usize, AppError> {
        Ok(self
            .references
            .read()
            .await
            .get(&(reference_type, owner.clone()))
            .map_or(0, Vec::len))
    }

    async fn references_before(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        position: usize,
        limit: usize,
    ) -> Result<Vec<Url>, AppError> {
        let references = self.references.read().await;
        let Some(members) = references.get(&(reference_type, owner.clone())) else {
            return Ok(Vec::new());
        };

        let range = clip_range(members.len(), position, limit);
        Ok(members[range].iter().rev().cloned().collect())
    }
}

#[async_trait]
impl AcceptListStore for MemoryStore {
    async fn update(
        &self,
        accept_type: &str,
        additions: &[Url],
        removals: &[Url],
    ) -> Result<(), AppError> {
        let mut lists = self.accept_lists.write().await;
        let list = lists.entry(accept_type.to_string()).or_default();

        list.extend(additions.iter().cloned());
        for url in removals {
            list.remove(url);
        }

        if list.is_empty() {
            lists.remove(accept_type);
        }

        Ok(())
    }

    async fn get(&self, accept_type: &str) -> Result<Vec<Url>, AppError> {
        Ok(self
            .accept_lists
            .read()
            .await
            .get(accept_type)
            .map(|urls| urls.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_all(&self) -> Result<Vec<AcceptList>, AppError> {
        Ok(self
            .accept_lists
            .read()
            .await
            .iter()
            .map(|(accept_type, urls)| AcceptList {
                accept_type: accept_type.clone(),
                urls: urls.iter().cloned().collect(),
            })
            .collect())
    }
}

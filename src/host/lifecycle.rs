// Entity lifecycle manager - the host side of the interceptor contract.
//
// A save runs every interceptor registered for the entity type before the
// record is persisted, persists it, then runs the after-save callbacks.
// Capability checks fold each interceptor's decision over the host default.

use super::content_record::ContentRecord;
use crate::core::moderation::{
    Actor, CapabilityDecision, DraftDecision, EntityInterceptor, EntityKind, InterceptorRegistry,
    PostSaveOutcome,
};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Where the host persists content records.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn persist(&self, record: &ContentRecord) -> Result<()>;
    async fn find(&self, id: u64) -> Result<Option<ContentRecord>>;
}

/// Repository backed by a `DashMap`, keyed by record id.
#[derive(Default)]
pub struct InMemoryRepository {
    records: DashMap<u64, ContentRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityRepository for InMemoryRepository {
    async fn persist(&self, record: &ContentRecord) -> Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find(&self, id: u64) -> Result<Option<ContentRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }
}

/// What a save did, as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub draft: DraftDecision,
    pub post_save: Vec<PostSaveOutcome>,
}

pub struct EntityLifecycle<R: EntityRepository> {
    repository: R,
    interceptors: HashMap<EntityKind, Vec<Arc<dyn EntityInterceptor>>>,
}

impl<R: EntityRepository> EntityLifecycle<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            interceptors: HashMap::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn is_guarded(&self, kind: &EntityKind) -> bool {
        self.interceptors.get(kind).is_some_and(|list| !list.is_empty())
    }

    /// Run before-save hooks, persist, then run after-save hooks.
    ///
    /// A persistence failure aborts the save before any after-save hook runs.
    /// After-save hooks cannot fail the save.
    pub async fn save(&self, record: &mut ContentRecord) -> Result<SaveReport> {
        let hooks = self
            .interceptors
            .get(&record.kind)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut draft = DraftDecision::Keep;
        for hook in hooks {
            if hook.before_save(&mut *record) == DraftDecision::Demote {
                draft = DraftDecision::Demote;
            }
        }

        self.repository.persist(record).await?;

        let mut post_save = Vec::with_capacity(hooks.len());
        for hook in hooks {
            post_save.push(hook.after_save(&*record).await);
        }

        Ok(SaveReport { draft, post_save })
    }

    /// Whether `actor` holds `capability` on `record`.
    ///
    /// Owners and admins hold every capability by default; interceptors can
    /// only take it away.
    pub fn can_user(&self, record: &ContentRecord, actor: &Actor, capability: &str) -> bool {
        let default = actor.is_admin || actor.user_id == record.owner_user_id;
        self.interceptors
            .get(&record.kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|hook| hook.check_capability(record, actor, capability))
            .fold(default, |current, decision: CapabilityDecision| {
                decision.apply(current)
            })
    }
}

impl<R: EntityRepository> InterceptorRegistry for EntityLifecycle<R> {
    fn register(&mut self, kind: EntityKind, interceptor: Arc<dyn EntityInterceptor>) {
        self.interceptors.entry(kind).or_default().push(interceptor);
    }
}

// Event gate - ties detection to the entity lifecycle.
//
// Three interception points, registered once per configured entity type:
// - before save: demote to draft and mark spam-blocked on block terms
// - after save: notify moderators and the owner on any term
// - capability check: deny `publish` to non-admins while block terms remain
//
// No hook raises. Collaborator failures are logged and counted.

use super::moderation_config::{ConfigError, ModerationConfig};
use super::moderation_models::{
    Actor, DetectionReport, EntityKind, EntityStatus, RecipientProfile, Scope, TermList,
};
use super::moderation_policy::{
    draft_decision, publish_decision, should_notify, CapabilityDecision, DraftDecision,
};
use super::moderation_ports::{ModeratedEntity, ModerationError, ModerationPorts, RoleDirectory};
use super::notification_dispatcher::{EmailOutcome, NotificationDispatcher};
use super::term_matcher::TermMatcher;
use async_trait::async_trait;
use std::sync::Arc;

/// Capability gated by block terms.
pub const PUBLISH_CAPABILITY: &str = "publish";

/// Role that makes a user a moderator of a sub-site.
pub const SUBSITE_ADMIN_ROLE: &str = "admin";
/// Role that makes a user a moderator of the main site.
pub const SUPER_ADMIN_ROLE: &str = "saasSuperAdmin";

// ============================================================================
// INTERCEPTOR PORT
// ============================================================================

/// Lifecycle callbacks a host runs around saves and capability checks.
#[async_trait]
pub trait EntityInterceptor: Send + Sync {
    /// Runs before the entity is persisted. May mutate the entity.
    fn before_save(&self, entity: &mut dyn ModeratedEntity) -> DraftDecision;

    /// Runs after the entity is persisted.
    async fn after_save(&self, entity: &dyn ModeratedEntity) -> PostSaveOutcome;

    /// Runs whenever `capability` is evaluated for `actor` on `entity`.
    fn check_capability(
        &self,
        entity: &dyn ModeratedEntity,
        actor: &Actor,
        capability: &str,
    ) -> CapabilityDecision;
}

/// Where interceptors get registered, per entity type.
pub trait InterceptorRegistry {
    fn register(&mut self, kind: EntityKind, interceptor: Arc<dyn EntityInterceptor>);
}

/// Summary of one post-save run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSaveOutcome {
    pub detections: DetectionReport,
    pub admins_notified: usize,
    pub emails_sent: usize,
    pub owner_notified: bool,
    /// Collaborator failures that were logged and swallowed.
    pub failures: usize,
}

// ============================================================================
// GATE
// ============================================================================

pub struct EventGate {
    config: Arc<ModerationConfig>,
    terms: TermList,
    matcher: TermMatcher,
    roles: Arc<dyn RoleDirectory>,
    dispatcher: NotificationDispatcher,
}

impl EventGate {
    /// Build a gate from a validated configuration.
    pub fn new(config: ModerationConfig, ports: ModerationPorts) -> Result<Self, ConfigError> {
        config.validate()?;

        let config = Arc::new(config);
        Ok(Self {
            terms: config.term_list(),
            matcher: TermMatcher::new(config.accumulator),
            roles: Arc::clone(&ports.roles),
            dispatcher: NotificationDispatcher::new(Arc::clone(&config), ports),
            config,
        })
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Register this gate for every configured entity type.
    pub fn register(self: &Arc<Self>, registry: &mut dyn InterceptorRegistry) {
        for kind in &self.config.entities {
            registry.register(kind.clone(), Arc::clone(self) as Arc<dyn EntityInterceptor>);
            tracing::debug!(entity_type = %kind, "Spam detector hooks registered");
        }
    }

    /// Detections of block terms only.
    pub fn block_detections(&self, entity: &dyn ModeratedEntity) -> DetectionReport {
        self.matcher
            .scan(entity, &self.config.fields, self.terms.block_terms())
    }

    /// Detections of block and soft terms.
    pub fn notification_detections(&self, entity: &dyn ModeratedEntity) -> DetectionReport {
        self.matcher
            .scan(entity, &self.config.fields, &self.terms.notification_terms())
    }

    /// Demote the entity when block terms are present.
    ///
    /// Only ever moves towards draft/blocked; a clean scan leaves an earlier
    /// `spam_block` in place.
    pub fn pre_save(&self, entity: &mut dyn ModeratedEntity) -> DraftDecision {
        if !self.config.guards(entity.kind()) {
            return DraftDecision::Keep;
        }

        let report = self.block_detections(entity);
        let decision = draft_decision(&report);
        if decision == DraftDecision::Demote {
            entity.set_status(EntityStatus::Draft);
            entity.set_spam_block(true);
            tracing::info!(
                entity_type = %entity.kind(),
                entity_id = entity.id(),
                fields = ?report.fields(),
                "Entity demoted to draft for blocked terms"
            );
        }
        decision
    }

    /// Notify moderators and the owner when any term is present.
    pub async fn post_save(&self, entity: &dyn ModeratedEntity) -> PostSaveOutcome {
        let mut outcome = PostSaveOutcome::default();
        if !self.config.guards(entity.kind()) {
            return outcome;
        }

        outcome.detections = self.notification_detections(entity);
        if !should_notify(&outcome.detections) {
            return outcome;
        }

        let admins = match self.admin_recipients(entity.scope()).await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!(entity_id = entity.id(), "Failed to resolve admin users: {}", e);
                outcome.failures += 1;
                Vec::new()
            }
        };

        for admin in &admins {
            match self
                .dispatcher
                .notify(admin, entity, &outcome.detections)
                .await
            {
                Ok(notified) => {
                    outcome.admins_notified += 1;
                    match notified.email {
                        EmailOutcome::Sent(_) => outcome.emails_sent += 1,
                        EmailOutcome::Failed => outcome.failures += 1,
                        EmailOutcome::NoAddress => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        entity_id = entity.id(),
                        recipient = admin.user_id,
                        "Failed to notify moderator: {}",
                        e
                    );
                    outcome.failures += 1;
                }
            }
        }

        match self.dispatcher.notify_owner(entity).await {
            Ok(_) => outcome.owner_notified = true,
            Err(e) => {
                tracing::warn!(entity_id = entity.id(), "Failed to notify owner: {}", e);
                outcome.failures += 1;
            }
        }

        outcome
    }

    /// Deny publishing to non-admins while block terms are present.
    pub fn publish_decision(&self, entity: &dyn ModeratedEntity, actor: &Actor) -> CapabilityDecision {
        if !self.config.guards(entity.kind()) {
            return CapabilityDecision::Defer;
        }

        let decision = publish_decision(&self.block_detections(entity), actor);
        if decision == CapabilityDecision::Deny {
            tracing::debug!(
                entity_id = entity.id(),
                user_id = actor.user_id,
                "Publish capability denied for blocked terms"
            );
        }
        decision
    }

    /// Profiles of the users moderating `scope`, deduplicated, in role order.
    pub async fn admin_recipients(&self, scope: Scope) -> Result<Vec<RecipientProfile>, ModerationError> {
        let role = admin_role_for(scope);
        let mut user_ids = Vec::new();
        for assignment in self.roles.role_assignments(scope).await? {
            if assignment.role == role && !user_ids.contains(&assignment.user_id) {
                user_ids.push(assignment.user_id);
            }
        }

        let mut profiles = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            match self.roles.recipient_profile(user_id).await? {
                Some(profile) => profiles.push(profile),
                None => tracing::debug!(user_id, "Admin user has no profile, skipping"),
            }
        }
        Ok(profiles)
    }
}

/// Role name that qualifies a moderator for `scope`.
pub fn admin_role_for(scope: Scope) -> &'static str {
    match scope {
        Scope::Subsite(_) => SUBSITE_ADMIN_ROLE,
        Scope::Global => SUPER_ADMIN_ROLE,
    }
}

#[async_trait]
impl EntityInterceptor for EventGate {
    fn before_save(&self, entity: &mut dyn ModeratedEntity) -> DraftDecision {
        self.pre_save(entity)
    }

    async fn after_save(&self, entity: &dyn ModeratedEntity) -> PostSaveOutcome {
        self.post_save(entity).await
    }

    fn check_capability(
        &self,
        entity: &dyn ModeratedEntity,
        actor: &Actor,
        capability: &str,
    ) -> CapabilityDecision {
        if capability == PUBLISH_CAPABILITY {
            self.publish_decision(entity, actor)
        } else {
            CapabilityDecision::Defer
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

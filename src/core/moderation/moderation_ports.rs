// Ports the moderation core consumes.
//
// The host system owns persistence, roles, mail and templating. The core
// only talks to them through these traits, so the infra layer can swap a
// SQLite sink for an in-memory one without touching any decision logic.

use super::moderation_models::{
    EntityId, EntityKind, EntityStatus, MailMessage, NotificationRequest, RecipientProfile,
    RoleAssignment, Scope, UserId,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Failures reported by collaborators.
///
/// None of these abort a save; the gate logs them and carries on.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Role lookup error: {0}")]
    RoleLookupError(String),

    #[error("Mail error: {0}")]
    MailError(String),

    #[error("Template error: {0}")]
    TemplateError(String),
}

// ============================================================================
// ENTITY ACCESS
// ============================================================================

/// A content item the filter can inspect and demote.
pub trait ModeratedEntity: Send + Sync {
    fn kind(&self) -> &EntityKind;
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn url(&self) -> &str;
    fn owner_user_id(&self) -> UserId;
    fn scope(&self) -> Scope;

    /// Current value of a named text field, or `None` when absent or empty.
    fn field_value(&self, field: &str) -> Option<String>;

    fn status(&self) -> EntityStatus;
    fn set_status(&mut self, status: EntityStatus);

    fn spam_block(&self) -> bool;
    fn set_spam_block(&mut self, blocked: bool);
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Role and profile lookups.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Role assignments visible in a scope. `Scope::Global` returns every
    /// assignment, `Scope::Subsite` only that sub-site's.
    async fn role_assignments(&self, scope: Scope) -> Result<Vec<RoleAssignment>, ModerationError>;

    /// Contact profile for a user, if the user still exists.
    async fn recipient_profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecipientProfile>, ModerationError>;
}

/// Persists in-app notifications and marks them delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Store a notification. Returns the stored notification id.
    async fn persist(&self, request: &NotificationRequest) -> Result<u64, ModerationError>;
}

/// Sends emails. Failures are non-fatal for the caller.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), ModerationError>;
}

/// Named parameters substituted into a template.
pub type TemplateParams = BTreeMap<String, String>;

/// Substitutes named parameters into an HTML template string.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, params: &TemplateParams) -> Result<String, ModerationError>;
}

/// Looks up display text for a message literal.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Returns every literal unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Host switch that turns permission checks off and on.
pub trait AccessControl: Send + Sync {
    fn is_access_control_enabled(&self) -> bool;
    fn disable_access_control(&self);
    fn enable_access_control(&self);
}

/// Every collaborator the gate and the dispatcher need, bundled for injection.
#[derive(Clone)]
pub struct ModerationPorts {
    pub roles: Arc<dyn RoleDirectory>,
    pub notifications: Arc<dyn NotificationSink>,
    pub mailer: Arc<dyn MailTransport>,
    pub templates: Arc<dyn TemplateRenderer>,
    pub translator: Arc<dyn Translator>,
    pub access: Arc<dyn AccessControl>,
}

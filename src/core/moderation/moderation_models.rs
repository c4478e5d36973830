// Moderation domain models - data structures for the term-based spam filter.
//
// These are pure domain types with no host dependencies.
// The host layer converts its own entities into these shapes through the
// `ModeratedEntity` port.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

pub type UserId = u64;
pub type EntityId = u64;
pub type SubsiteId = u64;

/// Label used when an entity type has no display mapping.
pub const DEFAULT_ENTITY_LABEL: &str = "Content";

/// Type tag of a moderated content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Agent,
    Opportunity,
    Project,
    Space,
    Event,
    /// Any other type name the host registers.
    Other(String),
}

impl EntityKind {
    /// Type name as it appears in configuration.
    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Agent => "Agent",
            EntityKind::Opportunity => "Opportunity",
            EntityKind::Project => "Project",
            EntityKind::Space => "Space",
            EntityKind::Event => "Event",
            EntityKind::Other(name) => name,
        }
    }

    /// Human-readable label used in owner messages.
    pub fn display_label(&self) -> &str {
        match self {
            EntityKind::Agent => "Agent",
            EntityKind::Opportunity => "Opportunity",
            EntityKind::Project => "Project",
            EntityKind::Space => "Space",
            EntityKind::Event => "Event",
            EntityKind::Other(_) => DEFAULT_ENTITY_LABEL,
        }
    }
}

impl FromStr for EntityKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Agent" => EntityKind::Agent,
            "Opportunity" => EntityKind::Opportunity,
            "Project" => EntityKind::Project,
            "Space" => EntityKind::Space,
            "Event" => EntityKind::Event,
            other => EntityKind::Other(other.to_string()),
        })
    }
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Publication status of an entity, with the numeric codes the host stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Enabled,
    Draft,
    Archived,
    Disabled,
    Trash,
}

impl EntityStatus {
    pub fn code(self) -> i32 {
        match self {
            EntityStatus::Enabled => 1,
            EntityStatus::Draft => 0,
            EntityStatus::Archived => -2,
            EntityStatus::Disabled => -9,
            EntityStatus::Trash => -10,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(EntityStatus::Enabled),
            0 => Some(EntityStatus::Draft),
            -2 => Some(EntityStatus::Archived),
            -9 => Some(EntityStatus::Disabled),
            -10 => Some(EntityStatus::Trash),
            _ => None,
        }
    }
}

/// Scope used to resolve administrators for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Entity belongs to the main site.
    Global,
    /// Entity belongs to a sub-site.
    Subsite(SubsiteId),
}

/// The user a capability is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

/// One role held by one user within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role: String,
    #[serde(default)]
    pub subsite_id: Option<SubsiteId>,
}

/// Contact data of a notification recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub private_email: Option<String>,
    #[serde(default)]
    pub public_email: Option<String>,
    #[serde(default)]
    pub account_email: Option<String>,
}

impl RecipientProfile {
    /// Address an admin may use to reach this recipient.
    ///
    /// Private email wins over public email, which wins over the account
    /// email. Blank values count as absent.
    pub fn admin_email(&self) -> Option<&str> {
        [
            self.private_email.as_deref(),
            self.public_email.as_deref(),
            self.account_email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|email| !email.is_empty())
    }
}

/// Configured term lists.
///
/// `block` terms demote content and gate publishing; `soft` terms only
/// trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermList {
    pub block: Vec<String>,
    pub soft: Vec<String>,
}

impl TermList {
    pub fn block_terms(&self) -> &[String] {
        &self.block
    }

    /// Block terms followed by soft terms.
    pub fn notification_terms(&self) -> Vec<String> {
        self.block.iter().chain(self.soft.iter()).cloned().collect()
    }
}

/// One scanned field and the terms attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub field: String,
    pub terms: Vec<String>,
}

/// Ordered detections of a single scan. Computed per hook, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    detections: Vec<Detection>,
}

impl DetectionReport {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn get(&self, field: &str) -> Option<&Detection> {
        self.detections.iter().find(|d| d.field == field)
    }

    /// Scanned field names in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.detections.iter().map(|d| d.field.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a DetectionReport {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

/// Which wording a moderation message uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVariant {
    /// The entity is already saved and waits for a moderator.
    AwaitingModeration,
    /// The entity cannot be published without an administrator.
    RequiresAdminPublish,
}

impl MessageVariant {
    pub fn for_spam_block(spam_block: bool) -> Self {
        if spam_block {
            MessageVariant::AwaitingModeration
        } else {
            MessageVariant::RequiresAdminPublish
        }
    }
}

/// An in-app notification handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient_user_id: UserId,
    pub message: String,
    pub entity_id: EntityId,
    pub entity_url: String,
    pub is_already_saved: bool,
}

/// Outgoing email handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        private_email: Option<&str>,
        public_email: Option<&str>,
        account_email: Option<&str>,
    ) -> RecipientProfile {
        RecipientProfile {
            user_id: 1,
            private_email: private_email.map(String::from),
            public_email: public_email.map(String::from),
            account_email: account_email.map(String::from),
        }
    }

    #[test]
    fn test_admin_email_prefers_private() {
        let p = profile(Some("private@x.org"), Some("public@x.org"), Some("acct@x.org"));
        assert_eq!(p.admin_email(), Some("private@x.org"));
    }

    #[test]
    fn test_admin_email_falls_back_to_public_then_account() {
        let p = profile(None, Some("public@x.org"), Some("acct@x.org"));
        assert_eq!(p.admin_email(), Some("public@x.org"));

        let p = profile(Some("  "), None, Some("acct@x.org"));
        assert_eq!(p.admin_email(), Some("acct@x.org"));
    }

    #[test]
    fn test_admin_email_none_when_nothing_present() {
        assert_eq!(profile(None, None, None).admin_email(), None);
        assert_eq!(profile(Some(""), Some(""), None).admin_email(), None);
    }

    #[test]
    fn test_entity_kind_parsing_and_labels() {
        assert_eq!("Space".parse::<EntityKind>().unwrap(), EntityKind::Space);
        let custom: EntityKind = "Seal".parse().unwrap();
        assert_eq!(custom, EntityKind::Other("Seal".to_string()));
        assert_eq!(custom.as_str(), "Seal");
        assert_eq!(custom.display_label(), DEFAULT_ENTITY_LABEL);
        assert_eq!(EntityKind::Opportunity.display_label(), "Opportunity");
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            EntityStatus::Enabled,
            EntityStatus::Draft,
            EntityStatus::Archived,
            EntityStatus::Disabled,
            EntityStatus::Trash,
        ] {
            assert_eq!(EntityStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(EntityStatus::from_code(7), None);
    }

    #[test]
    fn test_notification_terms_put_block_terms_first() {
        let terms = TermList {
            block: vec!["apk".into()],
            soft: vec!["venda".into(), "premium".into()],
        };
        assert_eq!(terms.notification_terms(), vec!["apk", "venda", "premium"]);
        assert_eq!(terms.block_terms(), ["apk".to_string()]);
    }

    #[test]
    fn test_message_variant_follows_spam_block() {
        assert_eq!(
            MessageVariant::for_spam_block(true),
            MessageVariant::AwaitingModeration
        );
        assert_eq!(
            MessageVariant::for_spam_block(false),
            MessageVariant::RequiresAdminPublish
        );
    }
}

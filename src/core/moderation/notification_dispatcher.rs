// Notification dispatcher - tells moderators and owners about detections.
//
// Moderators get an in-app notification plus an email summary of the
// detections. Owners get a short in-app notice. Email problems never fail the
// call: they are logged and reported in the outcome.

use super::moderation_config::ModerationConfig;
use super::moderation_models::{
    DetectionReport, MailMessage, MessageVariant, NotificationRequest, RecipientProfile,
};
use super::moderation_ports::{
    AccessControl, ModeratedEntity, ModerationError, ModerationPorts, TemplateParams,
};
use regex::{Captures, Regex};
use std::sync::{Arc, LazyLock};

const MESSAGE_AWAITING_MODERATION: &str = "Possible spam detected - <strong><i>{name}</i></strong><br><br> The content was saved and is awaiting moderation. <a href='{url}'>Click here</a> to review it. More details were sent to your email";
const MESSAGE_REQUIRES_ADMIN: &str = "Possible spam detected - <strong><i>{name}</i></strong><br><br> Only an administrator can publish this content. More details were sent to your email";
const OWNER_AWAITING_MODERATION: &str = "{label} {name} was sent for moderation";
const OWNER_REQUIRES_ADMIN: &str =
    "{label} {name} cannot be published without an administrator's approval";
const EMAIL_SUBJECT: &str = "Spam notification";

static MESSAGE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(name|url)\}").unwrap());

// ============================================================================
// SCOPED PRIVILEGE ELEVATION
// ============================================================================

/// Turns access control off for as long as it lives.
///
/// Dropping the guard restores the state found at acquisition, including on
/// early returns and panics. If access control was already off, the guard
/// leaves it off.
#[must_use = "access control is restored as soon as the guard is dropped"]
pub struct ElevatedAccess<'a> {
    access: &'a dyn AccessControl,
    restore: bool,
}

impl<'a> ElevatedAccess<'a> {
    pub fn acquire(access: &'a dyn AccessControl) -> Self {
        let restore = access.is_access_control_enabled();
        if restore {
            access.disable_access_control();
        }
        Self { access, restore }
    }
}

impl Drop for ElevatedAccess<'_> {
    fn drop(&mut self) {
        if self.restore {
            self.access.enable_access_control();
        }
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// What happened to the email leg of a moderator notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    /// Sent to this address.
    Sent(String),
    /// The recipient has no usable address.
    NoAddress,
    /// Rendering or the transport failed; already logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub notification_id: u64,
    pub email: EmailOutcome,
}

// ============================================================================
// DISPATCHER
// ============================================================================

pub struct NotificationDispatcher {
    config: Arc<ModerationConfig>,
    ports: ModerationPorts,
}

impl NotificationDispatcher {
    pub fn new(config: Arc<ModerationConfig>, ports: ModerationPorts) -> Self {
        Self { config, ports }
    }

    /// Notify one moderator about `detections` on `entity`.
    ///
    /// Only the notification write runs with access control disabled; the
    /// email leg runs after the guard is dropped.
    pub async fn notify(
        &self,
        recipient: &RecipientProfile,
        entity: &dyn ModeratedEntity,
        detections: &DetectionReport,
    ) -> Result<NotifyOutcome, ModerationError> {
        let is_already_saved = entity.spam_block();
        let variant = MessageVariant::for_spam_block(is_already_saved);
        let request = NotificationRequest {
            recipient_user_id: recipient.user_id,
            message: self.moderator_message(entity, variant),
            entity_id: entity.id(),
            entity_url: entity.url().to_string(),
            is_already_saved,
        };
        let notification_id = {
            let _elevated = ElevatedAccess::acquire(self.ports.access.as_ref());
            self.ports.notifications.persist(&request).await?
        };
        tracing::info!(
            entity_id = entity.id(),
            recipient = recipient.user_id,
            notification_id,
            "Moderator notified of possible spam"
        );

        let email = self.send_summary(recipient, entity, detections).await;

        Ok(NotifyOutcome {
            notification_id,
            email,
        })
    }

    /// Leave the owner an in-app notice that the entity went to moderation.
    pub async fn notify_owner(&self, entity: &dyn ModeratedEntity) -> Result<u64, ModerationError> {
        let is_already_saved = entity.spam_block();
        let request = NotificationRequest {
            recipient_user_id: entity.owner_user_id(),
            message: self.owner_message(entity, MessageVariant::for_spam_block(is_already_saved)),
            entity_id: entity.id(),
            entity_url: entity.url().to_string(),
            is_already_saved,
        };
        let id = self.ports.notifications.persist(&request).await?;
        tracing::info!(
            entity_id = entity.id(),
            owner = entity.owner_user_id(),
            notification_id = id,
            "Owner notified of moderation"
        );
        Ok(id)
    }

    pub fn moderator_message(&self, entity: &dyn ModeratedEntity, variant: MessageVariant) -> String {
        let template = match variant {
            MessageVariant::AwaitingModeration => MESSAGE_AWAITING_MODERATION,
            MessageVariant::RequiresAdminPublish => MESSAGE_REQUIRES_ADMIN,
        };
        let name = escape_html(entity.name());
        let url = escape_html(entity.url());
        let message = self.ports.translator.translate(template);
        MESSAGE_PLACEHOLDER
            .replace_all(&message, |caps: &Captures<'_>| match &caps[1] {
                "name" => name.clone(),
                _ => url.clone(),
            })
            .into_owned()
    }

    pub fn owner_message(&self, entity: &dyn ModeratedEntity, variant: MessageVariant) -> String {
        let template = match variant {
            MessageVariant::AwaitingModeration => OWNER_AWAITING_MODERATION,
            MessageVariant::RequiresAdminPublish => OWNER_REQUIRES_ADMIN,
        };
        let label = self.ports.translator.translate(entity.kind().display_label());
        self.ports
            .translator
            .translate(template)
            .replace("{label}", &label)
            .replace("{name}", entity.name())
    }

    /// One line per detection: `Field: <label>, Terms: <a, b><br>`.
    pub fn detection_lines(&self, detections: &DetectionReport) -> Vec<String> {
        let translator = &self.ports.translator;
        detections
            .iter()
            .map(|detection| {
                let label = translator.translate(self.config.field_label(&detection.field));
                format!(
                    "{}: {}, {}: {}<br>",
                    translator.translate("Field"),
                    escape_html(&label),
                    translator.translate("Terms"),
                    escape_html(&detection.terms.join(", "))
                )
            })
            .collect()
    }

    async fn send_summary(
        &self,
        recipient: &RecipientProfile,
        entity: &dyn ModeratedEntity,
        detections: &DetectionReport,
    ) -> EmailOutcome {
        let Some(address) = recipient.admin_email() else {
            tracing::debug!(
                recipient = recipient.user_id,
                "No email address for recipient, skipping spam summary"
            );
            return EmailOutcome::NoAddress;
        };

        let site = &self.config.site;
        let params: TemplateParams = [
            ("siteName", site.site_name.clone()),
            ("name", entity.name().to_string()),
            ("id", entity.id().to_string()),
            ("url", entity.url().to_string()),
            ("baseUrl", site.base_url.clone()),
            ("detectedDetails", self.detection_lines(detections).join("\n")),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        let body = match self
            .ports
            .templates
            .render(&self.config.email_template, &params)
        {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(recipient = recipient.user_id, "Failed to render spam email: {}", e);
                return EmailOutcome::Failed;
            }
        };

        let message = MailMessage {
            from: site.mail_from.clone(),
            to: address.to_string(),
            subject: self.ports.translator.translate(EMAIL_SUBJECT),
            body,
        };

        match self.ports.mailer.send(&message).await {
            Ok(()) => {
                tracing::info!(recipient = recipient.user_id, "Spam summary email sent");
                EmailOutcome::Sent(message.to)
            }
            Err(e) => {
                tracing::warn!(recipient = recipient.user_id, "Failed to send spam email: {}", e);
                EmailOutcome::Failed
            }
        }
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

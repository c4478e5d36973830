// Moderation policy - pure decisions over a detection report.
//
// Callers pick the term subset: block terms for drafting and publish gating,
// block plus soft terms for notifications.

use super::moderation_models::{Actor, DetectionReport};

/// Outcome of the pre-save check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftDecision {
    /// Set the entity to draft and mark it spam-blocked.
    Demote,
    /// Leave status and marker as they are.
    Keep,
}

/// Outcome of a publish capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityDecision {
    /// Force the capability to false.
    Deny,
    /// Keep whatever the host decided.
    Defer,
}

impl CapabilityDecision {
    pub fn apply(self, default: bool) -> bool {
        match self {
            CapabilityDecision::Deny => false,
            CapabilityDecision::Defer => default,
        }
    }
}

pub fn draft_decision(block_report: &DetectionReport) -> DraftDecision {
    if block_report.is_empty() {
        DraftDecision::Keep
    } else {
        DraftDecision::Demote
    }
}

pub fn publish_decision(block_report: &DetectionReport, actor: &Actor) -> CapabilityDecision {
    if !block_report.is_empty() && !actor.is_admin {
        CapabilityDecision::Deny
    } else {
        CapabilityDecision::Defer
    }
}

pub fn should_notify(notification_report: &DetectionReport) -> bool {
    !notification_report.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::moderation_models::Detection;

    fn report_with(field: &str, term: &str) -> DetectionReport {
        DetectionReport::new(vec![Detection {
            field: field.to_string(),
            terms: vec![term.to_string()],
        }])
    }

    #[test]
    fn test_draft_decision() {
        assert_eq!(draft_decision(&report_with("name", "apk")), DraftDecision::Demote);
        assert_eq!(draft_decision(&DetectionReport::default()), DraftDecision::Keep);
    }

    #[test]
    fn test_publish_denied_only_for_non_admins() {
        let report = report_with("name", "apk");
        assert_eq!(publish_decision(&report, &Actor::user(1)), CapabilityDecision::Deny);
        assert_eq!(publish_decision(&report, &Actor::admin(2)), CapabilityDecision::Defer);
        assert_eq!(
            publish_decision(&DetectionReport::default(), &Actor::user(1)),
            CapabilityDecision::Defer
        );
    }

    #[test]
    fn test_defer_keeps_host_result() {
        assert!(CapabilityDecision::Defer.apply(true));
        assert!(!CapabilityDecision::Defer.apply(false));
        assert!(!CapabilityDecision::Deny.apply(true));
    }

    #[test]
    fn test_should_notify() {
        assert!(should_notify(&report_with("name", "venda")));
        assert!(!should_notify(&DetectionReport::default()));
    }
}

// Configuration for the spam detector.
//
// Defaults reproduce the deployment the filter was written for. Hosts
// override fields directly or through `infra::config::load_from_env`.

use super::moderation_models::{EntityKind, TermList};
use super::text_normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

const DEFAULT_SOFT_TERMS: &[&str] = &[
    "minecraft",
    "venda",
    "compra",
    "compre",
    "vendo",
    "vende",
    "nazismo",
    "fascismo",
    "hitler",
    "premium",
    "grátis",
    "gratuito",
    "download",
    "baixar",
    "vadia",
    "puta",
    "canalha",
];

const DEFAULT_BLOCK_TERMS: &[&str] = &[
    "citotec",
    "cytotec",
    "apk",
    "install",
    "installer",
    "instale",
    "instalar",
    "instalador",
];

const DEFAULT_ENTITIES: &[&str] = &["Agent", "Opportunity", "Project", "Space", "Event"];

const DEFAULT_FIELDS: &[&str] = &[
    "name",
    "shortDescription",
    "longDescription",
    "nomeSocial",
    "nomeCompleto",
    "comunidadesTradicionalOutros",
];

/// Email body used when no template file is configured.
pub const DEFAULT_EMAIL_TEMPLATE: &str = r#"<p>Possible spam was detected on <strong>{{siteName}}</strong>.</p>
<p><strong>{{name}}</strong> (ID {{id}}) contains terms that need review:</p>
<p>{{{detectedDetails}}}</p>
<p><a href="{{url}}">Review the content</a> or open <a href="{{baseUrl}}">{{siteName}}</a>.</p>
"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Term {0:?} normalizes to an empty string and would match every value")]
    EmptyTerm(String),

    #[error("Term {0:?} is configured as both a block term and a soft term")]
    OverlappingTerm(String),

    #[error("Field {0:?} is listed more than once")]
    DuplicateField(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// How detections share matched terms across the scanned fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorMode {
    /// Found terms carry over to every later field of the same scan, so a
    /// field's detection can list terms another field contained.
    #[default]
    Shared,
    /// Each field lists only the terms its own value contains.
    PerField,
}

impl std::str::FromStr for AccumulatorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(AccumulatorMode::Shared),
            "per_field" | "per-field" | "perfield" => Ok(AccumulatorMode::PerField),
            other => Err(ConfigError::InvalidValue {
                key: "accumulator".to_string(),
                reason: format!("unknown mode {other:?}"),
            }),
        }
    }
}

/// Site-wide values used in notification emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub base_url: String,
    pub mail_from: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Mapas Culturais".to_string(),
            base_url: "http://localhost/".to_string(),
            mail_from: "noreply@localhost".to_string(),
        }
    }
}

/// Configuration for the spam detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Soft terms: notify moderators only
    pub terms: Vec<String>,
    /// Hard-block terms: demote and gate publishing
    pub terms_block: Vec<String>,
    /// Entity types the hooks are registered for
    pub entities: Vec<EntityKind>,
    /// Field names scanned, in reporting order
    pub fields: Vec<String>,
    /// Display names for fields in the email summary
    pub field_labels: BTreeMap<String, String>,
    pub accumulator: AccumulatorMode,
    pub site: SiteSettings,
    pub email_template: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        let field_labels = [
            ("name", "Name"),
            ("shortDescription", "Short description"),
            ("longDescription", "Long description"),
        ]
        .into_iter()
        .map(|(field, label)| (field.to_string(), label.to_string()))
        .collect();

        Self {
            terms: to_strings(DEFAULT_SOFT_TERMS),
            terms_block: to_strings(DEFAULT_BLOCK_TERMS),
            entities: DEFAULT_ENTITIES.iter().map(|e| e.to_string().into()).collect(),
            fields: to_strings(DEFAULT_FIELDS),
            field_labels,
            accumulator: AccumulatorMode::default(),
            site: SiteSettings::default(),
            email_template: DEFAULT_EMAIL_TEMPLATE.to_string(),
        }
    }
}

impl ModerationConfig {
    /// Check the invariants the matcher relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut block_forms = HashSet::new();
        for term in &self.terms_block {
            let normalized = normalize(term);
            if normalized.is_empty() {
                return Err(ConfigError::EmptyTerm(term.clone()));
            }
            block_forms.insert(normalized);
        }

        for term in &self.terms {
            let normalized = normalize(term);
            if normalized.is_empty() {
                return Err(ConfigError::EmptyTerm(term.clone()));
            }
            if block_forms.contains(&normalized) {
                return Err(ConfigError::OverlappingTerm(term.clone()));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(ConfigError::DuplicateField(field.clone()));
            }
        }

        Ok(())
    }

    pub fn term_list(&self) -> TermList {
        TermList {
            block: self.terms_block.clone(),
            soft: self.terms.clone(),
        }
    }

    pub fn guards(&self, kind: &EntityKind) -> bool {
        self.entities.contains(kind)
    }

    /// Display name for a field, or the raw field name when unmapped.
    pub fn field_label<'a>(&'a self, field: &'a str) -> &'a str {
        self.field_labels
            .get(field)
            .map(String::as_str)
            .unwrap_or(field)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ModerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entities.len(), 5);
        assert!(config.guards(&EntityKind::Agent));
        assert!(!config.guards(&EntityKind::Other("Seal".into())));
        assert_eq!(config.accumulator, AccumulatorMode::Shared);
    }

    #[test]
    fn test_rejects_term_that_normalizes_to_nothing() {
        let config = ModerationConfig {
            terms: vec!["!!!".into()],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyTerm("!!!".into()))
        );
    }

    #[test]
    fn test_rejects_overlapping_lists_after_normalization() {
        let config = ModerationConfig {
            terms: vec!["A.P.K".into()],
            terms_block: vec!["apk".into()],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OverlappingTerm("A.P.K".into()))
        );
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let config = ModerationConfig {
            fields: vec!["name".into(), "name".into()],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateField("name".into()))
        );
    }

    #[test]
    fn test_field_label_falls_back_to_raw_name() {
        let config = ModerationConfig::default();
        assert_eq!(config.field_label("shortDescription"), "Short description");
        assert_eq!(config.field_label("nomeSocial"), "nomeSocial");
    }

    #[test]
    fn test_accumulator_mode_parsing() {
        assert_eq!("shared".parse(), Ok(AccumulatorMode::Shared));
        assert_eq!("Per-Field".parse(), Ok(AccumulatorMode::PerField));
        assert!("sometimes".parse::<AccumulatorMode>().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ModerationConfig =
            serde_json::from_str(r#"{ "terms_block": ["apk"], "accumulator": "per_field" }"#)
                .unwrap();
        assert_eq!(config.terms_block, vec!["apk"]);
        assert_eq!(config.accumulator, AccumulatorMode::PerField);
        assert_eq!(config.fields.len(), 6);
    }
}

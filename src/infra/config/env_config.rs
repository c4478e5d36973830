// Environment-driven configuration for the spam detector.
//
// Every variable is optional; unset ones keep the defaults from
// `ModerationConfig::default()`. List variables accept a JSON array
// (`["apk","install"]`) or a comma-separated string (`apk, install`).

use crate::core::moderation::{ConfigError, EntityKind, ModerationConfig};

pub const ENV_TERMS: &str = "SPAM_DETECTOR_TERMS";
pub const ENV_TERMS_BLOCK: &str = "SPAM_DETECTOR_TERMS_BLOCK";
pub const ENV_ENTITIES: &str = "SPAM_DETECTOR_ENTITIES";
pub const ENV_FIELDS: &str = "SPAM_DETECTOR_FIELDS";
pub const ENV_ACCUMULATOR: &str = "SPAM_DETECTOR_ACCUMULATOR";
pub const ENV_EMAIL_TEMPLATE_FILE: &str = "SPAM_DETECTOR_EMAIL_TEMPLATE_FILE";
pub const ENV_SITE_NAME: &str = "SITE_NAME";
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_MAILER_FROM: &str = "MAILER_FROM";

/// Build and validate the configuration from the process environment.
pub fn load_from_env() -> Result<ModerationConfig, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Build and validate the configuration from an arbitrary variable source.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<ModerationConfig, ConfigError> {
    let mut config = ModerationConfig::default();

    if let Some(raw) = lookup(ENV_TERMS) {
        config.terms = parse_list(ENV_TERMS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_TERMS_BLOCK) {
        config.terms_block = parse_list(ENV_TERMS_BLOCK, &raw)?;
    }
    if let Some(raw) = lookup(ENV_ENTITIES) {
        config.entities = parse_list(ENV_ENTITIES, &raw)?
            .into_iter()
            .map(EntityKind::from)
            .collect();
    }
    if let Some(raw) = lookup(ENV_FIELDS) {
        config.fields = parse_list(ENV_FIELDS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_ACCUMULATOR) {
        config.accumulator = raw.parse()?;
    }
    if let Some(path) = lookup(ENV_EMAIL_TEMPLATE_FILE) {
        config.email_template =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::InvalidValue {
                key: ENV_EMAIL_TEMPLATE_FILE.to_string(),
                reason: format!("cannot read {}: {}", path, e),
            })?;
    }
    if let Some(site_name) = lookup(ENV_SITE_NAME) {
        config.site.site_name = site_name;
    }
    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.site.base_url = base_url;
    }
    if let Some(mail_from) = lookup(ENV_MAILER_FROM) {
        config.site.mail_from = mail_from;
    }

    config.validate()?;
    tracing::debug!(
        soft_terms = config.terms.len(),
        block_terms = config.terms_block.len(),
        fields = config.fields.len(),
        "Spam detector configuration loaded"
    );
    Ok(config)
}

fn parse_list(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
        });
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::AccumulatorMode;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unset_variables_keep_defaults() {
        let config = load_from(vars(&[])).unwrap();
        assert_eq!(config, ModerationConfig::default());
    }

    #[test]
    fn test_json_and_comma_lists() {
        let config = load_from(vars(&[
            (ENV_TERMS_BLOCK, r#"["apk", "cytotec"]"#),
            (ENV_TERMS, " venda, compre ,, "),
            (ENV_ENTITIES, "Agent,Space,Seal"),
            (ENV_FIELDS, r#"["name"]"#),
            (ENV_ACCUMULATOR, "per_field"),
            (ENV_SITE_NAME, "Mapa da Cultura"),
        ]))
        .unwrap();

        assert_eq!(config.terms_block, vec!["apk", "cytotec"]);
        assert_eq!(config.terms, vec!["venda", "compre"]);
        assert_eq!(
            config.entities,
            vec![
                EntityKind::Agent,
                EntityKind::Space,
                EntityKind::Other("Seal".into())
            ]
        );
        assert_eq!(config.fields, vec!["name"]);
        assert_eq!(config.accumulator, AccumulatorMode::PerField);
        assert_eq!(config.site.site_name, "Mapa da Cultura");
    }

    #[test]
    fn test_malformed_json_list_is_rejected() {
        let err = load_from(vars(&[(ENV_TERMS, "[\"apk\"")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_TERMS));
    }

    #[test]
    fn test_loaded_config_is_validated() {
        let err = load_from(vars(&[(ENV_TERMS, "apk"), (ENV_TERMS_BLOCK, "APK")])).unwrap_err();
        assert_eq!(err, ConfigError::OverlappingTerm("apk".into()));
    }

    #[test]
    fn test_email_template_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<p>{{name}}</p>").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = load_from(vars(&[(ENV_EMAIL_TEMPLATE_FILE, path.as_str())])).unwrap();
        assert_eq!(config.email_template, "<p>{{name}}</p>");

        let err = load_from(vars(&[(ENV_EMAIL_TEMPLATE_FILE, "/nonexistent/template.html")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

// Host-side content record.
//
// A single record type covers every entity type; the `kind` tag selects the
// display label and whether the spam detector guards it.

use crate::core::moderation::{
    EntityId, EntityKind, EntityStatus, ModeratedEntity, Scope, SubsiteId, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn default_status() -> EntityStatus {
    EntityStatus::Enabled
}

/// A user-generated content item as the host stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub kind: EntityKind,
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub owner_user_id: UserId,
    #[serde(default)]
    pub subsite_id: Option<SubsiteId>,
    /// Free-form metadata fields (descriptions, social names, ...).
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default = "default_status")]
    pub status: EntityStatus,
    #[serde(default)]
    pub spam_block: bool,
}

impl ContentRecord {
    pub fn new(kind: EntityKind, id: EntityId, name: impl Into<String>, owner_user_id: UserId) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
            url: String::new(),
            owner_user_id,
            subsite_id: None,
            fields: BTreeMap::new(),
            status: EntityStatus::Enabled,
            spam_block: false,
        }
    }

    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn in_subsite(mut self, subsite_id: SubsiteId) -> Self {
        self.subsite_id = Some(subsite_id);
        self
    }
}

/// Text form of a metadata value. Null and `false` read as absent; zero is a value.
fn coerce_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(coerce_to_text).collect();
            Some(parts.join(" "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

impl ModeratedEntity for ContentRecord {
    fn kind(&self) -> &EntityKind {
        &self.kind
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    fn scope(&self) -> Scope {
        match self.subsite_id {
            Some(id) => Scope::Subsite(id),
            None => Scope::Global,
        }
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "name" => Some(self.name.clone()),
            _ => self.fields.get(field).and_then(coerce_to_text),
        };
        value.filter(|v| !v.is_empty())
    }

    fn status(&self) -> EntityStatus {
        self.status
    }

    fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }

    fn spam_block(&self) -> bool {
        self.spam_block
    }

    fn set_spam_block(&mut self, blocked: bool) {
        self.spam_block = blocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_values_are_coerced_to_text() {
        let record = ContentRecord::new(EntityKind::Agent, 1, "Ana", 2)
            .with_field("shortDescription", "hello")
            .with_field("count", 12)
            .with_field("flag", true)
            .with_field("off", false)
            .with_field("nothing", Value::Null)
            .with_field("tags", json!(["apk", 3, null]))
            .with_field("empty", "");

        assert_eq!(record.field_value("name").as_deref(), Some("Ana"));
        assert_eq!(record.field_value("shortDescription").as_deref(), Some("hello"));
        assert_eq!(record.field_value("count").as_deref(), Some("12"));
        assert_eq!(record.field_value("flag").as_deref(), Some("1"));
        assert_eq!(record.field_value("off"), None);
        assert_eq!(record.field_value("nothing"), None);
        assert_eq!(record.field_value("tags").as_deref(), Some("apk 3"));
        assert_eq!(record.field_value("empty"), None);
        assert_eq!(record.field_value("missing"), None);
    }

    #[test]
    fn test_zero_reads_as_present() {
        let record = ContentRecord::new(EntityKind::Agent, 1, "Ana", 2)
            .with_field("count", 0)
            .with_field("code", "0");

        assert_eq!(record.field_value("count").as_deref(), Some("0"));
        assert_eq!(record.field_value("code").as_deref(), Some("0"));
    }

    #[test]
    fn test_scope_follows_subsite() {
        let record = ContentRecord::new(EntityKind::Space, 1, "Teatro", 2);
        assert_eq!(record.scope(), Scope::Global);
        assert_eq!(record.in_subsite(8).scope(), Scope::Subsite(8));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let record: ContentRecord = serde_json::from_str(
            r#"{ "kind": "Event", "id": 5, "name": "Show", "owner_user_id": 9,
                 "fields": { "longDescription": "<p>Baixar grátis</p>" } }"#,
        )
        .unwrap();
        assert_eq!(record.kind, EntityKind::Event);
        assert_eq!(record.status, EntityStatus::Enabled);
        assert!(!record.spam_block);
        assert_eq!(
            record.field_value("longDescription").as_deref(),
            Some("<p>Baixar grátis</p>")
        );
    }
}

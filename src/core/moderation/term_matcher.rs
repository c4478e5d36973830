// Term matcher - scans configured entity fields for configured terms.
//
// Terms and values are both normalized, so matching is plain substring
// containment on alphanumeric runs. The matcher only reads the entity.

use super::moderation_config::AccumulatorMode;
use super::moderation_models::{Detection, DetectionReport};
use super::moderation_ports::ModeratedEntity;
use super::text_normalizer::normalize;

/// A term together with its normalized form.
#[derive(Debug, Clone)]
struct PreparedTerm<'a> {
    raw: &'a str,
    normalized: String,
}

/// Scans entity fields against a term list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermMatcher {
    mode: AccumulatorMode,
}

impl TermMatcher {
    pub fn new(mode: AccumulatorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AccumulatorMode {
        self.mode
    }

    /// Scan `fields` of `entity` for `terms`.
    ///
    /// Empty or absent fields are skipped and never produce a detection.
    /// Each detection lists distinct terms (by normalized form) in the order
    /// they were first found, reported in their configured spelling.
    ///
    /// With [`AccumulatorMode::Shared`] the found-terms list is not reset
    /// between fields: once a term matched, every later non-empty field
    /// reports it too, so terms lists grow monotonically in scan order.
    pub fn scan<T: AsRef<str>>(
        &self,
        entity: &dyn ModeratedEntity,
        fields: &[String],
        terms: &[T],
    ) -> DetectionReport {
        let prepared: Vec<PreparedTerm<'_>> = terms
            .iter()
            .map(|term| PreparedTerm {
                raw: term.as_ref(),
                normalized: normalize(term.as_ref()),
            })
            .filter(|term| !term.normalized.is_empty())
            .collect();

        let mut detections = Vec::new();
        let mut found: Vec<&PreparedTerm<'_>> = Vec::new();

        for field in fields {
            let value = match entity.field_value(field) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };
            let normalized_value = normalize(&value);

            if self.mode == AccumulatorMode::PerField {
                found.clear();
            }

            for term in &prepared {
                let already_found = found.iter().any(|f| f.normalized == term.normalized);
                if !already_found && normalized_value.contains(&term.normalized) {
                    found.push(term);
                }
            }

            if !found.is_empty() {
                tracing::debug!(
                    entity_id = entity.id(),
                    field = field.as_str(),
                    terms = found.len(),
                    "Spam terms detected in field"
                );
                detections.push(Detection {
                    field: field.clone(),
                    terms: found.iter().map(|t| t.raw.to_string()).collect(),
                });
            }
        }

        DetectionReport::new(detections)
    }
}

// ============================================================================
// TESTS
// ============================================================================

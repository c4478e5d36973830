//! Mustache-style variable substitution for email templates.
//!
//! Supports the variable subset of mustache the spam emails need:
//! `{{name}}` inserts an HTML-escaped value, `{{{name}}}` and `{{& name}}`
//! insert it raw. Unknown variables render as an empty string. A stray `}}`
//! is literal text; an opening `{{` that starts no variable tag is an error.
//! Sections and partials are not supported.

use crate::core::moderation::{escape_html, ModerationError, TemplateParams, TemplateRenderer};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\s*([\w.-]+)\s*\}\}\}|\{\{(&?)\s*([\w.-]+)\s*\}\}").unwrap()
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MustacheRenderer;

impl MustacheRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for MustacheRenderer {
    fn render(&self, template: &str, params: &TemplateParams) -> Result<String, ModerationError> {
        if VARIABLE.split(template).any(|text| text.contains("{{")) {
            return Err(ModerationError::TemplateError(
                "unclosed mustache tag".to_string(),
            ));
        }

        let rendered = VARIABLE.replace_all(template, |caps: &Captures<'_>| {
            if let Some(raw) = caps.get(1) {
                return params.get(raw.as_str()).cloned().unwrap_or_default();
            }
            let unescaped = caps.get(2).is_some_and(|m| m.as_str() == "&");
            let value = caps
                .get(3)
                .and_then(|name| params.get(name.as_str()))
                .map(String::as_str)
                .unwrap_or_default();
            if unescaped {
                value.to_string()
            } else {
                escape_html(value)
            }
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_double_braces_escape_triple_braces_do_not() {
        let out = MustacheRenderer::new()
            .render(
                "<p>{{name}}</p>{{{details}}}{{& details}}",
                &params(&[("name", "<Tom & Jerry>"), ("details", "a<br>")]),
            )
            .unwrap();
        assert_eq!(out, "<p>&lt;Tom &amp; Jerry&gt;</p>a<br>a<br>");
    }

    #[test]
    fn test_whitespace_and_unknown_variables() {
        let out = MustacheRenderer::new()
            .render("[{{ siteName }}][{{missing}}]", &params(&[("siteName", "Mapas")]))
            .unwrap();
        assert_eq!(out, "[Mapas][]");
    }

    #[test]
    fn test_unclosed_tag_is_rejected() {
        let result = MustacheRenderer::new().render("{{name}", &params(&[]));
        assert!(matches!(result, Err(ModerationError::TemplateError(_))));

        let result = MustacheRenderer::new().render("<p>{{name}}</p>{{ oops", &params(&[]));
        assert!(matches!(result, Err(ModerationError::TemplateError(_))));
    }

    #[test]
    fn test_stray_closing_braces_are_literal() {
        let out = MustacheRenderer::new()
            .render(
                "<style>@media (max-width:600px){p{margin:0}}</style><p>{{name}}</p>",
                &params(&[("name", "Ana")]),
            )
            .unwrap();
        assert_eq!(
            out,
            "<style>@media (max-width:600px){p{margin:0}}</style><p>Ana</p>"
        );

        let out = MustacheRenderer::new()
            .render(r#"<script>var o = {a: {b: 1}};</script>{{{x}}}"#, &params(&[("x", "<br>")]))
            .unwrap();
        assert_eq!(out, r#"<script>var o = {a: {b: 1}};</script><br>"#);
    }

    #[test]
    fn test_default_email_template_renders() {
        use crate::core::moderation::DEFAULT_EMAIL_TEMPLATE;

        let out = MustacheRenderer::new()
            .render(
                DEFAULT_EMAIL_TEMPLATE,
                &params(&[
                    ("siteName", "Mapas"),
                    ("name", "Free APK"),
                    ("id", "42"),
                    ("url", "https://example.org/agent/42"),
                    ("baseUrl", "https://example.org/"),
                    ("detectedDetails", "Field: Name, Terms: apk<br>"),
                ]),
            )
            .unwrap();
        assert!(out.contains("<strong>Free APK</strong> (ID 42)"));
        assert!(out.contains("Field: Name, Terms: apk<br>"));
        assert!(out.contains(r#"<a href="https://example.org/agent/42">"#));
    }
}

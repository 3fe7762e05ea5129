//! Email template rendering engine.
//!
//! Each catalog body is registered under `{TYPE}.{lang}`. Lookup falls back
//! to the base language, then to a generic placeholder for the requested
//! language.

mod catalog;

use chrono::{Datelike, Utc};
use handlebars::Handlebars;
use serde_json::json;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::error::NotificationResult;
use crate::localization::Language;
use crate::models::{Metadata, NotificationType};
use catalog::Entry;

const LAYOUT_TEMPLATE: &str = "layout";

/// Rendered email content.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    /// Plain-text alternative derived from the HTML.
    pub text: String,
}

/// Renders localized notification emails.
pub struct EmailRenderer {
    handlebars: Handlebars<'static>,
    subjects: HashMap<String, &'static str>,
    site_url: String,
}

impl EmailRenderer {
    /// Create a renderer with every catalog template registered.
    pub fn new(site_url: impl Into<String>) -> NotificationResult<Self> {
        Self::with_catalog(site_url, catalog::CATALOG)
    }

    fn with_catalog(site_url: impl Into<String>, entries: &[Entry]) -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        let mut subjects = HashMap::new();

        handlebars.register_template_string(LAYOUT_TEMPLATE, catalog::LAYOUT)?;

        for language in Language::iter() {
            handlebars.register_template_string(&footer_key(language), catalog::footer(language))?;

            let (subject, body) = catalog::placeholder(language);
            let key = placeholder_key(language);
            handlebars.register_template_string(&key, body)?;
            subjects.insert(key, subject);
        }

        for entry in entries {
            let key = template_key(entry.kind, entry.language);
            handlebars.register_template_string(&key, entry.body)?;
            subjects.insert(key, entry.subject);
        }

        Ok(Self {
            handlebars,
            subjects,
            site_url: site_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Template name used for `kind` in `language` after fallbacks.
    fn resolve(&self, kind: NotificationType, language: Language) -> String {
        [
            template_key(kind, language),
            template_key(kind, Language::default()),
        ]
        .into_iter()
        .find(|key| self.handlebars.has_template(key))
        .unwrap_or_else(|| placeholder_key(language))
    }

    /// Render the subject and body of a notification email.
    pub fn render(
        &self,
        kind: NotificationType,
        metadata: &Metadata,
        language: Language,
    ) -> NotificationResult<RenderedEmail> {
        let key = self.resolve(kind, language);
        debug!(notification_type = %kind, template = %key, "Rendering email");

        let subject = self
            .subjects
            .get(&key)
            .copied()
            .unwrap_or_default()
            .to_string();

        let data = json!({
            "site_url": self.site_url,
            "metadata": metadata,
            "year": Utc::now().year(),
        });

        let content = self.handlebars.render(&key, &data)?;
        let footer = self.handlebars.render(&footer_key(language), &data)?;

        let html = self.handlebars.render(
            LAYOUT_TEMPLATE,
            &json!({
                "lang": language.code(),
                "subject": subject,
                "logo_url": format!("{}/images/logo-nobg.webp", self.site_url),
                "content": content,
                "footer": footer,
            }),
        )?;

        let text = html_to_text(&format!("{content}\n{footer}"));

        Ok(RenderedEmail {
            subject,
            html,
            text,
        })
    }
}

fn template_key(kind: NotificationType, language: Language) -> String {
    format!("{kind}.{language}")
}

fn placeholder_key(language: Language) -> String {
    format!("placeholder.{language}")
}

fn footer_key(language: Language) -> String {
    format!("footer.{language}")
}

/// Plain-text rendering of an HTML fragment. Links keep their target in
/// parentheses after the label.
fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_href: Option<String> = None;
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = "";
            break;
        };
        let tag = &rest[start + 1..start + end];
        rest = &rest[start + end + 1..];

        let name = tag
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if tag.starts_with('/') {
            if name == "a" {
                if let Some(href) = pending_href.take() {
                    out.push_str(&format!(" ({href})"));
                }
            }
            if matches!(name.as_str(), "p" | "h2" | "li" | "ul") {
                out.push('\n');
            }
        } else if name == "a" {
            pending_href = attribute(tag, "href");
        } else if name == "li" {
            out.push_str("- ");
        }
    }
    out.push_str(rest);

    let text = decode_entities(&out);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let marker = format!("{name}=\"");
    let start = tag.find(&marker)? + marker.len();
    let len = tag[start..].find('"')?;
    Some(tag[start..start + len].to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&#x3D;", "=")
        .replace("&#x27;", "'")
        .replace("&#x60;", "`")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

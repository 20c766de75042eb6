//! The formatting seam: whatever turns a message descriptor into text.

use livetrack_core::messages::{Messages, flatten_messages};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies a message to format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Used when the catalog has no entry for `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_message: Option<String>,

    /// Context for translators; never rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MessageDescriptor {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_default_message(mut self, message: impl Into<String>) -> Self {
        self.default_message = Some(message.into());
        self
    }
}

/// Placeholder values for interpolation.
pub type FormatValues = HashMap<String, String>;

/// What a formatter produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Formatted {
    /// Plain text, the only kind the live editor can trace
    Text(String),
    /// Rich output (markup fragments, components) left to the host
    Rich(Vec<serde_json::Value>),
}

impl Formatted {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Formatted::Text(text) => Some(text),
            Formatted::Rich(_) => None,
        }
    }
}

/// The host formatting library, seen from the tracker.
pub trait MessageFormatter: Send + Sync {
    fn locale(&self) -> &str;

    fn format_message(&self, descriptor: &MessageDescriptor, values: Option<&FormatValues>)
    -> Formatted;
}

/// A catalog-backed formatter with `{name}` interpolation.
///
/// Lookup falls back from the catalog to the descriptor's default message,
/// then to the id itself.
#[derive(Debug, Clone)]
pub struct CatalogFormatter {
    locale: String,
    catalog: HashMap<String, String>,
}

impl CatalogFormatter {
    pub fn new(locale: impl Into<String>, messages: &Messages) -> Self {
        Self {
            locale: locale.into(),
            catalog: flatten_messages(messages).into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

impl MessageFormatter for CatalogFormatter {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn format_message(
        &self,
        descriptor: &MessageDescriptor,
        values: Option<&FormatValues>,
    ) -> Formatted {
        let template = descriptor
            .id
            .as_ref()
            .and_then(|id| self.catalog.get(id))
            .or(descriptor.default_message.as_ref())
            .or(descriptor.id.as_ref())
            .map(String::as_str)
            .unwrap_or_default();

        Formatted::Text(interpolate(template, values))
    }
}

/// Replace `{name}` placeholders. Unknown names are left as written.
pub fn interpolate(template: &str, values: Option<&FormatValues>) -> String {
    let Some(values) = values.filter(|v| !v.is_empty()) else {
        return template.to_string();
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = after[..close].trim();
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

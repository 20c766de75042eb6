//! Tracking entries: what the live editor learns about one rendered value.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Everything known about one rendered text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Content identifiers known to render to this exact value.
    /// Never empty; only grows.
    pub ids: IndexSet<String>,

    /// Kind of tracked content
    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub metadata: EntryMetadata,
}

/// Trackable content kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Language of the most recent tracking event (not accumulated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Most recent tracking event; drives eviction order
    #[serde(rename = "trackedAt", with = "chrono::serde::ts_milliseconds")]
    pub tracked_at: DateTime<Utc>,
}

impl TrackingEntry {
    pub fn new(id: &str, language: Option<&str>, tracked_at: DateTime<Utc>) -> Self {
        let mut ids = IndexSet::new();
        ids.insert(id.to_string());
        Self {
            ids,
            kind: EntryKind::Text,
            metadata: EntryMetadata {
                language: language.map(str::to_string),
                tracked_at,
            },
        }
    }

    /// Record another tracking event for the same value.
    pub(crate) fn touch(&mut self, id: &str, language: Option<&str>, tracked_at: DateTime<Utc>) {
        if !self.ids.contains(id) {
            self.ids.insert(id.to_string());
        }
        self.metadata.language = language.map(str::to_string);
        self.metadata.tracked_at = tracked_at;
    }
}

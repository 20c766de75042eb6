//! Diagnostic dump of the tracking store.

use crate::entry::TrackingEntry;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

const PREVIEW_ROWS: usize = 10;
const PREVIEW_VALUE_CHARS: usize = 50;

/// A read-only snapshot: total size and a preview of the first entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugDump {
    pub total: usize,
    pub preview: Vec<PreviewRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    /// Value truncated to 50 characters
    pub value: String,
    /// Identifiers joined with ", "
    pub keys: String,
}

impl DebugDump {
    pub(crate) fn from_entries(entries: &IndexMap<String, TrackingEntry>) -> Self {
        let preview = entries
            .iter()
            .take(PREVIEW_ROWS)
            .map(|(value, entry)| PreviewRow {
                value: value.chars().take(PREVIEW_VALUE_CHARS).collect(),
                keys: entry
                    .ids
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        Self {
            total: entries.len(),
            preview,
        }
    }

    /// Entries not shown in the preview.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.preview.len())
    }
}

impl fmt::Display for DebugDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total entries: {}", self.total)?;
        if self.preview.is_empty() {
            return Ok(());
        }

        let width = self
            .preview
            .iter()
            .map(|row| row.value.chars().count())
            .max()
            .unwrap_or(0)
            .max("value".len());

        writeln!(f, "  {:<width$} | keys", "value")?;
        writeln!(f, "  {}-+-{}", "-".repeat(width), "-".repeat(4))?;
        for row in &self.preview {
            writeln!(f, "  {:<width$} | {}", row.value, row.keys)?;
        }
        if self.remaining() > 0 {
            writeln!(f, "... and {} more entries", self.remaining())?;
        }
        Ok(())
    }
}

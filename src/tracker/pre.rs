//! Raw pass record stream.

use crate::error::Result;
use crate::fonts::FontHistogram;
use crate::tracker::TrackerEntry;
use std::path::Path;

/// Appends one record per extracted region, without merging or classifying.
///
/// The raw stream is written once per chapter so that font classification
/// and joining can be rerun without detecting pages again.
#[derive(Debug, Default)]
pub struct PreTracker {
    entries: Vec<TrackerEntry>,
}

impl PreTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one region and return the stored record.
    pub fn add_entry(
        &mut self,
        pg: u32,
        label_type: Option<String>,
        label: usize,
        txt: impl Into<String>,
        fonts: FontHistogram,
        bbox: Option<[f32; 4]>,
    ) -> &TrackerEntry {
        let entry = TrackerEntry::new(pg, label_type, label, txt, fonts).with_bbox(bbox);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Records in insertion order.
    pub fn entries(&self) -> &[TrackerEntry] {
        &self.entries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the chapter document.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        TrackerEntry::write_all(path, &self.entries)
    }
}

impl Extend<TrackerEntry> for PreTracker {
    fn extend<I: IntoIterator<Item = TrackerEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

//! Chapter record streams.
//!
//! Both passes over a book produce the same document: a JSON array of
//! [`TrackerEntry`] objects, one file per chapter.
//!
//! - [`PreTracker`] records every extracted region verbatim (raw pass)
//! - [`JoinTracker`] replays raw records into logical blocks (clean pass)
//! - [`CaptionLinker`] ties figure captions back to their figure

pub mod caption;
pub mod join;
pub mod pre;

pub use caption::{CaptionLinker, CAPTION_TAG_PREFIX, DEFAULT_CAPTION_GAP};
pub use join::{DropReason, JoinOutcome, JoinTracker};
pub use pre::PreTracker;

use crate::error::Result;
use crate::fonts::FontHistogram;
use crate::layout::LabelType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// One committed record: a region, or a block of joined regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerEntry {
    /// Page number of each joined fragment
    pub pgs: Vec<u32>,
    /// Region label, a caption tag, or `null` for native text boxes
    pub label_type: Option<String>,
    /// Reading-order index of each joined fragment on its page
    pub labels: Vec<usize>,
    /// Text of the record
    pub txt: String,
    /// Font usage of the record
    pub fonts: FontHistogram,
    /// Bounding box of the first fragment as page fractions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,
}

impl TrackerEntry {
    /// Create a single-fragment record.
    pub fn new(
        pg: u32,
        label_type: Option<String>,
        label: usize,
        txt: impl Into<String>,
        fonts: FontHistogram,
    ) -> Self {
        Self {
            pgs: vec![pg],
            label_type,
            labels: vec![label],
            txt: txt.into(),
            fonts,
            bbox: None,
        }
    }

    /// Attach the page-relative bounding box.
    pub fn with_bbox(mut self, bbox: Option<[f32; 4]>) -> Self {
        self.bbox = bbox;
        self
    }

    /// First page of the record.
    pub fn page(&self) -> u32 {
        self.pgs.first().copied().unwrap_or(0)
    }

    /// First label index of the record.
    pub fn label(&self) -> usize {
        self.labels.first().copied().unwrap_or(0)
    }

    /// Parsed detector label, `None` for null or synthetic labels.
    pub fn label_kind(&self) -> Option<LabelType> {
        self.label_type.as_deref().and_then(LabelType::from_name)
    }

    /// Read a chapter document.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<TrackerEntry>> {
        let file = fs::File::open(path.as_ref())?;
        let entries = serde_json::from_reader(BufReader::new(file))?;
        Ok(entries)
    }

    /// Write a chapter document.
    pub fn write_all(path: impl AsRef<Path>, entries: &[TrackerEntry]) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), entries)?;
        log::debug!("Wrote {} records to {}", entries.len(), path.display());
        Ok(())
    }
}

//! Clean pass: raw records to logical blocks.
//!
//! Records are replayed in page and reading order. Each one is either
//! dropped as boilerplate, appended to the previous block as a continuation,
//! or committed as a new block.
//!
//! A record continues the previous block when both are running text of the
//! same kind and the previous block does not end a sentence. The kind of a
//! record comes from its dominant font looked up in the book's
//! [`FontClassification`], falling back to its label.

use crate::config::{BookConfig, JoinConfig};
use crate::error::Result;
use crate::fonts::{FontClassification, FontHistogram, FontKind};
use crate::layout::LabelType;
use crate::text::{join_fragments, term_str, HyphenJoiner};
use crate::tracker::caption::CaptionLinker;
use crate::tracker::TrackerEntry;
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Why a record was left out of the clean stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Noise-font record with an ignorable label
    Boilerplate(LabelType),
    /// Text region without text
    EmptyText,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boilerplate(label) => write!(f, "boilerplate {}", label),
            Self::EmptyText => f.write_str("empty text"),
        }
    }
}

/// Result of feeding one record to a [`JoinTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Started block at this index
    Committed(usize),
    /// Appended to the block at this index
    Merged(usize),
    /// Not recorded
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy)]
struct Tail {
    kind: FontKind,
    continuable: bool,
}

/// Reconstructs logical blocks from a chapter's raw records.
///
/// # Examples
///
/// ```
/// use pdf_stitch::config::JoinConfig;
/// use pdf_stitch::fonts::{FontClassification, FontHistogram};
/// use pdf_stitch::tracker::{JoinOutcome, JoinTracker};
///
/// let mut tracker = JoinTracker::new(FontClassification::default(), JoinConfig::default());
/// let text = Some("plain text");
/// tracker.add_entry(1, text, 0, "The lesion lies in the", FontHistogram::new(), None);
/// let outcome = tracker.add_entry(2, text, 0, "right upper lobe.", FontHistogram::new(), None);
///
/// assert_eq!(outcome, JoinOutcome::Merged(0));
/// assert_eq!(tracker.entries()[0].txt, "The lesion lies in the right upper lobe.");
/// assert_eq!(tracker.entries()[0].pgs, vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct JoinTracker {
    fonts: FontClassification,
    config: JoinConfig,
    joiner: HyphenJoiner,
    linker: CaptionLinker,
    entries: Vec<TrackerEntry>,
    captions: IndexMap<String, String>,
    tail: Option<Tail>,
}

impl JoinTracker {
    /// Create a tracker with a font classification and joining settings.
    pub fn new(fonts: FontClassification, config: JoinConfig) -> Self {
        let linker = CaptionLinker::new(config.caption_gap);
        Self {
            fonts,
            config,
            joiner: HyphenJoiner::new(),
            linker,
            entries: Vec::new(),
            captions: IndexMap::new(),
            tail: None,
        }
    }

    /// Create a tracker from a book's stored fonts and joining settings.
    pub fn from_config(config: &BookConfig) -> Self {
        let fonts = match config.fonts() {
            Some(fonts) => fonts.clone(),
            None => {
                log::warn!("No font classification stored; record kinds come from labels only");
                FontClassification::default()
            },
        };
        Self::new(fonts, config.join.clone())
    }

    /// Use a custom hyphen joiner.
    pub fn with_joiner(mut self, joiner: HyphenJoiner) -> Self {
        self.joiner = joiner;
        self
    }

    /// Kind of a record: its dominant font's class, else its label's kind.
    pub fn effective_kind(&self, label_type: Option<&str>, fonts: &FontHistogram) -> FontKind {
        fonts
            .top()
            .and_then(|font| self.fonts.kind_of(font))
            .unwrap_or_else(|| FontKind::from_label(label_type))
    }

    fn is_ignorable(&self, label: LabelType, txt: &str) -> bool {
        if self.config.always_ignore.contains(&label) {
            return true;
        }
        self.config.ignore_when_short.contains(&label)
            && txt.trim().chars().count() < self.config.short_text_max
    }

    /// Feed one raw record.
    ///
    /// # Arguments
    ///
    /// * `pg` - Page number
    /// * `label_type` - Raw label, caption tag, or `None` for native text boxes
    /// * `label` - Reading-order index on the page
    /// * `txt` - Extracted text
    /// * `fonts` - Font usage of the record
    /// * `bbox` - Page-relative bounding box, if known
    pub fn add_entry(
        &mut self,
        pg: u32,
        label_type: Option<&str>,
        label: usize,
        txt: &str,
        fonts: FontHistogram,
        bbox: Option<[f32; 4]>,
    ) -> JoinOutcome {
        let parsed = label_type.and_then(LabelType::from_name);
        let kind = self.effective_kind(label_type, &fonts);

        if let Some(l) = parsed {
            if kind == FontKind::Noise && self.is_ignorable(l, txt) {
                log::debug!("Dropping {} on page {} (label {})", l, pg, label);
                return JoinOutcome::Dropped(DropReason::Boilerplate(l));
            }
        }

        let text_like = label_type.is_none() || parsed.is_some_and(|l| l.is_text());
        if text_like && txt.trim().is_empty() {
            log::debug!("No text for label {} on page {}", label, pg);
            return JoinOutcome::Dropped(DropReason::EmptyText);
        }

        let tagged = label_type.and_then(CaptionLinker::reference_of);
        let reference = match tagged {
            Some(reference) => Some(reference.to_string()),
            None => self.linker.link(pg, label_type, txt, bbox),
        };
        if let Some(reference) = reference {
            let tag = CaptionLinker::caption_tag(&reference);
            log::debug!("Caption {} on page {}", tag, pg);
            self.captions.insert(reference, txt.to_string());
            let entry = TrackerEntry::new(pg, Some(tag), label, txt, fonts).with_bbox(bbox);
            return self.commit(entry, kind, false);
        }

        if text_like && self.continues(kind) {
            if let Some(prev) = self.entries.last_mut() {
                prev.txt = join_fragments(&prev.txt, txt, self.config.min_overlap, &self.joiner);
                prev.pgs.push(pg);
                prev.labels.push(label);
                prev.fonts.merge(&fonts);
                self.linker.observe(prev);
                return JoinOutcome::Merged(self.entries.len() - 1);
            }
        }

        let entry = TrackerEntry::new(pg, label_type.map(str::to_string), label, txt, fonts)
            .with_bbox(bbox);
        self.commit(entry, kind, text_like)
    }

    /// Feed a record read back from a raw chapter document.
    pub fn add_raw(&mut self, entry: TrackerEntry) -> JoinOutcome {
        let pg = entry.page();
        let label = entry.label();
        self.add_entry(
            pg,
            entry.label_type.as_deref(),
            label,
            &entry.txt,
            entry.fonts,
            entry.bbox,
        )
    }

    fn continues(&self, kind: FontKind) -> bool {
        let Some(tail) = self.tail else {
            return false;
        };
        tail.continuable
            && tail.kind == kind
            && self.entries.last().is_some_and(|prev| !term_str(&prev.txt))
    }

    fn commit(&mut self, entry: TrackerEntry, kind: FontKind, continuable: bool) -> JoinOutcome {
        self.linker.observe(&entry);
        self.entries.push(entry);
        self.tail = Some(Tail { kind, continuable });
        JoinOutcome::Committed(self.entries.len() - 1)
    }

    /// Blocks so far.
    pub fn entries(&self) -> &[TrackerEntry] {
        &self.entries
    }

    /// Consume the tracker, returning its blocks.
    pub fn into_entries(self) -> Vec<TrackerEntry> {
        self.entries
    }

    /// Caption text per figure reference, in first-seen order.
    pub fn captions(&self) -> &IndexMap<String, String> {
        &self.captions
    }

    /// Write one `<ref>.txt` file per caption into `dir`.
    pub fn write_captions(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if self.captions.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(dir)?;
        for (reference, txt) in &self.captions {
            fs::write(dir.join(format!("{}.txt", reference)), txt)?;
        }
        Ok(self.captions.len())
    }

    /// Write the chapter document.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        TrackerEntry::write_all(path, &self.entries)
    }
}

//! Per-book configuration.
//!
//! A book's settings live in one JSON file next to its outputs:
//!
//! ```json
//! {
//!   "chapters": [[12, 40], [40, 77]],
//!   "detectron": { "box_pad": 0.01, "resolution": 300 },
//!   "size_bucket": 4,
//!   "columns": { "mode": "split", "left_pad": 0.98 },
//!   "join": { "min_overlap": 8, "caption_gap": 0.15 },
//!   "fonts": { "body": [["Minion", 10.0]], "heading": [], "noise": [] }
//! }
//! ```
//!
//! Every key is optional. Without `chapters` the book is either read as one
//! chapter or given as one source per chapter file. `fonts` is written by
//! font classification and read by the clean pass; keys this crate does not
//! use are kept when the file is saved.

use crate::error::{Error, Result};
use crate::fonts::{FontClassification, DEFAULT_SIZE_BUCKET};
use crate::layout::{LabelType, DEFAULT_LEFT_PAD};
use crate::text::DEFAULT_MIN_OVERLAP;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Layout detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Fraction of the image size used to pad detected boxes, in `[0, 1)`.
    #[serde(default = "default_box_pad")]
    pub box_pad: f32,

    /// Rasterisation resolution in DPI.
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Detector settings read by other tools, such as the model name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_box_pad() -> f32 {
    0.01
}

fn default_resolution() -> u32 {
    300
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            box_pad: default_box_pad(),
            resolution: default_resolution(),
            extra: Map::new(),
        }
    }
}

/// How regions of a page are put in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColumnLayout {
    /// One column: top to bottom.
    Single,
    /// Left group then right group, split at `left_pad * image_width / 2`.
    Split {
        /// Split fraction
        #[serde(default = "default_left_pad")]
        left_pad: f32,
    },
}

fn default_left_pad() -> f32 {
    DEFAULT_LEFT_PAD
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::Split {
            left_pad: DEFAULT_LEFT_PAD,
        }
    }
}

/// Clean-pass joining settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Minimum duplicated overlap, in characters, clipped from a continuation.
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,

    /// Largest vertical gap, as a fraction of page height, between a figure
    /// and a caption that follows it.
    #[serde(default = "default_caption_gap")]
    pub caption_gap: f32,

    /// Noise-font records with these labels are always dropped.
    #[serde(default = "default_always_ignore")]
    pub always_ignore: Vec<LabelType>,

    /// Noise-font records with these labels are dropped when their text is
    /// shorter than `short_text_max` characters.
    #[serde(default = "default_ignore_when_short")]
    pub ignore_when_short: Vec<LabelType>,

    /// Length limit for `ignore_when_short`.
    #[serde(default = "default_short_text_max")]
    pub short_text_max: usize,
}

fn default_min_overlap() -> usize {
    DEFAULT_MIN_OVERLAP
}

fn default_caption_gap() -> f32 {
    0.15
}

fn default_always_ignore() -> Vec<LabelType> {
    vec![LabelType::PageNumber, LabelType::Equation]
}

fn default_ignore_when_short() -> Vec<LabelType> {
    vec![LabelType::Footer, LabelType::Footnote]
}

fn default_short_text_max() -> usize {
    80
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            min_overlap: default_min_overlap(),
            caption_gap: default_caption_gap(),
            always_ignore: default_always_ignore(),
            ignore_when_short: default_ignore_when_short(),
            short_text_max: default_short_text_max(),
        }
    }
}

impl JoinConfig {
    /// Set the minimum clipped overlap.
    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    /// Set the figure-to-caption gap.
    pub fn with_caption_gap(mut self, caption_gap: f32) -> Self {
        self.caption_gap = caption_gap;
        self
    }

    /// Set the length limit for short noise records.
    pub fn with_short_text_max(mut self, short_text_max: usize) -> Self {
        self.short_text_max = short_text_max;
        self
    }
}

/// Configuration of one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Chapter page ranges, `[start, end)`, zero-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<(usize, usize)>>,

    /// Layout detector settings.
    #[serde(default, rename = "detectron", alias = "detector")]
    pub detector: DetectorConfig,

    /// Font size bucket granularity; `0` keeps raw sizes.
    #[serde(default = "default_size_bucket")]
    pub size_bucket: u32,

    /// Strip subset tags and encoding suffixes from font names.
    #[serde(default)]
    pub clean_font_names: bool,

    /// Use the page's own text boxes instead of the layout detector.
    #[serde(default)]
    pub use_text_layer: bool,

    /// Reading order layout.
    #[serde(default)]
    pub columns: ColumnLayout,

    /// Clean-pass joining settings.
    #[serde(default)]
    pub join: JoinConfig,

    /// Learned font classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<FontClassification>,

    /// Keys not used by this crate.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_size_bucket() -> u32 {
    DEFAULT_SIZE_BUCKET
}

impl Default for BookConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BookConfig {
    /// Create a configuration with defaults and no chapters.
    pub fn new() -> Self {
        Self {
            chapters: None,
            detector: DetectorConfig::default(),
            size_bucket: DEFAULT_SIZE_BUCKET,
            clean_font_names: false,
            use_text_layer: false,
            columns: ColumnLayout::default(),
            join: JoinConfig::default(),
            fonts: None,
            extra: Map::new(),
            path: None,
        }
    }

    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let mut config: BookConfig = serde_json::from_str(&data)?;
        config.validate()?;
        config.path = Some(path.to_path_buf());
        log::debug!(
            "Loaded config {} ({} chapter ranges)",
            path.display(),
            config.chapter_count()
        );
        Ok(config)
    }

    /// Write the configuration to `path` and remember it for later saves.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// File this configuration was loaded from or last saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let pad = self.detector.box_pad;
        if !(0.0..1.0).contains(&pad) {
            return Err(Error::InvalidConfig(format!(
                "box_pad must be within [0, 1), got {}",
                pad
            )));
        }
        if self.detector.resolution == 0 {
            return Err(Error::InvalidConfig("resolution must be positive".to_string()));
        }
        if let ColumnLayout::Split { left_pad } = self.columns {
            if !(left_pad > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "left_pad must be positive, got {}",
                    left_pad
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.join.caption_gap) {
            return Err(Error::InvalidConfig(format!(
                "caption_gap must be within [0, 1], got {}",
                self.join.caption_gap
            )));
        }
        for &(start, end) in self.chapters.iter().flatten() {
            if start >= end {
                return Err(Error::InvalidConfig(format!(
                    "chapter range [{}, {}) is empty",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Page range of a chapter, numbered from 1.
    pub fn chapter_range(&self, chapter: usize) -> Result<Range<usize>> {
        chapter
            .checked_sub(1)
            .and_then(|i| self.chapters.as_ref()?.get(i))
            .map(|&(start, end)| start..end)
            .ok_or(Error::ChapterNotFound(chapter))
    }

    /// Number of configured chapter ranges.
    pub fn chapter_count(&self) -> usize {
        self.chapters.as_ref().map_or(0, Vec::len)
    }

    /// Stored font classification, if fonts were determined.
    pub fn fonts(&self) -> Option<&FontClassification> {
        self.fonts.as_ref()
    }

    /// Store a font classification and persist it when the file is known.
    ///
    /// Only the `fonts` key of the file is replaced; everything else in it
    /// is written back as read.
    pub fn write_fonts(&mut self, fonts: FontClassification) -> Result<()> {
        let value = serde_json::to_value(&fonts)?;
        self.fonts = Some(fonts);
        let Some(path) = self.path.clone() else {
            log::warn!("Config has no file; font classification kept in memory only");
            return Ok(());
        };

        let mut doc: Value = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => serde_json::to_value(&*self)?,
            Err(e) => return Err(e.into()),
        };
        let Some(map) = doc.as_object_mut() else {
            return Err(Error::InvalidConfig(format!(
                "{} does not hold a JSON object",
                path.display()
            )));
        };
        map.insert("fonts".to_string(), value);
        fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
        log::info!("Stored font classification in {}", path.display());
        Ok(())
    }

    /// Set chapter page ranges.
    pub fn with_chapters(mut self, chapters: Vec<(usize, usize)>) -> Self {
        self.chapters = Some(chapters);
        self
    }

    /// Set detector settings.
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the font size bucket granularity.
    pub fn with_size_bucket(mut self, k: u32) -> Self {
        self.size_bucket = k;
        self
    }

    /// Enable reading the page's own text boxes instead of detecting regions.
    pub fn with_text_layer(mut self, enable: bool) -> Self {
        self.use_text_layer = enable;
        self
    }

    /// Set the reading order layout.
    pub fn with_columns(mut self, columns: ColumnLayout) -> Self {
        self.columns = columns;
        self
    }

    /// Set joining settings.
    pub fn with_join(mut self, join: JoinConfig) -> Self {
        self.join = join;
        self
    }

    /// Set the font classification.
    pub fn with_fonts(mut self, fonts: FontClassification) -> Self {
        self.fonts = Some(fonts);
        self
    }
}

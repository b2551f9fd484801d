//! Detected layout regions and their label vocabulary.
//!
//! A region moves through three stages, each one a new value:
//!
//! ```text
//! DetectedRegion  (detector bbox, label)
//!     ↓ place()
//! PlacedRegion    (+ page-space bbox)
//!     ↓ resolve()
//! ResolvedRegion  (+ text, font histogram)
//! ```

use crate::error::{Error, Result};
use crate::fonts::FontHistogram;
use crate::geometry::{BBox, PageFrame, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a region by the layout detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelType {
    /// Chapter or section title
    #[serde(rename = "title", alias = "Title")]
    Title,
    /// Figure image
    #[serde(rename = "figure")]
    Figure,
    /// Running body text
    #[serde(rename = "plain text", alias = "Text")]
    PlainText,
    /// Page header
    #[serde(rename = "header")]
    Header,
    /// Page number
    #[serde(rename = "page number")]
    PageNumber,
    /// Footnote
    #[serde(rename = "footnote")]
    Footnote,
    /// Page footer
    #[serde(rename = "footer")]
    Footer,
    /// Table
    #[serde(rename = "table")]
    Table,
    /// Caption attached to a table
    #[serde(rename = "table caption")]
    TableCaption,
    /// Caption attached to a figure
    #[serde(rename = "figure caption")]
    FigureCaption,
    /// Display equation
    #[serde(rename = "equation")]
    Equation,
    /// Full-width column container
    #[serde(rename = "full column")]
    FullColumn,
    /// Sub-column container
    #[serde(rename = "sub column")]
    SubColumn,
}

impl LabelType {
    /// Parse a detector category name.
    ///
    /// Accepts the detector's own names as well as the legacy `"Text"` and
    /// `"Title"` labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::layout::LabelType;
    ///
    /// assert_eq!(LabelType::from_name("plain text"), Some(LabelType::PlainText));
    /// assert_eq!(LabelType::from_name("Text"), Some(LabelType::PlainText));
    /// assert_eq!(LabelType::from_name("FigureCaption_3-1"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let label = match name {
            "title" | "Title" => Self::Title,
            "figure" => Self::Figure,
            "plain text" | "Text" => Self::PlainText,
            "header" => Self::Header,
            "page number" => Self::PageNumber,
            "footnote" => Self::Footnote,
            "footer" => Self::Footer,
            "table" => Self::Table,
            "table caption" => Self::TableCaption,
            "figure caption" => Self::FigureCaption,
            "equation" => Self::Equation,
            "full column" => Self::FullColumn,
            "sub column" => Self::SubColumn,
            _ => return None,
        };
        Some(label)
    }

    /// Detector name for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Figure => "figure",
            Self::PlainText => "plain text",
            Self::Header => "header",
            Self::PageNumber => "page number",
            Self::Footnote => "footnote",
            Self::Footer => "footer",
            Self::Table => "table",
            Self::TableCaption => "table caption",
            Self::FigureCaption => "figure caption",
            Self::Equation => "equation",
            Self::FullColumn => "full column",
            Self::SubColumn => "sub column",
        }
    }

    /// Text-bearing labels that may be prose.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::PlainText | Self::Header | Self::Footnote | Self::Footer
        )
    }

    /// Caption labels.
    pub fn is_caption(&self) -> bool {
        matches!(self, Self::FigureCaption | Self::TableCaption)
    }

    /// Labels whose content is an image rather than text.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Figure | Self::Table)
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One polygon as returned by a layout detector.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Detector-assigned index
    pub category_index: usize,
    /// Detector category name
    pub category_name: String,
    /// Region outline in image pixels
    pub polygon: Vec<Point>,
}

/// A region straight from the detector, bbox in image space.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedRegion {
    /// Position in reading order once sorted; detector index before that
    pub id: usize,
    /// Region category
    pub label: LabelType,
    /// Bounding box in detector-image pixels
    pub raw_bbox: BBox,
}

impl DetectedRegion {
    /// Create a region from its parts.
    pub fn new(id: usize, label: LabelType, raw_bbox: BBox) -> Self {
        Self {
            id,
            label,
            raw_bbox,
        }
    }

    /// Build a region from a detector polygon.
    pub fn from_detection(detection: &Detection) -> Result<Self> {
        let label = LabelType::from_name(&detection.category_name)
            .ok_or_else(|| Error::UnknownLabel(detection.category_name.clone()))?;
        let raw_bbox = BBox::from_polygon(&detection.polygon)?;
        Ok(Self::new(detection.category_index, label, raw_bbox))
    }

    /// Resolve the page-space bbox.
    pub fn place(self, frame: &PageFrame, pad: f32) -> Result<PlacedRegion> {
        let page_bbox = frame.to_page_bbox(&self.raw_bbox, pad)?;
        Ok(PlacedRegion {
            region: self,
            page_bbox,
        })
    }
}

/// A region with its page-space bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRegion {
    /// The detected region
    pub region: DetectedRegion,
    /// Padded bounding box in page space
    pub page_bbox: BBox,
}

impl PlacedRegion {
    /// Attach extracted content.
    pub fn resolve(self, text: Option<String>, fonts: FontHistogram) -> ResolvedRegion {
        ResolvedRegion {
            region: self.region,
            page_bbox: self.page_bbox,
            text,
            fonts,
        }
    }
}

/// A fully extracted region, ready to be recorded.
#[derive(Debug, Clone)]
pub struct ResolvedRegion {
    /// The detected region
    pub region: DetectedRegion,
    /// Padded bounding box in page space
    pub page_bbox: BBox,
    /// Extracted text; `None` for image regions
    pub text: Option<String>,
    /// Font usage inside the region
    pub fonts: FontHistogram,
}

impl ResolvedRegion {
    /// Extracted text, empty for image regions.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

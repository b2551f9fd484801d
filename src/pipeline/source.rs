//! Collaborators the pipeline drives: a layout detector and a paged book.

use crate::error::Result;
use crate::fonts::Glyph;
use crate::geometry::BBox;
use crate::layout::Detection;
use image::DynamicImage;

/// Finds labelled layout regions on a rendered page.
pub trait LayoutDetector {
    /// Detect regions on a page image.
    ///
    /// Polygons are in image pixels; category names must belong to the label
    /// vocabulary (see [`crate::layout::LabelType`]).
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// One page of a book.
///
/// Boxes passed to and returned from a page are in page space with a
/// top-left origin.
pub trait PageSource {
    /// Page number as printed in records (1-based).
    fn number(&self) -> u32;

    /// Page width and height in page units.
    fn size(&self) -> (f32, f32);

    /// Render the page at `resolution` DPI.
    fn rasterize(&self, resolution: u32) -> Result<DynamicImage>;

    /// Text inside a box.
    fn extract_text(&self, bbox: &BBox) -> Result<String>;

    /// Characters inside a box with their fonts.
    fn extract_glyphs(&self, bbox: &BBox) -> Result<Vec<Glyph>>;

    /// The page's own text boxes, for books read without the detector.
    fn text_boxes(&self) -> Result<Vec<BBox>> {
        Ok(Vec::new())
    }
}

/// A paged document.
pub trait BookSource {
    /// Page type
    type Page: PageSource;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Page at a zero-based index.
    fn page(&self, index: usize) -> Result<Self::Page>;
}

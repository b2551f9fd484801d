//! Geometric primitives for layout analysis.
//!
//! Detector output lives in image-pixel space, while text extraction works in
//! page space. [`PageFrame`] maps between the two.

use crate::error::{Error, Result};

/// A 2D point in image or page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box with top-left origin.
///
/// A `BBox` built through [`BBox::new`] always satisfies `x0 < x1` and
/// `y0 < y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its corners, rejecting empty or inverted boxes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::geometry::BBox;
    ///
    /// let bbox = BBox::new(10.0, 20.0, 110.0, 70.0).unwrap();
    /// assert_eq!(bbox.width(), 100.0);
    /// assert!(BBox::new(10.0, 20.0, 5.0, 70.0).is_err());
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Result<Self> {
        // NaN fails both comparisons
        if x0 < x1 && y0 < y1 {
            Ok(Self { x0, y0, x1, y1 })
        } else {
            Err(Error::DegenerateBBox { x0, y0, x1, y1 })
        }
    }

    /// Reduce an arbitrary polygon to its axis-aligned bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::geometry::{BBox, Point};
    ///
    /// let poly = [
    ///     Point::new(10.0, 5.0),
    ///     Point::new(50.0, 8.0),
    ///     Point::new(48.0, 40.0),
    ///     Point::new(12.0, 38.0),
    /// ];
    /// let bbox = BBox::from_polygon(&poly).unwrap();
    /// assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (10.0, 5.0, 50.0, 40.0));
    /// ```
    pub fn from_polygon(points: &[Point]) -> Result<Self> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for p in points {
            bounds = Some(match bounds {
                None => (p.x, p.y, p.x, p.y),
                Some((x0, y0, x1, y1)) => (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
            });
        }
        match bounds {
            Some((x0, y0, x1, y1)) => Self::new(x0, y0, x1, y1),
            None => Err(Error::DegenerateBBox {
                x0: 0.0,
                y0: 0.0,
                x1: 0.0,
                y1: 0.0,
            }),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Check whether `self` encloses `other` (edges may touch).
    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Corners as an array, `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

/// Image and page dimensions of one rendered page.
///
/// Detector coordinates are in image pixels; extraction coordinates are in
/// page units. Each axis is scaled independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Rendered image width in pixels
    pub image_width: f32,
    /// Rendered image height in pixels
    pub image_height: f32,
    /// Page width in page units
    pub page_width: f32,
    /// Page height in page units
    pub page_height: f32,
}

impl PageFrame {
    /// Create a frame from image and page dimensions.
    pub fn new(image_width: f32, image_height: f32, page_width: f32, page_height: f32) -> Self {
        Self {
            image_width,
            image_height,
            page_width,
            page_height,
        }
    }

    /// Map a detector-space box to page space and pad it.
    ///
    /// The horizontal pad is `pad * image_width / 8` and the vertical pad is
    /// `pad * image_height / 16`; the detector clips glyph edges more along x
    /// than along y. The padded box is validated, so a fault here means the
    /// region cannot be extracted.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::geometry::{BBox, PageFrame};
    ///
    /// let frame = PageFrame::new(1000.0, 2000.0, 500.0, 1000.0);
    /// let raw = BBox::new(100.0, 200.0, 300.0, 400.0).unwrap();
    /// let pg = frame.to_page_bbox(&raw, 0.0).unwrap();
    /// assert_eq!(pg.to_array(), [50.0, 100.0, 150.0, 200.0]);
    /// ```
    pub fn to_page_bbox(&self, raw: &BBox, pad: f32) -> Result<BBox> {
        let w_ratio = self.page_width / self.image_width;
        let h_ratio = self.page_height / self.image_height;

        let pad_x = pad * self.image_width / 8.0;
        let pad_y = pad * self.image_height / 16.0;

        BBox::new(
            raw.x0 * w_ratio - pad_x,
            raw.y0 * h_ratio - pad_y,
            raw.x1 * w_ratio + pad_x,
            raw.y1 * h_ratio + pad_y,
        )
    }

    /// Express a page-space box as fractions of the page size.
    pub fn relative(&self, bbox: &BBox) -> [f32; 4] {
        [
            bbox.x0 / self.page_width,
            bbox.y0 / self.page_height,
            bbox.x1 / self.page_width,
            bbox.y1 / self.page_height,
        ]
    }
}

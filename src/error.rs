//! Error types for the stitching library.
//!
//! This module defines all error types that can occur while ordering regions,
//! classifying fonts and joining text fragments.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bounding box is empty or inverted after scaling/padding
    #[error("Degenerate bounding box ({x0}, {y0}, {x1}, {y1}): expected x0 < x1 and y0 < y1")]
    DegenerateBBox {
        /// Left edge
        x0: f32,
        /// Top edge
        y0: f32,
        /// Right edge
        x1: f32,
        /// Bottom edge
        y1: f32,
    },

    /// Detector produced a category outside the label vocabulary
    #[error("Unknown layout label: {0}")]
    UnknownLabel(String),

    /// A histogram required for classification has no entries
    #[error("No font data for {0} text: cannot classify fonts")]
    MissingFontData(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested chapter has no page range in the configuration
    #[error("Chapter {0} not found")]
    ChapterNotFound(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_bbox_error() {
        let err = Error::DegenerateBBox {
            x0: 10.0,
            y0: 5.0,
            x1: 2.0,
            y1: 8.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Degenerate bounding box"));
        assert!(msg.contains("x0 < x1"));
    }

    #[test]
    fn test_missing_font_data_error() {
        let err = Error::MissingFontData("body");
        assert_eq!(format!("{}", err), "No font data for body text: cannot classify fonts");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "raw/1.json");
        let err: Error = io.into();
        assert!(format!("{}", err).contains("raw/1.json"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

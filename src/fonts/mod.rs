//! Font usage and font classification.
//!
//! This module counts which fonts a region is set in and learns, across a
//! whole book, which fonts mark body text, headings, or noise.

pub mod classifier;
pub mod font_name;
pub mod histogram;

pub use classifier::{
    FontClassification, FontClassifier, FontKind, FontReport, FontTally, DEFAULT_CUTOFF,
};
pub use font_name::clean_font_name;
pub use histogram::{bucket_size, FontHistogram, FontId, Glyph, DEFAULT_SIZE_BUCKET};

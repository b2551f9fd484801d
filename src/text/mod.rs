//! Text post-processing for joined blocks.
//!
//! This module provides the seam logic used when a fragment continues the
//! block before it: sentence-end detection, duplicate-overlap clipping and
//! hyphenated word reconstruction.

pub mod hyphenation;
pub mod joining;

pub use hyphenation::HyphenJoiner;
pub use joining::{clip_overlap, join_fragments, overlap_len, term_str, DEFAULT_MIN_OVERLAP};

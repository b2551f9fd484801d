//! Layout regions and reading order.
//!
//! This module turns a detector's regions into page reading order:
//! - Label vocabulary and the staged region builder
//! - Column-aware reading order strategies

pub mod reading_order;
pub mod region;

// Re-export main types
pub use reading_order::{
    create_strategy, ColumnSplitStrategy, OrderedRegions, ReadingOrderStrategy,
    SingleColumnStrategy, DEFAULT_LEFT_PAD,
};
pub use region::{DetectedRegion, Detection, LabelType, PlacedRegion, ResolvedRegion};

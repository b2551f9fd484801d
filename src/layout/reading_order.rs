//! Reading order determination for detected regions.
//!
//! Strategies take the regions of one page in detector order and return them
//! in reading order, with `id` reassigned to each region's position. The ids
//! are what downstream records use as label numbers.

use crate::config::ColumnLayout;
use crate::layout::region::DetectedRegion;
use std::cmp::Ordering;

/// Default fraction of half the image width used as the column split.
///
/// Slightly under 1.0 so that a single-column page, whose blocks start near
/// the left margin, is never split.
pub const DEFAULT_LEFT_PAD: f32 = 0.98;

/// Regions of one page in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRegions {
    /// Regions with `id == position`
    pub regions: Vec<DetectedRegion>,
    /// Number of regions in the left column group
    pub split: usize,
}

/// Trait for determining reading order of detected regions.
pub trait ReadingOrderStrategy: Send + Sync {
    /// Order the regions of a page.
    ///
    /// # Arguments
    ///
    /// * `regions` - Regions in detector order
    /// * `image_width` - Width of the image the detector ran on
    fn apply(&self, regions: Vec<DetectedRegion>, image_width: f32) -> OrderedRegions;

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Two-group column ordering with a fixed split threshold.
///
/// A region belongs to the left group iff its left edge is strictly less than
/// `left_pad * image_width / 2`. Each group is sorted by top edge and the left
/// group is read first. There is no column-count inference; a page with more
/// than two columns is read as left half then right half.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSplitStrategy {
    left_pad: f32,
}

impl ColumnSplitStrategy {
    /// Create a strategy with the default split.
    pub fn new() -> Self {
        Self {
            left_pad: DEFAULT_LEFT_PAD,
        }
    }

    /// Set the split fraction.
    pub fn with_left_pad(mut self, left_pad: f32) -> Self {
        self.left_pad = left_pad;
        self
    }
}

impl Default for ColumnSplitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingOrderStrategy for ColumnSplitStrategy {
    fn apply(&self, regions: Vec<DetectedRegion>, image_width: f32) -> OrderedRegions {
        let threshold = self.left_pad * image_width / 2.0;

        let (mut left, mut right): (Vec<_>, Vec<_>) = regions
            .into_iter()
            .partition(|r| r.raw_bbox.x0 < threshold);

        sort_by_top(&mut left);
        sort_by_top(&mut right);

        let split = left.len();
        left.extend(right);

        OrderedRegions {
            regions: renumber(left),
            split,
        }
    }

    fn name(&self) -> &'static str {
        "ColumnSplitStrategy"
    }
}

/// Top-to-bottom ordering for single-column books.
pub struct SingleColumnStrategy;

impl ReadingOrderStrategy for SingleColumnStrategy {
    fn apply(&self, mut regions: Vec<DetectedRegion>, _image_width: f32) -> OrderedRegions {
        sort_by_top(&mut regions);
        let split = regions.len();
        OrderedRegions {
            regions: renumber(regions),
            split,
        }
    }

    fn name(&self) -> &'static str {
        "SingleColumnStrategy"
    }
}

/// Create a reading order strategy based on configuration.
pub fn create_strategy(layout: &ColumnLayout) -> Box<dyn ReadingOrderStrategy> {
    match *layout {
        ColumnLayout::Single => Box::new(SingleColumnStrategy),
        ColumnLayout::Split { left_pad } => {
            Box::new(ColumnSplitStrategy::new().with_left_pad(left_pad))
        },
    }
}

// Stable, so equal tops keep detector order.
fn sort_by_top(regions: &mut [DetectedRegion]) {
    regions.sort_by(|a, b| {
        a.raw_bbox
            .y0
            .partial_cmp(&b.raw_bbox.y0)
            .unwrap_or(Ordering::Equal)
    });
}

fn renumber(regions: Vec<DetectedRegion>) -> Vec<DetectedRegion> {
    regions
        .into_iter()
        .enumerate()
        .map(|(i, mut r)| {
            r.id = i;
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::layout::LabelType;
    use proptest::prelude::*;

    fn region(id: usize, x0: f32, y0: f32) -> DetectedRegion {
        DetectedRegion::new(
            id,
            LabelType::PlainText,
            BBox::new(x0, y0, x0 + 10.0, y0 + 10.0).unwrap(),
        )
    }

    #[test]
    fn test_two_column_order() {
        // image width 1000 -> threshold 490
        let regions = vec![
            region(0, 520.0, 100.0), // right, top
            region(1, 40.0, 300.0),  // left, bottom
            region(2, 40.0, 50.0),   // left, top
            region(3, 520.0, 20.0),  // right, very top
        ];

        let ordered = ColumnSplitStrategy::new().apply(regions, 1000.0);

        let tops: Vec<f32> = ordered.regions.iter().map(|r| r.raw_bbox.y0).collect();
        assert_eq!(tops, vec![50.0, 300.0, 20.0, 100.0]);
        assert_eq!(ordered.split, 2);
        let ids: Vec<usize> = ordered.regions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // threshold = 0.98 * 1000 / 2 = 490
        let ordered = ColumnSplitStrategy::new().apply(vec![region(0, 490.0, 0.0)], 1000.0);
        assert_eq!(ordered.split, 0);
    }

    #[test]
    fn test_single_column_ignores_x() {
        let regions = vec![region(0, 600.0, 10.0), region(1, 10.0, 20.0)];
        let ordered = SingleColumnStrategy.apply(regions, 1000.0);
        let xs: Vec<f32> = ordered.regions.iter().map(|r| r.raw_bbox.x0).collect();
        assert_eq!(xs, vec![600.0, 10.0]);
        assert_eq!(ordered.split, 2);
    }

    #[test]
    fn test_ties_keep_detector_order() {
        let regions = vec![region(5, 10.0, 30.0), region(9, 20.0, 30.0)];
        let ordered = ColumnSplitStrategy::new().apply(regions, 1000.0);
        let xs: Vec<f32> = ordered.regions.iter().map(|r| r.raw_bbox.x0).collect();
        assert_eq!(xs, vec![10.0, 20.0]);
    }

    #[test]
    fn test_create_strategy() {
        assert_eq!(create_strategy(&ColumnLayout::Single).name(), "SingleColumnStrategy");
        assert_eq!(
            create_strategy(&ColumnLayout::default()).name(),
            "ColumnSplitStrategy"
        );
    }

    #[test]
    fn test_empty_page() {
        let ordered = ColumnSplitStrategy::new().apply(vec![], 1000.0);
        assert!(ordered.regions.is_empty());
        assert_eq!(ordered.split, 0);
    }

    proptest! {
        #[test]
        fn prop_left_first_sorted_and_renumbered(
            boxes in prop::collection::vec((0.0f32..990.0, 0.0f32..1400.0), 0..40)
        ) {
            let regions: Vec<_> = boxes
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| region(i, x, y))
                .collect();
            let n = regions.len();
            let ordered = ColumnSplitStrategy::new().apply(regions, 1000.0);
            let threshold = DEFAULT_LEFT_PAD * 1000.0 / 2.0;

            prop_assert_eq!(ordered.regions.len(), n);
            for (i, r) in ordered.regions.iter().enumerate() {
                prop_assert_eq!(r.id, i);
                prop_assert_eq!(r.raw_bbox.x0 < threshold, i < ordered.split);
            }
            for pair in ordered.regions[..ordered.split].windows(2) {
                prop_assert!(pair[0].raw_bbox.y0 <= pair[1].raw_bbox.y0);
            }
            for pair in ordered.regions[ordered.split..].windows(2) {
                prop_assert!(pair[0].raw_bbox.y0 <= pair[1].raw_bbox.y0);
            }
        }
    }
}

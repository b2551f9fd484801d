//! Figure caption linking.
//!
//! A caption is recognised either from its detector label or as a text region
//! right below a figure or table whose text starts with "Fig". It is retagged
//! `FigureCaption_<ref>`, where `<ref>` names the figure it belongs to:
//!
//! | Previous record        | Reference            |
//! |------------------------|----------------------|
//! | none                   | `X-Y`                |
//! | not a figure or table  | `<page>-Y`           |
//! | figure or table        | `<its page>-<its label>` |
//!
//! Only records on the caption's own page count as previous: a caption that
//! opens a page refers to `X-Y`.
//!
//! Figure crops are saved as `<page>-<label>.png`, so a resolved reference
//! names both the crop and the caption sidecar `<ref>.txt`.

use crate::layout::LabelType;
use crate::tracker::TrackerEntry;

/// Label prefix of linked captions.
pub const CAPTION_TAG_PREFIX: &str = "FigureCaption_";

/// Default largest figure-to-caption gap, as a fraction of page height.
pub const DEFAULT_CAPTION_GAP: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    pg: u32,
    label: usize,
    last_pg: u32,
    is_image: bool,
    bottom: Option<f32>,
}

/// Decides which records are figure captions and what they refer to.
#[derive(Debug, Clone)]
pub struct CaptionLinker {
    caption_gap: f32,
    last: Option<Anchor>,
}

impl Default for CaptionLinker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTION_GAP)
    }
}

impl CaptionLinker {
    /// Create a linker with the given figure-to-caption gap.
    pub fn new(caption_gap: f32) -> Self {
        Self {
            caption_gap,
            last: None,
        }
    }

    /// Reference for a record if it is a caption.
    ///
    /// # Arguments
    ///
    /// * `pg` - Page of the record
    /// * `label_type` - Record label, `None` for native text boxes
    /// * `txt` - Record text
    /// * `bbox` - Page-relative bounding box, if known
    ///
    /// When either the record or the previous figure has no bounding box the
    /// gap check passes. A previous record that ended on another page is
    /// ignored.
    pub fn link(&self, pg: u32, label_type: Option<&str>, txt: &str, bbox: Option<[f32; 4]>) -> Option<String> {
        let label = label_type.and_then(LabelType::from_name);
        let is_caption = label.is_some_and(|l| l.is_caption());
        let last = self.last.filter(|last| last.last_pg == pg);

        let follows_figure = last.is_some_and(|last| {
            last.is_image
                && label.is_some_and(|l| l.is_text())
                && self.within_gap(last.bottom, bbox)
                && starts_with_fig(txt)
        });

        if !is_caption && !follows_figure {
            return None;
        }

        let reference = match last {
            None => "X-Y".to_string(),
            Some(last) if !last.is_image => format!("{}-Y", pg),
            Some(last) => format!("{}-{}", last.pg, last.label),
        };
        Some(reference)
    }

    /// Remember a committed record as the previous one.
    pub fn observe(&mut self, entry: &TrackerEntry) {
        self.last = Some(Anchor {
            pg: entry.page(),
            label: entry.label(),
            last_pg: entry.pgs.last().copied().unwrap_or(0),
            is_image: entry.label_kind().is_some_and(|l| l.is_image()),
            bottom: entry.bbox.map(|b| b[3]),
        });
    }

    /// Forget the previous record.
    pub fn reset(&mut self) {
        self.last = None;
    }

    fn within_gap(&self, last_bottom: Option<f32>, bbox: Option<[f32; 4]>) -> bool {
        match (last_bottom, bbox) {
            (Some(bottom), Some(b)) => b[1] - bottom < self.caption_gap,
            _ => true,
        }
    }

    /// Label for a linked caption.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::tracker::CaptionLinker;
    ///
    /// assert_eq!(CaptionLinker::caption_tag("12-3"), "FigureCaption_12-3");
    /// assert_eq!(CaptionLinker::reference_of("FigureCaption_12-3"), Some("12-3"));
    /// assert_eq!(CaptionLinker::reference_of("figure caption"), None);
    /// ```
    pub fn caption_tag(reference: &str) -> String {
        format!("{}{}", CAPTION_TAG_PREFIX, reference)
    }

    /// Reference carried by a caption label, if it is one.
    pub fn reference_of(label_type: &str) -> Option<&str> {
        label_type.strip_prefix(CAPTION_TAG_PREFIX)
    }
}

fn starts_with_fig(txt: &str) -> bool {
    txt.trim_start()
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("fig"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontHistogram;

    fn entry(pg: u32, label: &str, id: usize, bbox: Option<[f32; 4]>) -> TrackerEntry {
        TrackerEntry::new(pg, Some(label.to_string()), id, "", FontHistogram::new()).with_bbox(bbox)
    }

    #[test]
    fn test_starts_with_fig() {
        assert!(starts_with_fig("Figure 2.1 Chest film"));
        assert!(starts_with_fig("  FIG. 3"));
        assert!(starts_with_fig("fig 4"));
        assert!(!starts_with_fig("The figure"));
        assert!(!starts_with_fig("Fi"));
        assert!(!starts_with_fig("é"));
    }

    #[test]
    fn test_caption_label_without_previous() {
        let linker = CaptionLinker::default();
        assert_eq!(
            linker.link(5, Some("figure caption"), "Anything", None).as_deref(),
            Some("X-Y")
        );
    }

    #[test]
    fn test_caption_label_after_text() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(5, "plain text", 0, None));
        assert_eq!(
            linker.link(5, Some("table caption"), "Table 1", None).as_deref(),
            Some("5-Y")
        );
    }

    #[test]
    fn test_fig_text_below_figure() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "figure", 2, Some([0.1, 0.1, 0.9, 0.5])));
        assert_eq!(
            linker
                .link(9, Some("plain text"), "Fig. 4 Lateral view", Some([0.1, 0.55, 0.9, 0.6]))
                .as_deref(),
            Some("9-2")
        );
    }

    #[test]
    fn test_fig_text_too_far_below() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "figure", 2, Some([0.1, 0.1, 0.9, 0.5])));
        assert_eq!(
            linker.link(9, Some("plain text"), "Fig. 4", Some([0.1, 0.7, 0.9, 0.75])),
            None
        );
    }

    #[test]
    fn test_plain_text_below_figure_is_not_caption() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "table", 1, None));
        assert_eq!(linker.link(9, Some("plain text"), "As shown above", None), None);
        assert_eq!(linker.link(9, Some("equation"), "Fig", None), None);
    }

    #[test]
    fn test_fig_text_beside_figure() {
        // right column text starting above the left column figure's bottom
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "figure", 2, Some([0.05, 0.1, 0.45, 0.6])));
        assert_eq!(
            linker
                .link(9, Some("plain text"), "Figure 3 Side view", Some([0.55, 0.12, 0.95, 0.2]))
                .as_deref(),
            Some("9-2")
        );
    }

    #[test]
    fn test_previous_page_is_ignored() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "figure", 4, Some([0.1, 0.5, 0.9, 0.95])));
        assert_eq!(
            linker.link(10, Some("plain text"), "Fig. 5 continues", Some([0.1, 0.02, 0.9, 0.08])),
            None
        );
        assert_eq!(
            linker.link(10, Some("figure caption"), "Table 2", None).as_deref(),
            Some("X-Y")
        );
    }

    #[test]
    fn test_block_ending_on_caption_page() {
        let mut linker = CaptionLinker::default();
        let mut block = entry(9, "plain text", 3, None);
        block.pgs.push(10);
        block.labels.push(0);
        linker.observe(&block);
        assert_eq!(
            linker.link(10, Some("figure caption"), "Table 2", None).as_deref(),
            Some("10-Y")
        );
    }

    #[test]
    fn test_reset() {
        let mut linker = CaptionLinker::default();
        linker.observe(&entry(9, "figure", 1, None));
        linker.reset();
        assert_eq!(
            linker.link(10, Some("figure caption"), "Fig. 1", None).as_deref(),
            Some("X-Y")
        );
    }
}

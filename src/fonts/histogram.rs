//! Font usage histograms.
//!
//! A histogram counts how many glyphs of a region were drawn with each
//! font-identity, where the identity is the font name plus its size snapped
//! to the nearest `1/k` point.

use crate::fonts::font_name::clean_font_name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Default size bucket granularity (quarter points).
pub const DEFAULT_SIZE_BUCKET: u32 = 4;

/// Snap a font size to the nearest `1/k`.
///
/// Halves round to even. `k == 0` disables bucketing.
///
/// # Examples
///
/// ```
/// use pdf_stitch::fonts::bucket_size;
///
/// assert_eq!(bucket_size(9.9, 4), 10.0);
/// assert_eq!(bucket_size(9.80, 4), 9.75);
/// assert_eq!(bucket_size(9.87, 0), 9.87);
/// ```
pub fn bucket_size(size: f32, k: u32) -> f32 {
    if k == 0 {
        return size;
    }
    let k = k as f32;
    (size * k).round_ties_even() / k
}

/// A character's font as reported by the text extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Font name as stored in the document
    pub font_name: String,
    /// Font size in points
    pub size: f32,
}

impl Glyph {
    /// Create a glyph record.
    pub fn new(font_name: impl Into<String>, size: f32) -> Self {
        Self {
            font_name: font_name.into(),
            size,
        }
    }
}

/// A font name with a bucketed size.
///
/// Serialized as `[name, size]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "(String, f32)", into = "(String, f32)")]
pub struct FontId {
    /// Font name
    pub name: String,
    /// Bucketed size
    pub size: f32,
}

impl FontId {
    /// Create a font-identity. `-0.0` is stored as `0.0`.
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        Self {
            name: name.into(),
            size: if size == 0.0 { 0.0 } else { size },
        }
    }

    /// Deterministic ordering by name, then size.
    pub fn lexical_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.size.total_cmp(&other.size))
    }
}

impl PartialEq for FontId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.size.to_bits() == other.size.to_bits()
    }
}

impl Eq for FontId {}

impl Hash for FontId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
    }
}

impl From<(String, f32)> for FontId {
    fn from((name, size): (String, f32)) -> Self {
        Self::new(name, size)
    }
}

impl From<FontId> for (String, f32) {
    fn from(id: FontId) -> Self {
        (id.name, id.size)
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.size)
    }
}

/// Occurrence count per font-identity, in first-seen order.
///
/// Serialized as a list of `[[name, size], count]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(FontId, u32)>", into = "Vec<(FontId, u32)>")]
pub struct FontHistogram {
    counts: IndexMap<FontId, u32>,
}

impl FontHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the glyphs of a region.
    ///
    /// # Arguments
    ///
    /// * `glyphs` - Characters with their font name and size
    /// * `k` - Size bucket granularity, `0` to keep raw sizes
    /// * `clean` - Strip subset tags and encoding suffixes from font names
    pub fn from_glyphs<'a, I>(glyphs: I, k: u32, clean: bool) -> Self
    where
        I: IntoIterator<Item = &'a Glyph>,
    {
        let mut hist = Self::new();
        for glyph in glyphs {
            let name = if clean {
                clean_font_name(&glyph.font_name)
            } else {
                glyph.font_name.clone()
            };
            hist.add(FontId::new(name, bucket_size(glyph.size, k)), 1);
        }
        hist
    }

    /// Add `count` occurrences of a font.
    pub fn add(&mut self, font: FontId, count: u32) {
        *self.counts.entry(font).or_insert(0) += count;
    }

    /// Add every count of `other` into this histogram.
    pub fn merge(&mut self, other: &FontHistogram) {
        for (font, &count) in &other.counts {
            self.add(font.clone(), count);
        }
    }

    /// Count for one font.
    pub fn get(&self, font: &FontId) -> u32 {
        self.counts.get(font).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    /// Number of distinct fonts.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no font was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&FontId, u32)> {
        self.counts.iter().map(|(f, &c)| (f, c))
    }

    /// Fonts ranked by descending count.
    ///
    /// Equal counts are ordered by font name, then size, so the ranking does
    /// not depend on insertion order.
    pub fn most_common(&self) -> Vec<(&FontId, u32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|(fa, ca), (fb, cb)| cb.cmp(ca).then_with(|| fa.lexical_cmp(fb)));
        ranked
    }

    /// The single most frequent font, if any.
    pub fn top(&self) -> Option<&FontId> {
        self.most_common().first().map(|(f, _)| *f)
    }

    /// Share of `count` in this histogram's total.
    pub fn share(&self, count: u32) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }
}

impl From<Vec<(FontId, u32)>> for FontHistogram {
    fn from(entries: Vec<(FontId, u32)>) -> Self {
        let mut hist = Self::new();
        for (font, count) in entries {
            hist.add(font, count);
        }
        hist
    }
}

impl From<FontHistogram> for Vec<(FontId, u32)> {
    fn from(hist: FontHistogram) -> Self {
        hist.counts.into_iter().collect()
    }
}

impl FromIterator<(FontId, u32)> for FontHistogram {
    fn from_iter<I: IntoIterator<Item = (FontId, u32)>>(iter: I) -> Self {
        let mut hist = Self::new();
        for (font, count) in iter {
            hist.add(font, count);
        }
        hist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_quarter_points() {
        assert_eq!(bucket_size(10.1, 4), 10.0);
        assert_eq!(bucket_size(10.13, 4), 10.25);
        assert_eq!(bucket_size(10.4, 2), 10.5);
        assert_eq!(bucket_size(10.4, 1), 10.0);
    }

    #[test]
    fn test_from_glyphs_counts() {
        let glyphs = vec![
            Glyph::new("Times", 10.02),
            Glyph::new("Times", 9.98),
            Glyph::new("Times-Bold", 14.0),
            Glyph::new("Times", 10.01),
        ];
        let hist = FontHistogram::from_glyphs(&glyphs, 4, false);

        assert_eq!(hist.len(), 2);
        assert_eq!(hist.get(&FontId::new("Times", 10.0)), 3);
        assert_eq!(hist.get(&FontId::new("Times-Bold", 14.0)), 1);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_from_glyphs_cleans_names() {
        let glyphs = vec![Glyph::new("ABCDEF+Minion-Regular", 10.0), Glyph::new("Minion-Regular", 10.0)];
        let hist = FontHistogram::from_glyphs(&glyphs, 4, true);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.get(&FontId::new("Minion-Regular", 10.0)), 2);
    }

    #[test]
    fn test_most_common_tie_break() {
        let hist: FontHistogram = vec![
            (FontId::new("Zapf", 10.0), 5),
            (FontId::new("Arial", 12.0), 5),
            (FontId::new("Arial", 10.0), 5),
            (FontId::new("Courier", 9.0), 9),
        ]
        .into_iter()
        .collect();

        let names: Vec<String> = hist.most_common().iter().map(|(f, _)| f.to_string()).collect();
        assert_eq!(names, vec!["(Courier, 9)", "(Arial, 10)", "(Arial, 12)", "(Zapf, 10)"]);
        assert_eq!(hist.top(), Some(&FontId::new("Courier", 9.0)));
    }

    #[test]
    fn test_merge() {
        let mut a: FontHistogram = vec![(FontId::new("Times", 10.0), 3)].into_iter().collect();
        let b: FontHistogram = vec![
            (FontId::new("Times", 10.0), 2),
            (FontId::new("Helvetica", 8.0), 1),
        ]
        .into_iter()
        .collect();
        a.merge(&b);
        assert_eq!(a.get(&FontId::new("Times", 10.0)), 5);
        assert_eq!(a.total(), 6);
    }

    #[test]
    fn test_wire_format() {
        let hist: FontHistogram = vec![(FontId::new("Times", 9.75), 12)].into_iter().collect();
        let json = serde_json::to_string(&hist).unwrap();
        assert_eq!(json, r#"[[["Times",9.75],12]]"#);

        let parsed: FontHistogram = serde_json::from_str(r#"[[["Times", 10], 3], [["Times", 10.0], 2]]"#).unwrap();
        assert_eq!(parsed.get(&FontId::new("Times", 10.0)), 5);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = FontHistogram::new();
        assert!(hist.is_empty());
        assert_eq!(hist.top(), None);
        assert_eq!(hist.share(3), 0.0);
    }

    proptest! {
        #[test]
        fn prop_counts_sum_to_glyphs(
            sizes in prop::collection::vec((0usize..3, 4.0f32..30.0), 0..200),
            k in 0u32..8,
        ) {
            let names = ["Times", "Helvetica", "Courier"];
            let glyphs: Vec<Glyph> = sizes.iter().map(|&(n, s)| Glyph::new(names[n], s)).collect();
            let hist = FontHistogram::from_glyphs(&glyphs, k, false);
            prop_assert_eq!(hist.total(), glyphs.len() as u64);
        }

        #[test]
        fn prop_bucket_idempotent(size in 0.0f32..200.0, k in 1u32..16) {
            let once = bucket_size(size, k);
            prop_assert_eq!(bucket_size(once, k), once);
        }
    }
}

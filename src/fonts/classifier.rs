//! Frequency-based font classification.
//!
//! Across a whole book the detector's labels are noisy, but fonts are not: the
//! body text of a book is set in one or two font-identities that dominate the
//! regions labelled as plain text. This module learns three disjoint font sets
//! (body, heading, noise) from the raw records of every chapter.
//!
//! # Algorithm
//!
//! 1. Sum the record histograms into one global histogram per coarse kind.
//! 2. Walk the body ranking until a font's share drops below the cutoff.
//!    A candidate equal to the top heading font or the top noise font is
//!    contested: it is left out of the body set and its `(kind, rank)` slot is
//!    blacklisted.
//! 3. Resolve heading and noise fonts breadth-first from rank 0, admitting
//!    each font above the cutoff that no other kind has claimed yet.

use crate::error::{Error, Result};
use crate::fonts::histogram::{FontHistogram, FontId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Default minimum frequency share for a font to be classified.
pub const DEFAULT_CUTOFF: f64 = 0.10;

/// Number of fonts per kind shown in a [`FontReport`].
const REPORT_TOP_N: usize = 6;

/// Coarse text kind a font can denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontKind {
    /// Running body text
    Body,
    /// Titles and section headings
    Heading,
    /// Everything else: headers, footers, page numbers, captions
    Noise,
}

impl FontKind {
    /// Coarse kind of a record label, as used for classification.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::fonts::FontKind;
    ///
    /// assert_eq!(FontKind::from_label(Some("plain text")), FontKind::Body);
    /// assert_eq!(FontKind::from_label(Some("Title")), FontKind::Heading);
    /// assert_eq!(FontKind::from_label(Some("footer")), FontKind::Noise);
    /// assert_eq!(FontKind::from_label(None), FontKind::Noise);
    /// ```
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("plain text") | Some("Text") => Self::Body,
            Some("title") | Some("Title") => Self::Heading,
            _ => Self::Noise,
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Heading => "heading",
            Self::Noise => "noise",
        }
    }
}

impl fmt::Display for FontKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three disjoint sets of font-identities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontClassification {
    /// Fonts of running text
    #[serde(default)]
    pub body: Vec<FontId>,
    /// Heading fonts
    #[serde(default)]
    pub heading: Vec<FontId>,
    /// Fonts of discardable text
    #[serde(default)]
    pub noise: Vec<FontId>,
}

impl FontClassification {
    /// Which set a font belongs to, if any.
    pub fn kind_of(&self, font: &FontId) -> Option<FontKind> {
        if self.body.contains(font) {
            Some(FontKind::Body)
        } else if self.heading.contains(font) {
            Some(FontKind::Heading)
        } else if self.noise.contains(font) {
            Some(FontKind::Noise)
        } else {
            None
        }
    }

    /// Whether no font is classified at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.heading.is_empty() && self.noise.is_empty()
    }

    /// The set for one kind.
    pub fn fonts(&self, kind: FontKind) -> &[FontId] {
        match kind {
            FontKind::Body => &self.body,
            FontKind::Heading => &self.heading,
            FontKind::Noise => &self.noise,
        }
    }

    fn fonts_mut(&mut self, kind: FontKind) -> &mut Vec<FontId> {
        match kind {
            FontKind::Body => &mut self.body,
            FontKind::Heading => &mut self.heading,
            FontKind::Noise => &mut self.noise,
        }
    }
}

/// Global font histograms, one per coarse kind.
#[derive(Debug, Clone, Default)]
pub struct FontTally {
    /// Fonts of plain-text records
    pub body: FontHistogram,
    /// Fonts of title records
    pub heading: FontHistogram,
    /// Fonts of all other records
    pub noise: FontHistogram,
}

impl FontTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record's fonts under the kind of its label.
    pub fn add(&mut self, label: Option<&str>, fonts: &FontHistogram) {
        self.histogram_mut(FontKind::from_label(label)).merge(fonts);
    }

    /// Histogram for one kind.
    pub fn histogram(&self, kind: FontKind) -> &FontHistogram {
        match kind {
            FontKind::Body => &self.body,
            FontKind::Heading => &self.heading,
            FontKind::Noise => &self.noise,
        }
    }

    fn histogram_mut(&mut self, kind: FontKind) -> &mut FontHistogram {
        match kind {
            FontKind::Body => &mut self.body,
            FontKind::Heading => &mut self.heading,
            FontKind::Noise => &mut self.noise,
        }
    }

    /// Summary of the most frequent fonts per kind.
    pub fn report(&self) -> FontReport {
        let rows = |kind: FontKind| -> Vec<(FontId, u32, f64)> {
            let hist = self.histogram(kind);
            hist.most_common()
                .into_iter()
                .take(REPORT_TOP_N)
                .map(|(font, count)| (font.clone(), count, hist.share(count)))
                .collect()
        };
        FontReport {
            body: rows(FontKind::Body),
            heading: rows(FontKind::Heading),
            noise: rows(FontKind::Noise),
        }
    }
}

/// Most frequent fonts per kind with their counts and shares.
#[derive(Debug, Clone, PartialEq)]
pub struct FontReport {
    /// Top body fonts
    pub body: Vec<(FontId, u32, f64)>,
    /// Top heading fonts
    pub heading: Vec<(FontId, u32, f64)>,
    /// Top noise fonts
    pub noise: Vec<(FontId, u32, f64)>,
}

impl fmt::Display for FontReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        for (kind, rows) in [
            (FontKind::Body, &self.body),
            (FontKind::Heading, &self.heading),
            (FontKind::Noise, &self.noise),
        ] {
            writeln!(f, "{}", rule)?;
            writeln!(f, "# {} fonts", kind)?;
            for (font, count, share) in rows {
                writeln!(
                    f,
                    "{:<30}: {:>6}  ({:.2}%)",
                    font.to_string(),
                    count,
                    share * 100.0
                )?;
            }
        }
        writeln!(f, "{}", rule)
    }
}

/// Learns a [`FontClassification`] from a [`FontTally`].
#[derive(Debug, Clone, Copy)]
pub struct FontClassifier {
    cutoff: f64,
}

impl Default for FontClassifier {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl FontClassifier {
    /// Create a classifier with a frequency cutoff in `[0, 1]`.
    pub fn new(cutoff: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(Error::InvalidConfig(format!(
                "font cutoff must be within [0, 1], got {}",
                cutoff
            )));
        }
        Ok(Self { cutoff })
    }

    /// The frequency cutoff.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Derive the three font sets.
    ///
    /// Fails with [`Error::MissingFontData`] when no plain-text fonts were
    /// recorded. Empty heading or noise histograms simply yield empty sets.
    pub fn classify(&self, tally: &FontTally) -> Result<FontClassification> {
        if tally.body.is_empty() {
            return Err(Error::MissingFontData("body"));
        }

        let ranked: HashMap<FontKind, Vec<(&FontId, u32)>> = [
            FontKind::Body,
            FontKind::Heading,
            FontKind::Noise,
        ]
        .into_iter()
        .map(|kind| (kind, tally.histogram(kind).most_common()))
        .collect();

        let top_heading = ranked[&FontKind::Heading].first().map(|(f, _)| *f);
        let top_noise = ranked[&FontKind::Noise].first().map(|(f, _)| *f);

        let mut out = FontClassification::default();
        let mut claims: HashMap<FontId, FontKind> = HashMap::new();
        let mut blacklist: HashSet<(FontKind, usize)> = HashSet::new();

        for (rank, &(font, count)) in ranked[&FontKind::Body].iter().enumerate() {
            if tally.body.share(count) < self.cutoff {
                break;
            }
            if Some(font) == top_heading {
                log::debug!("Body candidate {} contested by heading", font);
                blacklist.insert((FontKind::Heading, rank));
                continue;
            }
            if Some(font) == top_noise {
                log::debug!("Body candidate {} contested by noise", font);
                blacklist.insert((FontKind::Noise, rank));
                continue;
            }
            out.body.push(font.clone());
            claims.insert(font.clone(), FontKind::Body);
        }

        let mut queue: VecDeque<(FontKind, usize)> = [(FontKind::Heading, 0), (FontKind::Noise, 0)]
            .into_iter()
            .filter(|slot| !blacklist.contains(slot))
            .collect();

        while let Some((kind, rank)) = queue.pop_front() {
            let Some(&(font, count)) = ranked[&kind].get(rank) else {
                continue;
            };
            let share = tally.histogram(kind).share(count);
            if share < self.cutoff {
                continue;
            }
            if !claims.contains_key(font) {
                log::debug!("Admitting {} as {} font ({:.2}%)", font, kind, share * 100.0);
                claims.insert(font.clone(), kind);
                out.fonts_mut(kind).push(font.clone());
            }
            let next = (kind, rank + 1);
            if !blacklist.contains(&next) {
                queue.push_back(next);
            }
        }

        log::info!(
            "Classified fonts: {} body, {} heading, {} noise",
            out.body.len(),
            out.heading.len(),
            out.noise.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(entries: &[(&str, f32, u32)]) -> FontHistogram {
        entries
            .iter()
            .map(|&(name, size, count)| (FontId::new(name, size), count))
            .collect()
    }

    fn font(name: &str, size: f32) -> FontId {
        FontId::new(name, size)
    }

    #[test]
    fn test_distinct_fonts() {
        let tally = FontTally {
            body: hist(&[("Minion", 10.0, 800), ("Minion-It", 10.0, 195), ("Symbol", 10.0, 5)]),
            heading: hist(&[("Myriad-Bold", 18.0, 80), ("Myriad-Bold", 14.0, 20)]),
            noise: hist(&[("Myriad", 8.0, 300), ("Minion", 10.0, 10)]),
        };
        let fonts = FontClassifier::default().classify(&tally).unwrap();

        assert_eq!(fonts.body, vec![font("Minion", 10.0), font("Minion-It", 10.0)]);
        assert_eq!(fonts.heading, vec![font("Myriad-Bold", 18.0), font("Myriad-Bold", 14.0)]);
        assert_eq!(fonts.noise, vec![font("Myriad", 8.0)]);
    }

    #[test]
    fn test_body_candidate_contested_by_heading() {
        // "Minion 10" is both the second body font and the top heading font
        let tally = FontTally {
            body: hist(&[("Minion", 9.0, 700), ("Minion", 10.0, 300)]),
            heading: hist(&[("Minion", 10.0, 60), ("Myriad", 16.0, 40)]),
            noise: hist(&[("Myriad", 7.0, 100)]),
        };
        let fonts = FontClassifier::default().classify(&tally).unwrap();

        assert_eq!(fonts.body, vec![font("Minion", 9.0)]);
        // heading rank 1 is blacklisted, so only rank 0 is admitted
        assert_eq!(fonts.heading, vec![font("Minion", 10.0)]);
        assert_eq!(fonts.noise, vec![font("Myriad", 7.0)]);
    }

    #[test]
    fn test_heading_check_wins_over_noise() {
        let tally = FontTally {
            body: hist(&[("Minion", 10.0, 100)]),
            heading: hist(&[("Minion", 10.0, 5)]),
            noise: hist(&[("Minion", 10.0, 5)]),
        };
        let fonts = FontClassifier::default().classify(&tally).unwrap();

        assert!(fonts.body.is_empty());
        assert!(fonts.heading.is_empty());
        assert_eq!(fonts.noise, vec![font("Minion", 10.0)]);
    }

    #[test]
    fn test_shared_font_claimed_once() {
        let tally = FontTally {
            body: hist(&[("Minion", 10.0, 100)]),
            heading: hist(&[("Myriad", 12.0, 60), ("Myriad", 8.0, 40)]),
            noise: hist(&[("Myriad", 8.0, 80), ("Myriad", 12.0, 20)]),
        };
        let fonts = FontClassifier::default().classify(&tally).unwrap();

        // Breadth-first: heading takes Myriad 12 at rank 0, noise Myriad 8 at
        // rank 0; the later ranks find both fonts already claimed.
        assert_eq!(fonts.heading, vec![font("Myriad", 12.0)]);
        assert_eq!(fonts.noise, vec![font("Myriad", 8.0)]);
    }

    #[test]
    fn test_empty_heading_and_noise() {
        let tally = FontTally {
            body: hist(&[("Minion", 10.0, 10)]),
            ..FontTally::default()
        };
        let fonts = FontClassifier::default().classify(&tally).unwrap();
        assert_eq!(fonts.body, vec![font("Minion", 10.0)]);
        assert!(fonts.heading.is_empty());
        assert!(fonts.noise.is_empty());
    }

    #[test]
    fn test_empty_body_is_fatal() {
        let tally = FontTally {
            heading: hist(&[("Myriad", 18.0, 10)]),
            ..FontTally::default()
        };
        assert!(matches!(
            FontClassifier::default().classify(&tally),
            Err(Error::MissingFontData("body"))
        ));
    }

    #[test]
    fn test_zero_cutoff_terminates() {
        let tally = FontTally {
            body: hist(&[("A", 10.0, 1), ("B", 10.0, 1)]),
            heading: hist(&[("C", 10.0, 1), ("D", 10.0, 1)]),
            noise: hist(&[("E", 10.0, 1)]),
        };
        let fonts = FontClassifier::new(0.0).unwrap().classify(&tally).unwrap();
        assert_eq!(fonts.body.len(), 2);
        assert_eq!(fonts.heading.len(), 2);
        assert_eq!(fonts.noise.len(), 1);
    }

    #[test]
    fn test_invalid_cutoff() {
        assert!(FontClassifier::new(1.5).is_err());
        assert!(FontClassifier::new(-0.1).is_err());
    }

    #[test]
    fn test_tally_from_labels() {
        let mut tally = FontTally::new();
        let fonts = hist(&[("Minion", 10.0, 4)]);
        tally.add(Some("plain text"), &fonts);
        tally.add(Some("Text"), &fonts);
        tally.add(Some("title"), &fonts);
        tally.add(Some("FigureCaption_3-2"), &fonts);
        tally.add(None, &fonts);

        assert_eq!(tally.body.total(), 8);
        assert_eq!(tally.heading.total(), 4);
        assert_eq!(tally.noise.total(), 8);
    }

    #[test]
    fn test_kind_of() {
        let fonts = FontClassification {
            body: vec![font("Minion", 10.0)],
            heading: vec![font("Myriad", 18.0)],
            noise: vec![],
        };
        assert_eq!(fonts.kind_of(&font("Minion", 10.0)), Some(FontKind::Body));
        assert_eq!(fonts.kind_of(&font("Myriad", 18.0)), Some(FontKind::Heading));
        assert_eq!(fonts.kind_of(&font("Myriad", 8.0)), None);
    }

    #[test]
    fn test_report_display() {
        let tally = FontTally {
            body: hist(&[("Minion", 10.0, 3), ("Minion-It", 10.0, 1)]),
            ..FontTally::default()
        };
        let text = tally.report().to_string();
        assert!(text.contains("# body fonts"));
        assert!(text.contains("(Minion, 10)"));
        assert!(text.contains("75.00%"));
    }
}

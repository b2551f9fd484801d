//! Font name normalisation.
//!
//! Embedded fonts are usually subset and carry a six-letter tag
//! (`ABCDEF+Minion-Regular`); CID fonts may also carry their encoding
//! (`Minion-Regular-Identity-H`). Neither says anything about how the text is
//! styled, so both are dropped before fonts are counted.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Subset tag prefix: exactly six uppercase letters and a plus sign
    static ref RE_SUBSET_TAG: Regex = Regex::new(r"^[A-Z]{6}\+").unwrap();

    /// Encoding suffix appended to CID font names
    static ref RE_ENCODING_SUFFIX: Regex = Regex::new(r"-Identity-[HV]$").unwrap();
}

/// Strip the subset tag and encoding suffix from a font name.
///
/// # Examples
///
/// ```
/// use pdf_stitch::fonts::clean_font_name;
///
/// assert_eq!(clean_font_name("ABCDEF+Minion-Regular"), "Minion-Regular");
/// assert_eq!(clean_font_name("Minion-Regular-Identity-H"), "Minion-Regular");
/// assert_eq!(clean_font_name("Times-Bold"), "Times-Bold");
/// ```
pub fn clean_font_name(name: &str) -> String {
    let name = name.trim();
    let name = RE_SUBSET_TAG.replace(name, "");
    RE_ENCODING_SUFFIX.replace(&name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_tag_requires_six_capitals() {
        assert_eq!(clean_font_name("ABCDE+Font"), "ABCDE+Font");
        assert_eq!(clean_font_name("abcdef+Font"), "abcdef+Font");
        assert_eq!(clean_font_name("QWERTY+Font"), "Font");
    }

    #[test]
    fn test_both_affixes() {
        assert_eq!(clean_font_name("XKJHQP+Arial-Identity-V"), "Arial");
    }

    #[test]
    fn test_style_suffix_kept() {
        assert_eq!(clean_font_name("Arial,Bold"), "Arial,Bold");
    }
}

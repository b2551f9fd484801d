//! Hyphen-aware joining of text fragments.
//!
//! A paragraph that breaks across a page or column often breaks mid-word:
//!
//! - "Govern-" (end of page 12) + "ment of the" (top of page 13) → "Government of the"
//! - "self-" + "regulation" → "self-regulation" (compound, hyphen kept)
//!
//! Soft hyphens (U+00AD) always mark a break and are always removed. Hard
//! hyphens are removed unless the two halves look like a compound word.

const SOFT_HYPHEN: char = '\u{00AD}';

/// Joins a continuation fragment onto the text before it.
#[derive(Debug, Clone)]
pub struct HyphenJoiner {
    /// Minimum length of the continuing word part
    /// (prevents joining onto list markers and stray letters)
    min_continuation_length: usize,

    /// Whether to keep the hyphen of compound words
    preserve_compounds: bool,
}

impl Default for HyphenJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl HyphenJoiner {
    /// Create a joiner with default settings.
    pub fn new() -> Self {
        Self {
            min_continuation_length: 2,
            preserve_compounds: true,
        }
    }

    /// Set minimum continuation length for word joining.
    pub fn with_min_continuation_length(mut self, len: usize) -> Self {
        self.min_continuation_length = len;
        self
    }

    /// Set whether to preserve compound words.
    pub fn with_preserve_compounds(mut self, preserve: bool) -> Self {
        self.preserve_compounds = preserve;
        self
    }

    /// Check if text ends with a hyphen that continues a word.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::text::HyphenJoiner;
    ///
    /// assert!(HyphenJoiner::is_continuation_hyphen("Govern-"));
    /// assert!(HyphenJoiner::is_continuation_hyphen("busi\u{00AD}  "));
    /// assert!(!HyphenJoiner::is_continuation_hyphen("1990-"));
    /// assert!(!HyphenJoiner::is_continuation_hyphen("-"));
    /// ```
    pub fn is_continuation_hyphen(text: &str) -> bool {
        let trimmed = text.trim_end();
        let Some(before) = trimmed
            .strip_suffix(SOFT_HYPHEN)
            .or_else(|| trimmed.strip_suffix('-'))
        else {
            return false;
        };
        before.chars().last().is_some_and(|c| c.is_alphabetic())
    }

    /// Check if two word halves form a compound that keeps its hyphen.
    fn is_compound_word(first_part: &str, second_part: &str) -> bool {
        let first_lower = first_part.to_lowercase();

        let compound_prefixes = [
            "self", "non", "anti", "pre", "post", "re", "co", "ex", "multi", "semi", "sub",
            "super", "ultra", "cross", "inter", "intra", "counter", "mid", "well", "ill", "all",
            "half", "high", "low", "full", "long", "short",
        ];
        if compound_prefixes.contains(&first_lower.as_str()) {
            return true;
        }

        // A capitalised second half reads as a new name, not a word tail
        second_part.chars().next().is_some_and(|c| c.is_uppercase())
            && first_part.chars().next().is_some_and(|c| c.is_uppercase())
    }

    /// Join `next` onto `prev` if `prev` ends with a word-continuation hyphen.
    ///
    /// Returns `None` when no hyphen join applies, so the caller can fall back
    /// to a plain separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stitch::text::HyphenJoiner;
    ///
    /// let joiner = HyphenJoiner::new();
    /// assert_eq!(
    ///     joiner.join("by the Govern-", "ment of Canada").as_deref(),
    ///     Some("by the Government of Canada")
    /// );
    /// assert_eq!(joiner.join("self-", "regulation"), None);
    /// ```
    pub fn join(&self, prev: &str, next: &str) -> Option<String> {
        let trimmed_prev = prev.trim_end();
        if !Self::is_continuation_hyphen(trimmed_prev) {
            return None;
        }

        let is_soft = trimmed_prev.ends_with(SOFT_HYPHEN);
        let without_hyphen = if is_soft {
            &trimmed_prev[..trimmed_prev.len() - SOFT_HYPHEN.len_utf8()]
        } else {
            &trimmed_prev[..trimmed_prev.len() - 1]
        };

        let trimmed_next = next.trim_start();
        let next_word = trimmed_next.split_whitespace().next().unwrap_or("");
        if next_word.chars().count() < self.min_continuation_length {
            return None;
        }

        let last_word = without_hyphen
            .split_whitespace()
            .next_back()
            .unwrap_or(without_hyphen);
        if !is_soft && self.preserve_compounds && Self::is_compound_word(last_word, next_word) {
            return None;
        }

        let mut joined = String::with_capacity(without_hyphen.len() + trimmed_next.len());
        joined.push_str(without_hyphen);
        joined.push_str(trimmed_next);
        Some(joined)
    }
}

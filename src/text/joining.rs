//! Helpers for stitching consecutive text fragments together.

use crate::text::hyphenation::HyphenJoiner;

/// Default minimum overlap (in characters) before duplicated text is clipped.
pub const DEFAULT_MIN_OVERLAP: usize = 8;

/// Characters that end a sentence or a run-in lead.
const TERMINALS: [char; 4] = ['.', '!', '?', ':'];

/// Whether text ends a sentence, ignoring trailing whitespace.
///
/// # Examples
///
/// ```
/// use pdf_stitch::text::term_str;
///
/// assert!(term_str("End of section."));
/// assert!(term_str("Findings:  \n"));
/// assert!(!term_str("continues"));
/// assert!(!term_str(""));
/// ```
pub fn term_str(s: &str) -> bool {
    s.trim_end().ends_with(TERMINALS)
}

/// Length in characters of the longest suffix of `body` that is also a prefix
/// of `txt`, after trimming trailing whitespace from `body` and leading
/// whitespace from `txt`.
pub fn overlap_len(body: &str, txt: &str) -> usize {
    let body = body.trim_end();
    let txt = txt.trim_start();

    let body_starts: Vec<usize> = body.char_indices().map(|(i, _)| i).collect();
    let txt_ends: Vec<usize> = txt
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .collect();

    let max = body_starts.len().min(txt_ends.len());
    let mut overlap = 0;
    for n in 1..=max {
        let suffix = &body[body_starts[body_starts.len() - n]..];
        let prefix = &txt[..txt_ends[n - 1]];
        if suffix == prefix {
            overlap = n;
        }
    }
    overlap
}

/// Remove from `txt` the text it repeats from the end of `body`.
///
/// Leading whitespace of `txt` is dropped first. The overlap is only removed
/// when it is at least `min_overlap` characters long; otherwise the trimmed
/// `txt` is returned as is.
///
/// # Examples
///
/// ```
/// use pdf_stitch::text::clip_overlap;
///
/// assert_eq!(clip_overlap("...the quick brown", "brown fox jumps", 5), " fox jumps");
/// assert_eq!(clip_overlap("...the quick brown", "brown fox jumps", 8), "brown fox jumps");
/// ```
pub fn clip_overlap<'a>(body: &str, txt: &'a str, min_overlap: usize) -> &'a str {
    let txt = txt.trim_start();
    let overlap = overlap_len(body, txt);
    if overlap >= min_overlap && overlap > 0 {
        let cut = txt
            .char_indices()
            .nth(overlap)
            .map(|(i, _)| i)
            .unwrap_or(txt.len());
        &txt[cut..]
    } else {
        txt
    }
}

/// Append a continuation fragment to the text of a block.
///
/// Duplicated text at the seam is clipped first. When the fragments overlap
/// the remainder is appended directly, since the overlap may end mid-word.
/// Otherwise the seam is either a hyphenated word, rejoined by the
/// [`HyphenJoiner`], or a single space.
///
/// # Examples
///
/// ```
/// use pdf_stitch::text::{join_fragments, HyphenJoiner};
///
/// let joiner = HyphenJoiner::new();
/// assert_eq!(
///     join_fragments("the quick brown", "brown fox", 5, &joiner),
///     "the quick brown fox"
/// );
/// assert_eq!(join_fragments("a pleural ef-", "fusion", 8, &joiner), "a pleural effusion");
/// assert_eq!(join_fragments("lower lobe", "consolidation", 8, &joiner), "lower lobe consolidation");
/// ```
pub fn join_fragments(body: &str, txt: &str, min_overlap: usize, joiner: &HyphenJoiner) -> String {
    let head = body.trim_end();
    let tail = txt.trim_start();

    let overlap = overlap_len(head, tail);
    if overlap >= min_overlap && overlap > 0 {
        let clipped = clip_overlap(head, tail, min_overlap);
        let mut out = String::with_capacity(head.len() + clipped.len());
        out.push_str(head);
        out.push_str(clipped.trim_end());
        return out;
    }

    if let Some(joined) = joiner.join(head, tail) {
        return joined;
    }

    if head.is_empty() {
        return tail.to_string();
    }
    if tail.is_empty() {
        return head.to_string();
    }
    format!("{} {}", head, tail)
}

//! Splits corpus text into sections on a literal delimiter.

/// Splits `corpus` on every occurrence of `delimiter`.
///
/// The split is purely literal. Section contents are preserved verbatim:
/// no trimming, no normalization, and empty sections are kept, so a text
/// with `n` delimiter occurrences always yields `n + 1` sections. A
/// corpus that never contains the delimiter comes back as a single
/// section holding the whole text; an empty corpus as a single empty
/// section.
///
/// # Examples
///
/// ```
/// use askdocs::corpus::split_sections;
///
/// let sections = split_sections("a|b|c", "|");
/// assert_eq!(sections, vec!["a", "b", "c"]);
/// ```
pub fn split_sections<'a>(corpus: &'a str, delimiter: &str) -> Vec<&'a str> {
    debug_assert!(!delimiter.is_empty(), "delimiter must not be empty");
    corpus.split(delimiter).collect()
}

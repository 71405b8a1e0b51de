//! Lemma-sequence matching.
//!
//! A [`Pattern`] is a list of lemmas with optional bounded gaps:
//!
//! ```text
//! "správce *1 osobní údaj"
//!   Lemma("správce") Gap(1) Lemma("osobní") Lemma("údaj")
//! ```
//!
//! `*n` allows between `0` and `n` arbitrary tokens before the next lemma.
//! Matching is a left-to-right scan from each candidate start with no
//! backtracking: a gap stops at the *first* token equal to the next lemma.
//!
//! ## Modes
//!
//! - [`MatchMode::Strict`]: gaps may run across sentence boundaries.
//! - [`MatchMode::Sentence`]: every token of the match must lie in the
//!   sentence of the candidate start, and a gap (or the leading-noise scan)
//!   that reaches a terminator lemma fails. The first lemma may additionally
//!   be found up to [`MatcherConfig::leading_noise`] tokens after the
//!   candidate start.
//!
//! ## Output
//!
//! Every successful candidate start is reported in ascending order. Matches
//! may overlap; callers work with the union of covered sentences, not with
//! spans.

use super::document::Document;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// An inclusive token range `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    Lemma(String),
    /// Up to `n` arbitrary tokens (`n >= 1`).
    Gap(usize),
}

/// A validated lemma pattern.
///
/// Construction guarantees the pattern is non-empty, every gap bound is
/// positive, and every gap is followed by a lemma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    elements: Vec<PatternElement>,
}

impl Pattern {
    /// Parse pattern items such as `["doba", "*1", "léta"]`.
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        let source = || items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(" ");
        let mut elements = Vec::with_capacity(items.len());

        for item in items {
            let item = item.as_ref().trim();
            if let Some(bound) = item.strip_prefix('*') {
                let caps = regex!(r"^\d+$").captures(bound);
                let n = caps
                    .and_then(|c| c.get(0))
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .ok_or_else(|| Error::invalid_pattern(source(), format!("bad wildcard `{item}`")))?;
                if n == 0 {
                    return Err(Error::invalid_pattern(source(), "wildcard bound must be positive"));
                }
                if matches!(elements.last(), Some(PatternElement::Gap(_))) {
                    return Err(Error::invalid_pattern(source(), "two wildcards in a row"));
                }
                elements.push(PatternElement::Gap(n));
            } else if item.is_empty() {
                return Err(Error::invalid_pattern(source(), "empty lemma"));
            } else {
                elements.push(PatternElement::Lemma(item.to_string()));
            }
        }

        match elements.last() {
            None => Err(Error::invalid_pattern(source(), "pattern is empty")),
            Some(PatternElement::Gap(_)) => Err(Error::invalid_pattern(source(), "wildcard must be followed by a lemma")),
            Some(PatternElement::Lemma(_)) => Ok(Pattern { elements }),
        }
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    /// Number of elements, gaps included. This is what bounds the candidate
    /// start window.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

impl FromStr for Pattern {
    type Err = Error;

    /// Whitespace-separated items: `"po doba *1 léta"`.
    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(&s.split_whitespace().collect::<Vec<_>>())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match element {
                PatternElement::Lemma(lemma) => f.write_str(lemma)?,
                PatternElement::Gap(n) => write!(f, "*{n}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Strict,
    Sentence,
}

/// Sentence-mode tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Lemmas that end a sentence.
    pub terminators: Vec<String>,
    /// How many tokens the sentence-mode scan may skip before the first lemma.
    pub leading_noise: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig { terminators: vec![".".to_string()], leading_noise: 2 }
    }
}

/// Runs patterns against one document.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'d> {
    doc: &'d Document,
    config: &'d MatcherConfig,
}

impl<'d> Matcher<'d> {
    pub fn new(doc: &'d Document, config: &'d MatcherConfig) -> Self {
        Matcher { doc, config }
    }

    /// All matches of `pattern` whose candidate start lies in
    /// `[from, to - pattern.len() + 1)`.
    ///
    /// `to = None` means the end of the document; both bounds are clamped to
    /// the token count. Matches themselves may extend past `to`.
    ///
    /// ```text
    /// lemmas : a  x  y  b
    /// pattern: a *2 b        -> [0..=3]
    /// pattern: a *1 b        -> []      (gap of 2 > 1)
    /// ```
    pub fn find_occurrences(&self, pattern: &Pattern, from: usize, to: Option<usize>, mode: MatchMode) -> Vec<Span> {
        let len = self.doc.len();
        let to = to.map_or(len, |t| t.min(len));
        let from = from.min(len);
        let Some(last_start) = (to + 1).checked_sub(pattern.len()) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for start in from..last_start {
            if let Some(end) = self.match_at(pattern, start, mode) {
                trace!(%pattern, start, end, ?mode, "pattern matched");
                found.push(Span { start, end });
            }
        }
        found
    }

    /// Matches of every pattern, concatenated pattern by pattern (each block in
    /// ascending order; the whole list is not re-sorted).
    pub fn find_many(&self, patterns: &[Pattern], from: usize, to: Option<usize>, mode: MatchMode) -> Vec<Span> {
        let mut found = Vec::new();
        for pattern in patterns {
            let spans = self.find_occurrences(pattern, from, to, mode);
            if !spans.is_empty() {
                debug!(%pattern, matches = spans.len(), "pattern hits");
            }
            found.extend(spans);
        }
        found
    }

    /// Try to consume `pattern` starting at `start`; returns the index of the
    /// last consumed token.
    fn match_at(&self, pattern: &Pattern, start: usize, mode: MatchMode) -> Option<usize> {
        let tokens = self.doc.tokens();
        let elements = pattern.elements();
        // Sentence mode pins every token of the match to the start's sentence.
        let sentence = match mode {
            MatchMode::Sentence => Some(tokens.get(start)?.sentence_id),
            MatchMode::Strict => None,
        };
        let mut cursor = start;
        let mut end = None;

        if sentence.is_some() {
            if let Some(PatternElement::Lemma(first)) = elements.first() {
                cursor = self.skip_to(cursor, first, self.config.leading_noise, sentence)?;
            }
        }

        let mut k = 0;
        while k < elements.len() {
            match &elements[k] {
                PatternElement::Lemma(lemma) => {
                    let token = tokens.get(cursor)?;
                    if token.lemma != *lemma || sentence.is_some_and(|s| token.sentence_id != s) {
                        return None;
                    }
                    end = Some(cursor);
                    cursor += 1;
                }
                PatternElement::Gap(limit) => {
                    // Validated: a gap is always followed by a lemma, which the
                    // next iteration consumes at the cursor we stop on.
                    let PatternElement::Lemma(next) = elements.get(k + 1)? else {
                        return None;
                    };
                    cursor = self.skip_to(cursor, next, *limit, sentence)?;
                }
            }
            k += 1;
        }

        end
    }

    /// Advance from `cursor` to the first token whose lemma is `target`,
    /// skipping at most `limit` tokens. With a `sentence` bound, leaving that
    /// sentence or skipping a terminator ends the attempt.
    fn skip_to(&self, mut cursor: usize, target: &str, limit: usize, sentence: Option<usize>) -> Option<usize> {
        let tokens = self.doc.tokens();
        let mut skipped = 0;
        loop {
            let token = tokens.get(cursor)?;
            if sentence.is_some_and(|s| token.sentence_id != s) {
                return None;
            }
            if token.lemma == target {
                return Some(cursor);
            }
            if sentence.is_some() && self.is_terminator(&token.lemma) {
                return None;
            }
            skipped += 1;
            if skipped > limit {
                return None;
            }
            cursor += 1;
        }
    }

    fn is_terminator(&self, lemma: &str) -> bool {
        self.config.terminators.iter().any(|t| t == lemma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnnotatedToken, HeadingTags, Segment};

    /// One segment; `|` separates sentences.
    fn doc(lemmas: &str) -> Document {
        let sentences = lemmas
            .split('|')
            .map(|s| s.split_whitespace().map(|l| AnnotatedToken::new(l, l)).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
            .collect();
        Document::build(&[Segment::new(0, "p", sentences)], HeadingTags::default()).unwrap()
    }

    const NONE: Vec<(usize, usize)> = Vec::new();

    fn pattern(s: &str) -> Pattern {
        s.parse().unwrap()
    }

    fn find(doc: &Document, pat: &str, mode: MatchMode) -> Vec<(usize, usize)> {
        let config = MatcherConfig::default();
        Matcher::new(doc, &config).find_occurrences(&pattern(pat), 0, None, mode).iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn literal_patterns_match_contiguously() {
        let d = doc("a b c d");
        assert_eq!(find(&d, "b c", MatchMode::Strict), vec![(1, 2)]);
        assert_eq!(find(&d, "c d", MatchMode::Strict), vec![(2, 3)]);
        assert_eq!(find(&d, "a c", MatchMode::Strict), NONE);
        assert_eq!(find(&d, "d", MatchMode::Strict), vec![(3, 3)]);
    }

    #[test]
    fn wildcard_gap_is_bounded() {
        let d = doc("a x y b");
        assert_eq!(find(&d, "a *2 b", MatchMode::Strict), vec![(0, 3)]);
        assert_eq!(find(&d, "a *3 b", MatchMode::Strict), vec![(0, 3)]);
        assert_eq!(find(&d, "a *1 b", MatchMode::Strict), NONE);
        // Zero tokens in the gap is fine.
        assert_eq!(find(&doc("a b c"), "a *1 b", MatchMode::Strict), vec![(0, 1)]);
    }

    #[test]
    fn gap_stops_at_first_occurrence_without_backtracking() {
        // The gap stops on the first "b"; "c" must then follow directly.
        let d = doc("a b x b c");
        assert_eq!(find(&d, "a *3 b c", MatchMode::Strict), NONE);
        assert_eq!(find(&d, "a *3 b x", MatchMode::Strict), vec![(0, 2)]);
    }

    #[test]
    fn gap_fails_at_end_of_document() {
        let d = doc("a x y");
        assert_eq!(find(&d, "a *5 b", MatchMode::Strict), NONE);
    }

    #[test]
    fn sentence_mode_stops_at_terminators() {
        let d = doc("a . | b");
        assert_eq!(find(&d, "a *2 b", MatchMode::Sentence), NONE);
        assert_eq!(find(&d, "a *2 b", MatchMode::Strict), vec![(0, 2)]);
    }

    #[test]
    fn sentence_mode_allows_a_terminator_as_the_next_lemma() {
        let d = doc("a x .");
        assert_eq!(find(&d, "a *2 .", MatchMode::Sentence), vec![(0, 2)]);
    }

    #[test]
    fn sentence_mode_tolerates_leading_noise() {
        // osobní údaj at 2..=3; candidate starts 0, 1 and 2 all reach it.
        let d = doc("my zpracovávat osobní údaj .");
        assert_eq!(find(&d, "osobní údaj", MatchMode::Sentence), vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(find(&d, "osobní údaj", MatchMode::Strict), vec![(2, 3)]);

        let strict_start = MatcherConfig { leading_noise: 0, ..MatcherConfig::default() };
        let spans = Matcher::new(&d, &strict_start).find_occurrences(&pattern("osobní údaj"), 0, None, MatchMode::Sentence);
        assert_eq!(spans, vec![Span { start: 2, end: 3 }]);
    }

    #[test]
    fn leading_noise_does_not_cross_sentences() {
        let d = doc("x . | osobní údaj");
        let spans: Vec<usize> = find(&d, "osobní údaj", MatchMode::Sentence).into_iter().map(|s| s.0).collect();
        assert_eq!(spans, vec![2]);
    }

    #[test]
    fn sentence_mode_respects_boundaries_without_terminators() {
        // A heading has no full stop; its tokens must not start the match.
        let d = doc("naše služby | zpracovávat jméno .");
        assert_eq!(find(&d, "zpracovávat *30 jméno", MatchMode::Sentence), vec![(2, 3)]);

        let d = doc("zpracovávat x | jméno y");
        assert_eq!(find(&d, "zpracovávat *3 jméno", MatchMode::Sentence), NONE);
        assert_eq!(find(&d, "zpracovávat *3 jméno", MatchMode::Strict), vec![(0, 2)]);
        assert_eq!(find(&doc("a | b c"), "a b", MatchMode::Sentence), NONE);
    }

    #[test]
    fn overlapping_matches_are_all_reported() {
        let d = doc("a a a b");
        assert_eq!(find(&d, "a *2 b", MatchMode::Strict), vec![(0, 3), (1, 3)]);
    }

    #[test]
    fn candidate_window_respects_bounds() {
        let d = doc("a b a b a b");
        let config = MatcherConfig::default();
        let m = Matcher::new(&d, &config);
        let p = pattern("a b");

        let starts = |from, to| m.find_occurrences(&p, from, to, MatchMode::Strict).iter().map(|s| s.start).collect::<Vec<_>>();
        assert_eq!(starts(0, None), vec![0, 2, 4]);
        assert_eq!(starts(1, None), vec![2, 4]);
        assert_eq!(starts(0, Some(4)), vec![0, 2]);
        assert_eq!(starts(0, Some(3)), vec![0]);
        assert_eq!(starts(0, Some(1)), Vec::<usize>::new());
        assert_eq!(starts(0, Some(0)), Vec::<usize>::new());
        assert_eq!(starts(0, Some(100)), vec![0, 2, 4]);
        assert_eq!(starts(100, None), Vec::<usize>::new());
    }

    #[test]
    fn find_many_concatenates_per_pattern() {
        let d = doc("a b c a b c");
        let config = MatcherConfig::default();
        let patterns = vec![pattern("b c"), pattern("z"), pattern("a b")];
        let spans = Matcher::new(&d, &config).find_many(&patterns, 0, None, MatchMode::Strict);
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![1, 4, 0, 3]);
    }

    #[test]
    fn pattern_parsing() {
        let p = pattern("správce *1 osobní údaj");
        assert_eq!(p.len(), 4);
        assert_eq!(p.elements()[1], PatternElement::Gap(1));
        assert_eq!(p.to_string(), "správce *1 osobní údaj");

        let from_items = Pattern::parse(&["po", "doba", "*1", "léta"]).unwrap();
        assert_eq!(from_items.elements()[2], PatternElement::Gap(1));

        for bad in ["", "a *0 b", "a *x b", "a *-1 b", "a *2", "a *1 *1 b", "a * b"] {
            assert!(
                matches!(bad.parse::<Pattern>(), Err(Error::InvalidPattern { .. })),
                "expected `{}` to be rejected",
                bad
            );
        }
        assert!(Pattern::parse::<&str>(&[]).is_err());
    }

    #[test]
    fn leading_gap_scans_forward_in_strict_mode() {
        let d = doc("x y b");
        assert_eq!(find(&d, "*2 b", MatchMode::Strict), vec![(0, 2), (1, 2)]);
    }
}

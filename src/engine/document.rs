//! Flattened token stream.
//!
//! The annotator returns a hierarchy (segments → sentences → tokens). Every
//! query in the engine works on a single flat array instead, so this module
//! owns the one place where that hierarchy is walked.
//!
//! ## Invariants
//!
//! - `tokens[i].text_index == i` for every `i`.
//! - `sentences[s]` holds the inclusive first/last token index of sentence `s`;
//!   sentences are contiguous and never empty.
//! - `heading_boundaries` is strictly increasing, starts at `0` and ends at
//!   `tokens.len()`, so consecutive pairs tile `[0, len)` with half-open ranges.
//!   An empty document has the single boundary `[0]` and no ranges.

use super::entities::{self, Entity};
use super::matcher::Span;
use crate::{Error, Result, Segment, Token};
use tracing::debug;

bitflags::bitflags! {
    /// HTML tags that open a new heading range.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeadingTags: u8 {
        const H1 = 1 << 0;
        const H2 = 1 << 1;
        const H3 = 1 << 2;
        const H4 = 1 << 3;
        const H5 = 1 << 4;
        const H6 = 1 << 5;
    }
}

impl HeadingTags {
    /// Map an HTML tag name (case-insensitive) to its flag.
    pub fn from_tag_name(tag: &str) -> Option<HeadingTags> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "h1" => Some(HeadingTags::H1),
            "h2" => Some(HeadingTags::H2),
            "h3" => Some(HeadingTags::H3),
            "h4" => Some(HeadingTags::H4),
            "h5" => Some(HeadingTags::H5),
            "h6" => Some(HeadingTags::H6),
            _ => None,
        }
    }

    /// Whether `tag` names a heading in this set.
    pub fn matches(&self, tag: &str) -> bool {
        HeadingTags::from_tag_name(tag).is_some_and(|flag| self.contains(flag))
    }
}

impl Default for HeadingTags {
    fn default() -> Self {
        HeadingTags::all()
    }
}

/// Counts reported in verbose runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DocumentStats {
    pub segments: usize,
    pub sentences: usize,
    pub tokens: usize,
    pub headings: usize,
    pub entities: usize,
}

/// One document's flattened tokens plus everything derived from them.
///
/// Built once per request with [`Document::build`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) tokens: Vec<Token>,
    pub(crate) sentences: Vec<Span>,
    segment_count: usize,
    heading_boundaries: Vec<usize>,
    pub(crate) entities: Vec<Entity>,
}

impl Document {
    /// Flatten `segments` in segment / sentence / token order.
    ///
    /// ```text
    /// seg 0 (h2): [Správce osobních údajů]           -> tokens 0..=2, sentence 0
    /// seg 1 (p) : [Správcem je Alza.cz .] [Kontakt .] -> tokens 3..=6, 7..=8
    /// seg 2 (p) : []                                  -> nothing (legal)
    /// ```
    ///
    /// Fails with [`Error::MalformedInput`] when a sentence has no tokens, a
    /// token has an empty form or lemma, a tag has an empty type, or an
    /// upstream `index` disagrees with the flattened position.
    pub fn build(segments: &[Segment], heading_tags: HeadingTags) -> Result<Self> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut sentences: Vec<Span> = Vec::new();
        let mut heading_starts: Vec<usize> = Vec::new();

        for (segment_id, segment) in segments.iter().enumerate() {
            let segment_start = tokens.len();

            for (local_sentence, sentence) in segment.sentences.iter().enumerate() {
                if sentence.is_empty() {
                    return Err(Error::malformed(format!(
                        "segment {} sentence {} has no tokens",
                        segment.id, local_sentence
                    )));
                }

                let sentence_id = sentences.len();
                let first = tokens.len();

                for annotated in sentence {
                    let text_index = tokens.len();
                    if annotated.form.is_empty() || annotated.lemma.is_empty() {
                        return Err(Error::malformed(format!(
                            "token {} in segment {} has an empty form or lemma",
                            text_index, segment.id
                        )));
                    }
                    if let Some(upstream) = annotated.index {
                        if upstream != text_index {
                            return Err(Error::malformed(format!(
                                "token '{}' carries index {} but flattens to {}",
                                annotated.form, upstream, text_index
                            )));
                        }
                    }
                    if annotated.tags.iter().any(|tag| tag.kind.is_empty()) {
                        return Err(Error::malformed(format!("token {} has an entity tag without a type", text_index)));
                    }

                    tokens.push(Token {
                        form: annotated.form.clone(),
                        lemma: annotated.lemma.clone(),
                        space_after: annotated.space_after.clone(),
                        tags: annotated.tags.iter().cloned().collect(),
                        text_index,
                        sentence_id,
                        segment_id,
                    });
                }

                sentences.push(Span { start: first, end: tokens.len() - 1 });
            }

            if tokens.len() > segment_start && heading_tags.matches(&segment.tag) {
                heading_starts.push(segment_start);
            }
        }

        debug_assert!(tokens.iter().enumerate().all(|(i, t)| t.text_index == i));

        let heading_boundaries = heading_boundaries(heading_starts, tokens.len());
        let entities = entities::assemble(&tokens);

        debug!(
            segments = segments.len(),
            sentences = sentences.len(),
            tokens = tokens.len(),
            headings = heading_boundaries.len().saturating_sub(1),
            entities = entities.len(),
            "document built"
        );

        Ok(Document { tokens, sentences, segment_count: segments.len(), heading_boundaries, entities })
    }

    /// All tokens; `tokens()[i].text_index == i`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Entities assembled at build time, in order of their first token.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Sorted heading boundaries: `0`, every heading start, then `len()`.
    pub fn heading_boundaries(&self) -> &[usize] {
        &self.heading_boundaries
    }

    /// Half-open heading ranges `(start, end)` covering `[0, len())`.
    pub fn heading_ranges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.heading_boundaries.windows(2).map(|w| (w[0], w[1]))
    }

    /// The half-open heading range that contains `text_index`, or `None` when
    /// the index is outside the document.
    pub fn heading_range_for(&self, text_index: usize) -> Option<(usize, usize)> {
        if text_index >= self.tokens.len() {
            return None;
        }
        // boundaries[0] == 0 <= text_index and the last boundary is len(), so
        // the partition point always lands strictly inside the list.
        let pos = self.heading_boundaries.partition_point(|&b| b <= text_index);
        Some((self.heading_boundaries[pos - 1], self.heading_boundaries[pos]))
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            segments: self.segment_count,
            sentences: self.sentences.len(),
            tokens: self.tokens.len(),
            headings: self.heading_boundaries.len().saturating_sub(1),
            entities: self.entities.len(),
        }
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tokens.len() { Ok(()) } else { Err(Error::OutOfRange { index, len: self.tokens.len() }) }
    }
}

fn heading_boundaries(mut starts: Vec<usize>, len: usize) -> Vec<usize> {
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }
    if len > 0 {
        starts.push(len);
    }
    starts
}

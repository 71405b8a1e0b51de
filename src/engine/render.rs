//! Text reconstruction from token ranges.
//!
//! [`push_token`] is the only whitespace rule in the crate: entity text,
//! sentence text and arbitrary range text all go through it, so the same
//! token range always renders to the same string.

use super::document::Document;
use super::matcher::Span;
use crate::{Error, Result, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A reconstructed sentence and its inclusive token range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceText {
    pub text: String,
    pub range: Span,
}

/// Append the token's surface form followed by its trailing whitespace.
pub(crate) fn push_token(out: &mut String, token: &Token) {
    out.push_str(&token.form);
    out.push_str(&token.space_after.render());
}

/// Render a run of tokens.
pub(crate) fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        push_token(&mut out, token);
    }
    out
}

impl Document {
    /// First and last global token index of `sentence_id`.
    pub fn sentence_bounds(&self, sentence_id: usize) -> Result<Span> {
        self.sentences
            .get(sentence_id)
            .copied()
            .ok_or(Error::OutOfRange { index: sentence_id, len: self.sentences.len() })
    }

    /// Sentence id owning `text_index`.
    pub fn sentence_id_of(&self, text_index: usize) -> Result<usize> {
        self.check_index(text_index)?;
        Ok(self.tokens[text_index].sentence_id)
    }

    /// Render `start..=end`.
    pub fn text_for_range(&self, start: usize, end: usize) -> Result<String> {
        self.check_index(end)?;
        if start > end {
            return Err(Error::OutOfRange { index: start, len: self.tokens.len() });
        }
        Ok(render_tokens(&self.tokens[start..=end]))
    }

    /// The sentences that own any of `indices`, deduplicated and in document
    /// order.
    ///
    /// ```text
    /// indices {3, 5, 12}
    ///   3 -> sentence 1 ┐
    ///   5 -> sentence 1 ┘ one entry
    ///  12 -> sentence 4
    /// => [{text of s1, (2, 9)}, {text of s4, (11, 14)}]
    /// ```
    pub fn sentences_covering<I>(&self, indices: I) -> Result<Vec<SentenceText>>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut sentence_ids = BTreeSet::new();
        for index in indices {
            sentence_ids.insert(self.sentence_id_of(index)?);
        }

        Ok(sentence_ids
            .into_iter()
            .map(|id| {
                let range = self.sentences[id];
                SentenceText { text: render_tokens(&self.tokens[range.start..=range.end]), range }
            })
            .collect())
    }
}

//! Named-entity assembly.
//!
//! The annotator tags tokens, not mentions: a three-token company name arrives
//! as three tokens that each carry `if_3`. This module merges such runs back
//! into [`Entity`] records.
//!
//! ## Identity
//!
//! A run is identified by `(type, key, segment_id)`. Keys restart in every
//! segment the annotator processed separately, so two runs from different
//! segments never merge even when adjacent.
//!
//! ## Adjacency
//!
//! A token extends an open entity only when it directly follows the entity's
//! last token (`end_index + 1 == text_index`). Any gap closes the entity; a
//! later token with the same identity starts a new instance.

use super::document::Document;
use super::render::push_token;
use crate::Token;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A maximal run of adjacent tokens sharing one annotation identity.
///
/// Entities do not own tokens; `start_index..=end_index` indexes the
/// document they were assembled from (see [`Entity::tokens`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Annotation type, e.g. `"if"` (company), `"io"` (institution), `"A"` (address).
    pub kind: String,
    /// Annotator identity key within the segment.
    pub key: String,
    /// First token, inclusive.
    pub start_index: usize,
    /// Last token, inclusive.
    pub end_index: usize,
    /// Rendered text, including each token's trailing whitespace.
    pub text: String,
}

impl Entity {
    /// The tokens of this entity in `doc`.
    ///
    /// `doc` must be the document the entity was assembled from.
    pub fn tokens<'d>(&self, doc: &'d Document) -> &'d [Token] {
        &doc.tokens()[self.start_index..=self.end_index]
    }

    /// Lower-cased, trimmed text; what blacklists compare against.
    pub fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }

    /// Token index halfway through the span (rounded down).
    pub fn midpoint(&self) -> usize {
        (self.start_index + self.end_index) / 2
    }
}

/// Merge tagged tokens into entities, ordered by first token (then by tag
/// order on that token).
///
/// ```text
/// index:  0      1      2     3
/// tags : [P_1]  [P_1]  []    [P_1]
///         └──────┘            └── gap at 2: new instance
///         entity #0           entity #1
/// ```
pub(crate) fn assemble(tokens: &[Token]) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();
    let mut open: HashMap<(&str, &str, usize), usize> = HashMap::new();

    for token in tokens {
        for tag in &token.tags {
            let identity = (tag.kind.as_str(), tag.key.as_str(), token.segment_id);

            match open.get(&identity).copied() {
                // The same tag listed twice on one token.
                Some(idx) if entities[idx].end_index == token.text_index => {}
                Some(idx) if entities[idx].end_index + 1 == token.text_index => {
                    let entity = &mut entities[idx];
                    entity.end_index = token.text_index;
                    push_token(&mut entity.text, token);
                }
                _ => {
                    let mut text = String::new();
                    push_token(&mut text, token);
                    entities.push(Entity {
                        kind: tag.kind.clone(),
                        key: tag.key.clone(),
                        start_index: token.text_index,
                        end_index: token.text_index,
                        text,
                    });
                    open.insert(identity, entities.len() - 1);
                }
            }
        }
    }

    entities
}

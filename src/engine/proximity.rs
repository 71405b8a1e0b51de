//! Entity search around an anchor.
//!
//! Extractors locate a phrase with the matcher, take the heading range around
//! it, and then ask for the closest entity of the right type inside that range.

use super::document::Document;
use super::entities::Entity;
use crate::{Error, Result};
use std::collections::HashSet;

/// Entity texts to ignore, compared lower-cased and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Blacklist { entries: entries.into_iter().map(|s| s.as_ref().trim().to_lowercase()).collect() }
    }

    /// Whether `entity` is excluded.
    pub fn rejects(&self, entity: &Entity) -> bool {
        !self.entries.is_empty() && self.entries.contains(&entity.normalized_text())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Document {
    /// Entities whose `start_index` lies in `[start, end)`, whose type is one
    /// of `kinds`, and whose text the blacklist does not reject. Document
    /// order is kept.
    ///
    /// Fails with [`Error::OutOfRange`] when `end > len()` or `start > end`.
    pub fn entities_of_type_in_range(
        &self,
        kinds: &[&str],
        start: usize,
        end: usize,
        blacklist: &Blacklist,
    ) -> Result<Vec<&Entity>> {
        if end > self.len() {
            return Err(Error::OutOfRange { index: end, len: self.len() });
        }
        if start > end {
            return Err(Error::OutOfRange { index: start, len: self.len() });
        }

        // Entities are sorted by start_index, so the window is a contiguous run.
        let first = self.entities.partition_point(|e| e.start_index < start);
        Ok(self.entities[first..]
            .iter()
            .take_while(|e| e.start_index < end)
            .filter(|e| kinds.contains(&e.kind.as_str()))
            .filter(|e| !blacklist.rejects(e))
            .collect())
    }

    /// The qualifying entity whose start is closest to `anchor`; on a tie the
    /// one earlier in document order wins.
    ///
    /// ```text
    /// anchor = 10
    /// candidates: if@6  if@14  io@20
    /// distance  :   4     4     10     -> if@6
    /// ```
    pub fn nearest_entity(
        &self,
        kinds: &[&str],
        anchor: usize,
        start: usize,
        end: usize,
        blacklist: &Blacklist,
    ) -> Result<Option<&Entity>> {
        let candidates = self.entities_of_type_in_range(kinds, start, end, blacklist)?;
        // `min_by_key` keeps the first of several equal minima.
        Ok(candidates.into_iter().min_by_key(|e| e.start_index.abs_diff(anchor)))
    }
}

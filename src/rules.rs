//! Built-in fact extractors.
//!
//! Every extractor is a plain function over an [`Extraction`]: it runs one or
//! more static [`RuleSet`]s through the matcher and then reads entities or
//! sentences back out of the document around the hits.
//!
//! ```text
//! RuleSet (lemma patterns, compiled once)
//!     │
//!     v
//! Extraction::find ── Matcher::find_many ──▶ spans ──▶ recorded as RuleHits
//!     │
//!     v
//! extractor: heading range / nearest entity / covering sentences
//! ```
//!
//! Patterns are Czech lemmas as produced by the upstream lemmatizer, so the
//! tables below read as lemmatized Czech (`osobní údaj`, not `osobních údajů`).

#[path = "rules/categories.rs"]
pub(crate) mod categories;
#[path = "rules/controller.rs"]
pub(crate) mod controller;
#[path = "rules/recipients.rs"]
pub(crate) mod recipients;
#[path = "rules/retention.rs"]
pub(crate) mod retention;
#[path = "rules/rights.rs"]
pub(crate) mod rights;


use crate::{Blacklist, Document, MatchMode, Matcher, MatcherConfig, Pattern, Span};
use serde::Serialize;
use tracing::debug;

/// Entity texts that are never reported as a controller or recipient: the
/// regulation's own institutions and the generic role words policies use in
/// place of a name.
pub(crate) const DEFAULT_BLACKLIST: &[&str] = &[
    "Evropského parlamentu",
    "Rady",
    "EU",
    "ES",
    "GDPR",
    "Pplk",
    "Úřadu pro ochranu osobních údajů",
    "Úřad pro ochranu osobních údajů",
    "Správce",
    "Provozovatel",
    "Vámi",
];

/// A named group of patterns searched together in one mode.
#[derive(Debug, Clone)]
pub(crate) struct RuleSet {
    pub name: &'static str,
    pub mode: MatchMode,
    pub patterns: Vec<Pattern>,
}

/// Matches produced by one rule set during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHits {
    pub rule: &'static str,
    pub matches: Vec<Span>,
}

/// Shared state for one extraction run over a built document.
pub(crate) struct Extraction<'d> {
    pub doc: &'d Document,
    pub blacklist: &'d Blacklist,
    matcher: Matcher<'d>,
    hits: Vec<RuleHits>,
}

impl<'d> Extraction<'d> {
    pub(crate) fn new(doc: &'d Document, config: &'d MatcherConfig, blacklist: &'d Blacklist) -> Self {
        Extraction { doc, blacklist, matcher: Matcher::new(doc, config), hits: Vec::new() }
    }

    /// Run every pattern of `rules` over `[from, to)` and record the hits.
    pub(crate) fn find(&mut self, rules: &RuleSet, from: usize, to: Option<usize>) -> Vec<Span> {
        let spans = self.matcher.find_many(&rules.patterns, from, to, rules.mode);
        if !spans.is_empty() {
            debug!(rule = rules.name, matches = spans.len(), "rule set matched");
        }

        match self.hits.iter_mut().find(|h| h.rule == rules.name) {
            Some(entry) => entry.matches.extend_from_slice(&spans),
            None => self.hits.push(RuleHits { rule: rules.name, matches: spans.clone() }),
        }
        spans
    }

    pub(crate) fn into_hits(self) -> Vec<RuleHits> {
        self.hits
    }
}

/// Start and end index of every span, in span order.
pub(crate) fn starts_and_ends(spans: &[Span]) -> impl Iterator<Item = usize> + '_ {
    spans.iter().flat_map(|s| [s.start, s.end])
}

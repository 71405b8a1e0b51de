//! Token-stream query engine.
//!
//! This module is the core the extractors in `src/rules/` are written against.
//! It takes the annotator's per-segment sentences, flattens them once, and then
//! answers index queries over the flat array.
//!
//! ## How the parts work together
//!
//! ```text
//! segments ── Document::build ───────────────┐   (document.rs)
//!              - global text_index            │
//!              - sentence / segment ids       │
//!              - heading boundaries           │
//!              - entities::assemble ──────────┤   (entities.rs)
//!                                             v
//!                     ┌──────── Document (immutable) ────────┐
//!                     │                                      │
//!          Matcher::find_occurrences              nearest_entity /
//!          Matcher::find_many                     entities_of_type_in_range
//!             (matcher.rs)                           (proximity.rs)
//!                     │                                      │
//!                     └────────────┬─────────────────────────┘
//!                                  v
//!                 sentences_covering / text_for_range   (render.rs)
//! ```
//!
//! Every cross reference is a plain `usize` into `Document::tokens`: sentence
//! bounds, heading boundaries and entity spans never hold pointers, so the
//! document can be shared freely across readers once built.
//!
//! ## Responsibilities by module
//!
//! - `document.rs`: flattening, invariant checks, heading ranges.
//! - `entities.rs`: merges adjacent same-identity tags into `Entity` records.
//! - `matcher.rs`: wildcard-gapped lemma patterns, strict and sentence mode.
//! - `render.rs`: the one whitespace-rendering rule and sentence lookups.
//! - `proximity.rs`: type/range/blacklist filtering and nearest-entity search.
//! - `metrics.rs`: per-stage timings for verbose runs.
//!
//! ## Debugging
//!
//! The engine emits `tracing` events; the binary shows them when
//! `CONSENT_FACTS_LOG=debug` (or `trace`) is set.

#[path = "engine/document.rs"]
mod document;
#[path = "engine/entities.rs"]
mod entities;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/proximity.rs"]
mod proximity;
#[path = "engine/render.rs"]
mod render;

pub use document::{Document, DocumentStats, HeadingTags};
pub use entities::Entity;
pub use matcher::{MatchMode, Matcher, MatcherConfig, Pattern, PatternElement, Span};
pub use metrics::StageMetrics;
pub(crate) use metrics::ExtractionMetrics;
pub use proximity::Blacklist;
pub use render::SentenceText;

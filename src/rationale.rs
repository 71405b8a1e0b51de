//! Rationale selection from token attributions.
//!
//! The classifier's attribution routine scores every sub-word position. This
//! module turns those scores into a short list of supporting sentences:
//!
//! ```text
//! raw scores ── keep_top_percent ──▶ sparse scores
//!                                        │
//! sentence ids ──────────────────────────┤
//!                                        v
//!                              Selector::select
//!                    (tune hit fraction until the number of
//!                     selected sentences is inside the band)
//! ```
//!
//! A sentence is *selected* at threshold `f` when the share of its positions
//! with a non-zero score is at least `f`. The selector nudges `f` up when too
//! many sentences qualify and down when too few do, for at most `depth`
//! adjustments.
//!
//! ## Fallback
//!
//! When the depth budget runs out without ever landing in the band, the
//! selection computed at the last in-budget step is returned. Only a call that
//! starts with a negative depth and misses the band yields `None`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Knobs for [`rationales`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationaleConfig {
    /// Fewest sentences to return.
    pub min_rationales: usize,
    /// Most sentences to return.
    pub max_rationales: usize,
    /// Starting hit fraction.
    pub fraction_tokens_hit: f64,
    /// Threshold adjustment per step.
    pub step: f64,
    /// Maximum number of adjustments.
    pub max_depth: i32,
    /// When off, the search gets a single adjustment (depth 0).
    pub recurse: bool,
    /// Percentage of positive attributions kept before selection.
    pub top_percent: f64,
}

impl Default for RationaleConfig {
    fn default() -> Self {
        RationaleConfig {
            min_rationales: 4,
            max_rationales: 6,
            fraction_tokens_hit: 0.2,
            step: 0.05,
            max_depth: 10,
            recurse: true,
            top_percent: 10.0,
        }
    }
}

/// Per-sentence `(hits, length)` counts.
#[derive(Debug, Clone, Default)]
struct SentenceStats {
    counts: BTreeMap<usize, (usize, usize)>,
}

impl SentenceStats {
    fn collect(scores: &[f64], sentence_ids: &[Option<usize>]) -> Result<Self> {
        if scores.len() != sentence_ids.len() {
            return Err(Error::malformed(format!(
                "{} scores but {} sentence ids",
                scores.len(),
                sentence_ids.len()
            )));
        }
        if let Some(pos) = scores.iter().position(|s| s.is_nan()) {
            return Err(Error::malformed(format!("score at position {pos} is NaN")));
        }

        let mut counts: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
        for (score, id) in scores.iter().zip(sentence_ids) {
            let Some(id) = id else { continue };
            let entry = counts.entry(*id).or_default();
            entry.1 += 1;
            if *score != 0.0 {
                entry.0 += 1;
            }
        }
        Ok(SentenceStats { counts })
    }

    /// Sentence ids (ascending) whose hit fraction reaches `threshold`.
    fn select(&self, threshold: f64) -> Vec<usize> {
        self.counts
            .iter()
            .filter(|(_, (hits, len))| *hits as f64 / *len as f64 >= threshold)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Threshold search over a target band `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selector {
    pub min: usize,
    pub max: usize,
    pub step: f64,
}

impl Selector {
    pub fn new(min: usize, max: usize, step: f64) -> Result<Self> {
        if min > max {
            return Err(Error::malformed(format!("empty rationale band [{min}, {max}]")));
        }
        if !step.is_finite() {
            return Err(Error::malformed("threshold step must be finite"));
        }
        Ok(Selector { min, max, step })
    }

    /// Select sentence ids, starting at `threshold` and adjusting at most
    /// `depth` times.
    ///
    /// ```text
    /// depth 2, band [2, 3]
    /// f=0.20 -> 5 selected (above)  -> f=0.25
    /// f=0.25 -> 4 selected (above)  -> f=0.30
    /// f=0.30 -> 4 selected (above)  -> f=0.35
    /// f=0.35 -> 4 selected (above)  -> budget spent
    /// => the f=0.30 selection, the last one tried at depth >= 0
    /// ```
    pub fn select(
        &self,
        scores: &[f64],
        sentence_ids: &[Option<usize>],
        threshold: f64,
        depth: i32,
    ) -> Result<Option<Vec<usize>>> {
        let stats = SentenceStats::collect(scores, sentence_ids)?;
        Ok(self.search(&stats, threshold, depth))
    }

    fn search(&self, stats: &SentenceStats, mut threshold: f64, mut depth: i32) -> Option<Vec<usize>> {
        let mut fallback: Option<Vec<usize>> = None;

        loop {
            let selected = stats.select(threshold);
            let count = selected.len();
            debug!(threshold, depth, count, min = self.min, max = self.max, "rationale threshold tried");

            if (self.min..=self.max).contains(&count) {
                return Some(selected);
            }
            if depth < 0 {
                return fallback;
            }

            fallback = Some(selected);
            threshold += if count > self.max { self.step } else { -self.step };
            depth -= 1;
        }
    }
}

/// Keep the largest `ceil(n * percent / 100)` of the `n` strictly positive
/// scores and zero everything else. Ties at the cut-off keep the earlier
/// position.
pub fn keep_top_percent(scores: &[f64], percent: f64) -> Vec<f64> {
    let mut positive: Vec<(usize, f64)> = scores.iter().copied().enumerate().filter(|(_, s)| *s > 0.0).collect();
    let percent = percent.clamp(0.0, 100.0);
    let keep = (positive.len() as f64 * percent / 100.0).ceil() as usize;

    positive.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut out = vec![0.0; scores.len()];
    for (i, score) in positive.into_iter().take(keep) {
        out[i] = score;
    }
    out
}

/// Filter attributions, then select rationale sentences with `config`.
pub fn rationales(scores: &[f64], sentence_ids: &[Option<usize>], config: &RationaleConfig) -> Result<Option<Vec<usize>>> {
    let selector = Selector::new(config.min_rationales, config.max_rationales, config.step)?;
    // Validate the raw scores; the filtered copy cannot carry a NaN forward.
    SentenceStats::collect(scores, sentence_ids)?;
    let filtered = keep_top_percent(scores, config.top_percent);
    let stats = SentenceStats::collect(&filtered, sentence_ids)?;

    let depth = if config.recurse { config.max_depth } else { 0 };
    Ok(selector.search(&stats, config.fraction_tokens_hit, depth))
}

//! How long personal data is kept.

use super::{Extraction, RuleSet, starts_and_ends};
use crate::{Result, SentenceText};
use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub(crate) static RULES: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "retention",
        patterns: [
            "osobní *3 údaj *3 zpracovávat *3 po *3 doba",
            "osobní *3 údaj *3 být *3 zpracovávaný *3 po *3 doba",
            "uchovávat *3 osobní *3 údaj *3 po *3 doba",
            "data *3 být *3 uchovaný *3 po *3 doba",
            "data *3 být *3 uchovávaný *3 po *3 doba",
            "uložený *3 po *3 doba *3 léta",
            "být *3 zpracovávaný *3 po *3 doba",
            "být *3 uložený *4 po *3 doba",
        ],
    }
});

/// `po dobu 10 let` and the like.
pub(crate) static PERIOD: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "retention.period",
        patterns: ["po doba *1 léta"],
    }
});

/// A bare mention of a period without a number.
pub(crate) static PERIOD_WORD: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "retention.period_word",
        patterns: ["doba"],
    }
});

/// Tokens rendered on either side of a bare `doba`.
const CONTEXT_WINDOW: usize = 5;

/// The retention period read from the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPeriod {
    /// Stated number of years; `0` when the text names a period without a
    /// number ("po dobu nezbytně nutnou").
    pub years: u32,
    /// The phrase the number was read from.
    pub text: String,
    /// Reference date plus `years`; `None` when no number was stated.
    pub expires: Option<NaiveDate>,
}

/// Retention facts: the longest stated period and every sentence that talks
/// about retention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retention {
    pub short: Option<RetentionPeriod>,
    pub sentences: Vec<SentenceText>,
}

pub(crate) fn extract(cx: &mut Extraction<'_>, reference_date: NaiveDate) -> Result<Retention> {
    let spans = cx.find(&RULES, 0, None);
    let sentences = cx.doc.sentences_covering(starts_and_ends(&spans))?;

    let mut candidates: Vec<(u32, String)> = Vec::new();
    for sentence in &sentences {
        let (from, to) = (sentence.range.start, Some(sentence.range.end + 1));

        let periods = cx.find(&PERIOD, from, to);
        for span in &periods {
            let text = cx.doc.text_for_range(span.start, span.end)?;
            for number in regex!(r"\d+").find_iter(&text) {
                // Digit runs too long for a year count are not periods.
                if let Ok(years) = number.as_str().parse::<u32>() {
                    candidates.push((years, text.clone()));
                }
            }
        }
        if !periods.is_empty() {
            continue;
        }

        if let Some(word) = cx.find(&PERIOD_WORD, from, to).first() {
            let lo = word.start.saturating_sub(CONTEXT_WINDOW);
            let hi = (word.start + CONTEXT_WINDOW).min(cx.doc.len());
            candidates.push((0, cx.doc.text_for_range(lo, hi - 1)?));
        }
    }

    let short = candidates.into_iter().max().map(|(years, text)| RetentionPeriod {
        years,
        expires: expiry(reference_date, years),
        text,
    });
    Ok(Retention { short, sentences })
}

/// `reference + years`, saturating at the last representable date.
fn expiry(reference: NaiveDate, years: u32) -> Option<NaiveDate> {
    if years == 0 {
        return None;
    }
    let expires = years.checked_mul(12).and_then(|months| reference.checked_add_months(Months::new(months)));
    Some(expires.unwrap_or(NaiveDate::MAX))
}

//! Categories of personal data the policy says are processed.
//!
//! Each category is a short lemma sequence (`datum narození`) that has to
//! appear in the same sentence after one of the processing verbs:
//!
//! ```text
//! "Zpracováváme jméno, příjmení a adresu."
//!  zpracovávat  jméno , příjmení a adresa .
//!  └─ prefix ──┘ └──── ≤ GAP tokens, same sentence ────┘
//!                -> name, surname, address
//! ```

use super::{Extraction, RuleSet, starts_and_ends};
use crate::{MatchMode, Pattern, Result, SentenceText};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Lemmas that introduce a list of processed data.
const PREFIXES: &[&str] = &["zpracovávat", "osobní údaj", "ukládat"];

/// How far into the sentence a category may follow its prefix.
const GAP: usize = 30;

/// `(category, lemma sequence)`.
const CATEGORIES: &[(&str, &str)] = &[
    ("name", "jméno"),
    ("surname", "příjmení"),
    ("birth_date", "datum narození"),
    ("address", "adresa"),
    ("id_card", "průkaz totožnost"),
    ("company_id", "IČ"),
    ("tax_id", "DIČ"),
    ("location", "lokační údaj"),
    ("licence_plate", "SPZ"),
    ("signature", "podpis"),
    ("data_box", "datový schránka"),
];

pub(crate) static RULES: Lazy<Vec<RuleSet>> = Lazy::new(|| {
    CATEGORIES
        .iter()
        .map(|&(name, lemmas)| RuleSet {
            name,
            mode: MatchMode::Sentence,
            patterns: PREFIXES
                .iter()
                .map(|prefix| format!("{prefix} *{GAP} {lemmas}").parse::<Pattern>().unwrap())
                .collect(),
        })
        .collect()
});

/// Category name to the sentences that mention it; categories without a
/// match are left out.
pub(crate) fn extract(cx: &mut Extraction<'_>) -> Result<BTreeMap<String, Vec<SentenceText>>> {
    let mut found = BTreeMap::new();
    for rules in RULES.iter() {
        let spans = cx.find(rules, 0, None);
        if spans.is_empty() {
            continue;
        }
        found.insert(rules.name.to_string(), cx.doc.sentences_covering(starts_and_ends(&spans))?);
    }
    Ok(found)
}

//! Data subject rights: access, erasure, and the deadline for answering a
//! request. Each extractor returns the sentences around the matches.

use super::{Extraction, RuleSet, starts_and_ends};
use crate::{Result, SentenceText};
use once_cell::sync::Lazy;

pub(crate) static ACCESS: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "access",
        patterns: [
            // právo na přístup k svým osobním údajům
            "právo *3 přístup *5 osobní údaj",
            // zaslat přehled vašich osobních údajů
            "přehled *3 osobní údaj",
            // potvrzení, zda osobní údaje ... jsou zpracovávány
            "potvrzení *4 osobní údaj",
            // potvrzení, zda zpracováváme nebo nezpracováváme
            "potvrzení *4 zpracovávat *2 zpracovávat",
            // přístup ke svým osobním údajům
            "přístup *2 svůj *2 osobní údaj",
        ],
    }
});

pub(crate) static ERASURE: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "erasure",
        patterns: [
            "právo *2 výmaz",
            "výmaz *2 osobní údaj",
            "osobní údaj *2 výmaz",
        ],
    }
});

pub(crate) static DEADLINE: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "deadline",
        patterns: [
            "obdržet *4 žádost",
            "žádost *4 lhůta",
        ],
    }
});

pub(crate) fn access(cx: &mut Extraction<'_>) -> Result<Vec<SentenceText>> {
    covering(cx, &ACCESS)
}

pub(crate) fn erasure(cx: &mut Extraction<'_>) -> Result<Vec<SentenceText>> {
    covering(cx, &ERASURE)
}

pub(crate) fn deadline(cx: &mut Extraction<'_>) -> Result<Vec<SentenceText>> {
    covering(cx, &DEADLINE)
}

fn covering(cx: &mut Extraction<'_>, rules: &RuleSet) -> Result<Vec<SentenceText>> {
    let spans = cx.find(rules, 0, None);
    cx.doc.sentences_covering(starts_and_ends(&spans))
}

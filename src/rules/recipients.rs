//! Third parties the data is passed on to.

use super::{Extraction, RuleSet};
use crate::Result;
use once_cell::sync::Lazy;
use std::collections::HashSet;

const COMPANY: &[&str] = &["if", "io"];

pub(crate) static RULES: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "recipients",
        patterns: [
            "předávat *2 osobní údaj",
            "kdo moci *2 údaj *3 zpřístupnit",
            "příjemce *1 osobní údaj",
        ],
    }
});

/// Companies named in the heading sections that talk about passing data on.
///
/// When a section matches but names no company, the text of each matched
/// section is returned instead so the reader still gets the relevant
/// paragraph.
pub(crate) fn extract(cx: &mut Extraction<'_>) -> Result<Vec<String>> {
    let spans = cx.find(&RULES, 0, None);

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for span in &spans {
        if let Some(range) = cx.doc.heading_range_for(span.start) {
            if !ranges.contains(&range) {
                ranges.push(range);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut companies = Vec::new();
    for &(from, to) in &ranges {
        for entity in cx.doc.entities_of_type_in_range(COMPANY, from, to, cx.blacklist)? {
            let name = entity.text.trim();
            if seen.insert(name) {
                companies.push(name.to_string());
            }
        }
    }
    if !companies.is_empty() {
        return Ok(companies);
    }

    // Heading ranges are never empty, so `to - 1` is the last token inside.
    ranges.iter().map(|&(from, to)| cx.doc.text_for_range(from, to - 1)).collect()
}

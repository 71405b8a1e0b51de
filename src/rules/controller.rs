//! Data controller: the company responsible for the processing, and its
//! registered address.

use super::{Extraction, RuleSet};
use crate::{Blacklist, Entity, Result};
use once_cell::sync::Lazy;
use tracing::debug;

const COMPANY: &[&str] = &["if", "io"];
const ADDRESS: &[&str] = &["A"];

pub(crate) static RULES: Lazy<RuleSet> = Lazy::new(|| {
    rule_set! {
        name: "controller",
        patterns: [
            "správce *1 osobní údaj",
            "zpracování *1 osobní údaj",
            "souhlas *1 zpracování *1 osobní údaj *8 provozovatel",
        ],
    }
});

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Controller {
    pub company: Option<Entity>,
    pub address: Option<Entity>,
}

/// Walk the phrase hits in document order. For each, take the heading range
/// around it and the company nearest to the start of that range; then the
/// address nearest to the company. The first company that has an address
/// wins; failing that, the first company seen.
pub(crate) fn extract(cx: &mut Extraction<'_>) -> Result<Controller> {
    let mut starts: Vec<usize> = cx.find(&RULES, 0, None).iter().map(|s| s.start).collect();
    starts.sort_unstable();
    starts.dedup();

    let no_blacklist = Blacklist::default();
    let mut first_company: Option<&Entity> = None;

    for start in starts {
        let Some((from, to)) = cx.doc.heading_range_for(start) else { continue };
        let Some(company) = cx.doc.nearest_entity(COMPANY, from, from, to, cx.blacklist)? else { continue };
        if first_company.is_none() {
            first_company = Some(company);
        }

        if let Some(address) = cx.doc.nearest_entity(ADDRESS, company.midpoint(), from, to, &no_blacklist)? {
            debug!(company = %company.text.trim(), address = %address.text.trim(), "controller found");
            return Ok(Controller { company: Some(company.clone()), address: Some(address.clone()) });
        }
    }

    Ok(Controller { company: first_company.cloned(), address: None })
}

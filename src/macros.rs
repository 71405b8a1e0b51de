#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`RuleSet`](crate::rules::RuleSet) from space-separated lemma
/// patterns, e.g. `"správce *1 osobní údaj"`.
///
/// Patterns are literals checked by the rule-table tests, so a malformed one
/// fails loudly the first time the set is touched.
macro_rules! rule_set {
    (
        name: $name:expr,
        patterns: [ $($pat:literal),* $(,)? ]
        $(,)?
    ) => {{
        $crate::rules::RuleSet {
            name: $name,
            mode: $crate::MatchMode::Strict,
            patterns: vec![ $($pat.parse::<$crate::Pattern>().unwrap()),* ],
        }
    }};
}

use consent_facts::{
    AnnotatedToken, Blacklist, ConsentReport, Context, Document, Error, HeadingTags, MatchMode, Matcher, MatcherConfig, Options,
    Pattern, RationaleConfig, Segment, Span, extract_verbose_with, extract_with, rationale,
};
use chrono::NaiveDate;
use serde_json::{Value, json};

/// `form|lemma@kind_key`; lemma defaults to the form, the tag is optional.
fn token(word: &str) -> Value {
    let (word, tag) = match word.split_once('@') {
        Some((word, tag)) => (word, Some(tag)),
        None => (word, None),
    };
    let (form, lemma) = word.split_once('|').unwrap_or((word, word));
    let tags: Vec<Value> = tag
        .and_then(|t| t.split_once('_'))
        .map(|(kind, key)| vec![json!({ "kind": kind, "key": key })])
        .unwrap_or_default();
    json!({ "form": form, "lemma": lemma, "tags": tags })
}

fn segment(id: usize, tag: &str, sentences: &[&str]) -> Value {
    let sentences: Vec<Vec<Value>> = sentences.iter().map(|s| s.split_whitespace().map(token).collect()).collect();
    json!({ "id": id, "tag": tag, "sentences": sentences })
}

/// Segments as the command-line front end receives them.
fn policy_json() -> String {
    let segments = json!([
        segment(0, "h1", &["Zásady|zásada ochrany|ochrana osobních|osobní údajů|údaj"]),
        segment(1, "h2", &["Správce|správce osobních|osobní údajů|údaj"]),
        segment(
            2,
            "p",
            &["Správcem|správce osobních|osobní údajů|údaj je|být Rohlik.cz@if_0 a.s.@if_0 , se sídlem|sídlo \
               Sokolovská@A_1 100/94@A_1 ,@A_1 Praha@A_1 8@A_1 ."],
        ),
        segment(3, "h2", &["Komu|kdo údaje|údaj předáváme|předávat"]),
        segment(
            4,
            "p",
            &["Vaše|váš osobní|osobní údaje|údaj předáváme|předávat dopravcům|dopravce PPL@if_0 a|a Zásilkovna@if_1 ."],
        ),
        segment(5, "h2", &["Jak|jak dlouho|dlouho"]),
        segment(
            6,
            "p",
            &["Osobní|osobní údaje|údaj zpracováváme|zpracovávat po|po dobu|doba 5 let|léta od|od ukončení|ukončení smlouvy|smlouva ."],
        ),
        segment(7, "h2", &["Vaše|váš práva|právo"]),
        segment(
            8,
            "p",
            &[
                "Máte|mít právo|právo požadovat|požadovat výmaz|výmaz osobních|osobní údajů|údaj .",
                "Můžete|moci požádat|požádat o|o přehled|přehled osobních|osobní údajů|údaj .",
            ],
        ),
        json!({
            "id": 9,
            "tag": "p",
            "text": "Kontakt: dpo@rohlik.cz",
            "sentences": [[
                { "form": "Kontakt", "lemma": "kontakt", "space_after": "none" },
                { "form": ":", "lemma": ":" },
                { "form": "dpo@rohlik.cz", "lemma": "dpo@rohlik.cz", "space_after": { "literal": "\\n" } }
            ]]
        }),
    ]);
    segments.to_string()
}

fn segments() -> Vec<Segment> {
    serde_json::from_str(&policy_json()).expect("valid segment JSON")
}

fn context() -> Context {
    Context { reference_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() }
}

#[test]
fn extracts_consent_facts_from_json_segments() {
    let res = extract_with(&segments(), &context(), &Options::default()).unwrap();
    let report = &res.report;

    assert_eq!(report.controller.as_ref().map(|e| e.text.trim()), Some("Rohlik.cz a.s."));
    assert_eq!(report.controller_address.as_ref().map(|e| e.text.trim()), Some("Sokolovská 100/94 , Praha 8"));
    assert_eq!(report.recipients, vec!["PPL".to_string(), "Zásilkovna".to_string()]);

    let period = report.retention.short.as_ref().expect("retention period");
    assert_eq!(period.years, 5);
    assert_eq!(period.expires, NaiveDate::from_ymd_opt(2029, 3, 1));
    assert_eq!(report.retention.sentences.len(), 1);

    assert_eq!(report.erasure.len(), 1);
    assert!(report.erasure[0].text.starts_with("Máte právo požadovat výmaz"));
    assert_eq!(report.access.len(), 1);
    assert!(report.access[0].text.starts_with("Můžete požádat o přehled"));
    assert!(report.deadline.is_empty());
}

#[test]
fn report_serializes_for_the_cli() {
    let res = extract_verbose_with(&segments(), &context(), &Options::default()).unwrap();

    let encoded = serde_json::to_string(&res.report).unwrap();
    let decoded: ConsentReport = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, res.report);

    let verbose = serde_json::to_value(&res).unwrap();
    assert_eq!(verbose["report"]["retention"]["short"]["expires"], json!("2029-03-01"));
    assert!(verbose["details"]["rule_hits"].as_array().is_some_and(|hits| !hits.is_empty()));
}

#[test]
fn whitespace_directives_survive_json() {
    let segments = segments();
    let doc = Document::build(&segments, HeadingTags::default()).unwrap();
    let last = doc.len() - 1;
    assert_eq!(doc.text_for_range(last - 2, last).unwrap(), "Kontakt: dpo@rohlik.cz\n");
}

#[test]
fn heading_tags_are_configurable() {
    let segments = segments();
    let all = Document::build(&segments, HeadingTags::default()).unwrap();
    let top_only = Document::build(&segments, HeadingTags::H1).unwrap();

    assert_eq!(all.stats().headings, 5);
    assert_eq!(top_only.heading_boundaries(), &[0, top_only.len()]);
}

#[test]
fn matcher_reports_per_pattern_blocks() {
    let tokens: Vec<AnnotatedToken> = "a b a b".split_whitespace().map(|w| AnnotatedToken::new(w, w)).collect();
    let doc = Document::build(&[Segment::new(0, "p", vec![tokens])], HeadingTags::default()).unwrap();
    let config = MatcherConfig::default();
    let matcher = Matcher::new(&doc, &config);

    let patterns: Vec<Pattern> = vec!["b".parse().unwrap(), "a".parse().unwrap()];
    let spans = matcher.find_many(&patterns, 0, None, MatchMode::Strict);
    let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![1, 3, 0, 2]);

    let gapped: Pattern = "a *1 a".parse().unwrap();
    assert_eq!(matcher.find_occurrences(&gapped, 0, None, MatchMode::Strict), vec![Span { start: 0, end: 2 }]);
}

#[test]
fn invalid_patterns_are_rejected() {
    for source in ["", "a *0 b", "a *x b", "a *", "*2 *3 b"] {
        assert!(
            matches!(source.parse::<Pattern>(), Err(Error::InvalidPattern { .. })),
            "pattern '{}' should be invalid",
            source
        );
    }
}

#[test]
fn nearest_entity_through_public_api() {
    let doc = Document::build(&segments(), HeadingTags::default()).unwrap();
    let (from, to) = doc.heading_range_for(doc.entities()[0].start_index).unwrap();

    let company = doc.nearest_entity(&["if", "io"], from, from, to, &Blacklist::default()).unwrap().unwrap();
    assert_eq!(company.text.trim(), "Rohlik.cz a.s.");

    let rejected = Blacklist::new(["ROHLIK.CZ A.S."]);
    assert!(doc.nearest_entity(&["if"], from, from, to, &rejected).unwrap().is_none());
}

#[test]
fn rationale_selection_end_to_end() {
    // Top half of the six positive scores is exactly sentence 1.
    let scores = [0.01, 0.0, 0.02, 0.9, 0.8, 0.95, 0.0, 0.01, 0.0];
    let ids: Vec<Option<usize>> = [0, 0, 0, 1, 1, 1, 2, 2, 2].into_iter().map(Some).collect();
    let config = RationaleConfig { min_rationales: 1, max_rationales: 1, top_percent: 50.0, ..Default::default() };

    assert_eq!(rationale::rationales(&scores, &ids, &config).unwrap(), Some(vec![1]));
}

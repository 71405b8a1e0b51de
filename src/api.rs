use crate::engine::ExtractionMetrics;
use crate::rules::{DEFAULT_BLACKLIST, Extraction, categories, controller, recipients, retention, rights};
use crate::{
    Blacklist, Document, DocumentStats, Entity, HeadingTags, MatcherConfig, Result, Segment, SentenceText, StageMetrics,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub use crate::rules::RuleHits;
pub use crate::rules::retention::{Retention, RetentionPeriod};

/// Extraction context.
///
/// This holds environment needed to resolve relative facts (like "po dobu
/// 10 let" into an expiry date).
#[derive(Debug, Clone)]
pub struct Context {
    /// Date retention periods are counted from.
    pub reference_date: NaiveDate,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            Self { reference_date: NaiveDate::from_ymd_opt(2013, 2, 12).unwrap() }
        } else {
            Self { reference_date: Local::now().date_naive() }
        }
    }
}

/// Options that affect document building and matching.
#[derive(Debug, Clone)]
pub struct Options {
    /// Segment tags that open a new heading range.
    pub heading_tags: HeadingTags,
    /// Sentence terminators and leading-noise tolerance for sentence mode.
    pub matcher: MatcherConfig,
    /// Entity texts never reported as a controller or recipient.
    pub blacklist: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            heading_tags: HeadingTags::default(),
            matcher: MatcherConfig::default(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Facts read from one consent or privacy-policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsentReport {
    /// Company responsible for the processing.
    pub controller: Option<Entity>,
    /// Address found next to the controller.
    pub controller_address: Option<Entity>,
    /// Companies the data is passed on to, or the text of the sections that
    /// talk about recipients when none is named.
    pub recipients: Vec<String>,
    pub retention: Retention,
    /// Sentences on the right of access.
    pub access: Vec<SentenceText>,
    /// Sentences on the right to erasure.
    pub erasure: Vec<SentenceText>,
    /// Sentences on the deadline for answering a request.
    pub deadline: Vec<SentenceText>,
    /// Category name (`name`, `address`, `birth_date`, ...) to the sentences
    /// that mention it.
    pub data_categories: BTreeMap<String, Vec<SentenceText>>,
}

/// Result from [`extract`] and [`extract_with`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub report: ConsentReport,
    pub stats: DocumentStats,
    /// Total elapsed time spent building the document and running extractors.
    pub elapsed: Duration,
}

/// Additional details returned by [`extract_verbose_with`].
///
/// This is meant for profiling and rule debugging: timings per stage, the
/// shape of the built document, and what every rule set matched.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Time spent flattening segments and assembling entities.
    pub build: Duration,
    /// Per-extractor timings, in execution order.
    pub stages: Vec<StageMetrics>,
    pub stats: DocumentStats,
    /// Matches per rule set, in the order the sets ran.
    pub rule_hits: Vec<RuleHits>,
}

/// Result from [`extract_verbose_with`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResultVerbose {
    pub report: ConsentReport,
    pub elapsed: Duration,
    pub details: ExtractionDetails,
}

/// Extract facts from `segments` using a default [`Context`] and [`Options`].
///
/// # Example
/// ```
/// use consent_facts::{AnnotatedToken, Segment, extract};
///
/// let words = [("Správcem", "správce"), ("osobních", "osobní"), ("údajů", "údaj"), ("je", "být")];
/// let mut sentence: Vec<AnnotatedToken> = words.iter().map(|(f, l)| AnnotatedToken::new(*f, *l)).collect();
/// sentence.push(AnnotatedToken::new("Alza.cz", "Alza.cz").tagged("if", "1"));
/// sentence.push(AnnotatedToken::new(".", "."));
///
/// let out = extract(&[Segment::new(0, "p", vec![sentence])]).unwrap();
/// assert_eq!(out.report.controller.unwrap().text.trim(), "Alza.cz");
/// ```
pub fn extract(segments: &[Segment]) -> Result<ExtractionResult> {
    extract_with(segments, &Context::default(), &Options::default())
}

/// Extract facts using the provided `context`/`options`.
///
/// Use this when you want deterministic expiry dates by supplying a
/// reference date.
pub fn extract_with(segments: &[Segment], context: &Context, options: &Options) -> Result<ExtractionResult> {
    let run = run(segments, context, options)?;
    Ok(ExtractionResult { report: run.report, stats: run.stats, elapsed: run.metrics.total() })
}

/// Extract facts and return extra (compact) debug details.
pub fn extract_verbose_with(
    segments: &[Segment],
    context: &Context,
    options: &Options,
) -> Result<ExtractionResultVerbose> {
    let run = run(segments, context, options)?;
    let total = run.metrics.total();

    let details = ExtractionDetails {
        total,
        build: run.metrics.build,
        stages: run.metrics.stages,
        stats: run.stats,
        rule_hits: run.hits,
    };
    Ok(ExtractionResultVerbose { report: run.report, elapsed: total, details })
}

struct Run {
    report: ConsentReport,
    stats: DocumentStats,
    metrics: ExtractionMetrics,
    hits: Vec<RuleHits>,
}

fn run(segments: &[Segment], context: &Context, options: &Options) -> Result<Run> {
    let started = Instant::now();
    let doc = Document::build(segments, options.heading_tags)?;
    let mut metrics = ExtractionMetrics { build: started.elapsed(), ..Default::default() };

    let blacklist = Blacklist::new(&options.blacklist);
    let mut cx = Extraction::new(&doc, &options.matcher, &blacklist);

    let found_controller = metrics.time("controller", || controller::extract(&mut cx))?;
    let found_recipients = metrics.time("recipients", || recipients::extract(&mut cx))?;
    let found_retention = metrics.time("retention", || retention::extract(&mut cx, context.reference_date))?;
    let access = metrics.time("access", || rights::access(&mut cx))?;
    let erasure = metrics.time("erasure", || rights::erasure(&mut cx))?;
    let deadline = metrics.time("deadline", || rights::deadline(&mut cx))?;
    let data_categories = metrics.time("data_categories", || categories::extract(&mut cx))?;

    let report = ConsentReport {
        controller: found_controller.company,
        controller_address: found_controller.address,
        recipients: found_recipients,
        retention: found_retention,
        access,
        erasure,
        deadline,
        data_categories,
    };

    debug!(
        controller = report.controller.is_some(),
        recipients = report.recipients.len(),
        retention_sentences = report.retention.sentences.len(),
        categories = report.data_categories.len(),
        elapsed_us = metrics.total().as_micros() as u64,
        "extraction finished"
    );

    Ok(Run { report, stats: doc.stats(), metrics, hits: cx.into_hits() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnnotatedToken;

    fn conllu(rows: &[(&str, &str, &str)]) -> String {
        rows.iter()
            .enumerate()
            .map(|(i, (form, lemma, misc))| format!("{}\t{form}\t{lemma}\t_\t_\t_\t0\troot\t_\t{misc}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn policy() -> Vec<Segment> {
        let heading = conllu(&[("Správce", "správce", "_"), ("osobních", "osobní", "_"), ("údajů", "údaj", "SpacesAfter=\\n")]);
        let body = conllu(&[
            ("Správcem", "správce", "_"),
            ("je", "být", "_"),
            ("Seznam.cz", "Seznam.cz", "NE=if_1"),
            ("a.s.", "a.s.", "NE=if_1|SpaceAfter=No"),
            (",", ",", "_"),
            ("Radlická", "Radlická", "NE=A_2"),
            ("3294/10", "3294/10", "NE=A_2"),
            ("Praha", "Praha", "NE=A_2|SpaceAfter=No"),
            (".", ".", "_"),
            ("Osobní", "osobní", "_"),
            ("údaje", "údaj", "_"),
            ("zpracováváme", "zpracovávat", "_"),
            ("po", "po", "_"),
            ("dobu", "doba", "_"),
            ("3", "3", "_"),
            ("let", "léta", "SpaceAfter=No"),
            (".", ".", "_"),
        ]);
        // A closing sentence keeps the retention clause inside the candidate
        // window of the long retention patterns.
        let closing = conllu(&[("Děkujeme", "děkovat", "_"), ("za", "za", "_"), ("důvěru", "důvěra", "SpaceAfter=No"), (".", ".", "_")]);
        let body = format!("{body}\n\n{closing}");
        vec![
            Segment::from_conllu(0, "Správce osobních údajů", "h2", &heading).unwrap(),
            Segment::from_conllu(1, "", "p", &body).unwrap(),
        ]
    }

    fn reference_context() -> Context {
        Context { reference_date: NaiveDate::from_ymd_opt(2020, 1, 31).unwrap() }
    }

    #[test]
    fn extract_with_returns_controller_and_address() {
        let res = extract_with(&policy(), &reference_context(), &Options::default()).unwrap();

        let controller = res.report.controller.expect("controller");
        assert_eq!(controller.text, "Seznam.cz a.s.");
        assert_eq!(res.report.controller_address.map(|a| a.text), Some("Radlická 3294/10 Praha".to_string()));
        assert_eq!(res.stats.tokens, 24);
        assert_eq!(res.stats.sentences, 3);
        assert_eq!(res.stats.headings, 1);
        assert!(res.elapsed >= Duration::ZERO);

        let period = res.report.retention.short.expect("retention period");
        assert_eq!(period.years, 3);
        assert_eq!(period.text, "po dobu 3 let");
        assert_eq!(period.expires, NaiveDate::from_ymd_opt(2023, 1, 31));
        assert_eq!(res.report.retention.sentences.len(), 1);
        assert_eq!(res.report.retention.sentences[0].range, crate::Span { start: 3, end: 19 });
    }

    #[test]
    fn extract_uses_default_context() {
        let res = extract(&policy()).unwrap();
        assert!(res.report.controller.is_some());
        let period = res.report.retention.short.expect("retention period");
        assert_eq!(period.expires, NaiveDate::from_ymd_opt(2016, 2, 12));
    }

    #[test]
    fn extract_verbose_includes_metrics_and_rule_hits() {
        let res = extract_verbose_with(&policy(), &reference_context(), &Options::default()).unwrap();

        assert_eq!(res.elapsed, res.details.total);
        assert!(res.details.build <= res.details.total);

        let stages: Vec<&str> = res.details.stages.iter().map(|s| s.name).collect();
        assert_eq!(
            stages,
            vec!["controller", "recipients", "retention", "access", "erasure", "deadline", "data_categories"]
        );

        let controller = res.details.rule_hits.iter().find(|h| h.rule == "controller").expect("controller hits");
        assert_eq!(controller.matches, vec![crate::Span { start: 0, end: 2 }]);
        assert_eq!(res.details.stats.entities, 2);
    }

    #[test]
    fn options_change_the_blacklist() {
        let options = Options { blacklist: vec!["seznam.cz a.s.".to_string()], ..Options::default() };
        let res = extract_with(&policy(), &reference_context(), &options).unwrap();
        assert!(res.report.controller.is_none());
    }

    #[test]
    fn malformed_input_is_an_error() {
        let segments = vec![Segment::new(0, "p", vec![vec![AnnotatedToken::new("", "x")]])];
        assert!(matches!(extract(&segments), Err(crate::Error::MalformedInput(_))));
    }
}

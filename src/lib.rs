extern crate self as consent_facts;

#[macro_use]
mod macros;
mod api;
pub mod conllu;
mod engine;
mod error;
pub mod rationale;
mod rules;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

pub use api::{
    ConsentReport, Context, ExtractionDetails, ExtractionResult, ExtractionResultVerbose, Options, Retention,
    RetentionPeriod, RuleHits, extract, extract_verbose_with, extract_with,
};
pub use engine::{
    Blacklist, Document, DocumentStats, Entity, HeadingTags, MatchMode, Matcher, MatcherConfig, Pattern,
    PatternElement, SentenceText, Span, StageMetrics,
};
pub use error::{Error, Result};
pub use rationale::{RationaleConfig, Selector};

// --- Annotator records -------------------------------------------------------

/// Whitespace that follows a token in the original text.
///
/// This is the `SpaceAfter` / `SpacesAfter` information of the annotator's
/// MISC column. Rendering rules live in [`SpaceAfter::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceAfter {
    /// No directive: a single space.
    #[default]
    Space,
    /// Explicit `SpaceAfter=No`.
    None,
    /// Explicit `SpacesAfter=...`, still escaped (`\n`, `\t`, `\r`, `\s`).
    Literal(String),
}

impl SpaceAfter {
    /// Text appended after the token's surface form.
    ///
    /// ```text
    /// Space          -> " "
    /// None           -> ""
    /// Literal("\\n") -> "\n"     (\n \t \r expanded, \s dropped)
    /// ```
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            SpaceAfter::Space => Cow::Borrowed(" "),
            SpaceAfter::None => Cow::Borrowed(""),
            SpaceAfter::Literal(raw) => {
                Cow::Owned(raw.replace("\\n", "\n").replace("\\t", "\t").replace("\\r", "\r").replace("\\s", ""))
            }
        }
    }
}

/// One named-entity annotation on a token: its type (`if`, `io`, `A`, ...)
/// and the annotator's identity key that links the tokens of one mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTag {
    pub kind: String,
    #[serde(default)]
    pub key: String,
}

impl EntityTag {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        EntityTag { kind: kind.into(), key: key.into() }
    }
}

/// A token as delivered by the external tagger / lemmatizer / NER service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub form: String,
    pub lemma: String,
    #[serde(default)]
    pub space_after: SpaceAfter,
    #[serde(default)]
    pub tags: Vec<EntityTag>,
    /// Global index pre-assigned upstream, if any. When present it must agree
    /// with the position the token lands on after flattening.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl AnnotatedToken {
    pub fn new(form: impl Into<String>, lemma: impl Into<String>) -> Self {
        AnnotatedToken {
            form: form.into(),
            lemma: lemma.into(),
            space_after: SpaceAfter::Space,
            tags: Vec::new(),
            index: None,
        }
    }

    /// Mark the token as glued to the next one (`SpaceAfter=No`).
    pub fn no_space(mut self) -> Self {
        self.space_after = SpaceAfter::None;
        self
    }

    /// Attach an explicit, still-escaped spacing string (`SpacesAfter=`).
    pub fn spaces(mut self, raw: impl Into<String>) -> Self {
        self.space_after = SpaceAfter::Literal(raw.into());
        self
    }

    pub fn tagged(mut self, kind: impl Into<String>, key: impl Into<String>) -> Self {
        self.tags.push(EntityTag::new(kind, key));
        self
    }
}

/// One structural block of the source document (a `<p>`, `<h2>`, `<li>`...)
/// with the annotator's sentences for its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    #[serde(default)]
    pub text: String,
    /// HTML tag name of the block, e.g. `"h2"` or `"p"`.
    pub tag: String,
    #[serde(default)]
    pub sentences: Vec<Vec<AnnotatedToken>>,
}

impl Segment {
    pub fn new(id: usize, tag: impl Into<String>, sentences: Vec<Vec<AnnotatedToken>>) -> Self {
        Segment { id, text: String::new(), tag: tag.into(), sentences }
    }

    /// Build a segment from the annotator's CoNLL-U output for `text`.
    pub fn from_conllu(id: usize, text: impl Into<String>, tag: impl Into<String>, conllu: &str) -> Result<Self> {
        Ok(Segment { id, text: text.into(), tag: tag.into(), sentences: conllu::parse(conllu)? })
    }
}

// --- Internal types ---------------------------------------------------------

/// A flattened token. `text_index` is its position in [`Document::tokens`];
/// sentence and segment are plain indices as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub form: String,
    pub lemma: String,
    pub space_after: SpaceAfter,
    /// Most tokens carry zero or one tag; nested mentions rarely exceed two.
    pub tags: SmallVec<[EntityTag; 2]>,
    pub text_index: usize,
    pub sentence_id: usize,
    pub segment_id: usize,
}

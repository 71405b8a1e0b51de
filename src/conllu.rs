//! Reader for the annotator's CoNLL-U output.
//!
//! Only the columns the extractor consumes are kept: FORM, LEMMA and the
//! MISC directives for spacing and named entities.
//!
//! ```text
//! # text = Správcem je Alza.cz a.s.
//! 1  Správcem  správce  NOUN ... _  _
//! 2  je        být      AUX  ... _  _
//! 3  Alza.cz   Alza.cz  PROPN ... _  NE=if_4
//! 4  a.s.      a.s.     NOUN ... _  SpaceAfter=No|NE=if_4
//! 5  .         .        PUNCT ... _  SpacesAfter=\n
//! ```

use crate::{AnnotatedToken, EntityTag, Error, Result, SpaceAfter};
use tracing::debug;

const COLUMNS: usize = 10;
const FORM: usize = 1;
const LEMMA: usize = 2;
const MISC: usize = 9;

/// Parse CoNLL-U text into sentences of annotated tokens.
///
/// Comment lines (`#`), multi-word range lines (`1-2`) and empty nodes
/// (`3.1`) are skipped. A blank line closes the current sentence; a trailing
/// sentence without one is still returned.
pub fn parse(text: &str) -> Result<Vec<Vec<AnnotatedToken>>> {
    let mut sentences = Vec::new();
    let mut current: Vec<AnnotatedToken> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < COLUMNS {
            return Err(Error::Conllu {
                line: line_no,
                message: format!("expected {COLUMNS} tab-separated columns, found {}", columns.len()),
            });
        }

        let id = columns[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }
        if id.parse::<usize>().is_err() {
            return Err(Error::Conllu { line: line_no, message: format!("invalid token id `{id}`") });
        }

        current.push(token(&columns, line_no)?);
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    debug!(sentences = sentences.len(), "conllu parsed");
    Ok(sentences)
}

fn token(columns: &[&str], line_no: usize) -> Result<AnnotatedToken> {
    let form = columns[FORM];
    if form.is_empty() {
        return Err(Error::Conllu { line: line_no, message: "empty FORM".to_string() });
    }
    let lemma = if columns[LEMMA] == "_" || columns[LEMMA].is_empty() { form } else { columns[LEMMA] };

    let mut token = AnnotatedToken::new(form, lemma);
    if columns[MISC] == "_" {
        return Ok(token);
    }

    let mut glued = false;
    for item in columns[MISC].split('|') {
        let Some((key, value)) = item.split_once('=') else { continue };
        match key {
            "SpaceAfter" if value == "No" => glued = true,
            "SpacesAfter" => token.space_after = SpaceAfter::Literal(value.to_string()),
            "NE" => token.tags.extend(entity_tags(value)),
            _ => {}
        }
    }
    // `SpaceAfter=No` wins over `SpacesAfter=` regardless of order.
    if glued {
        token.space_after = SpaceAfter::None;
    }
    Ok(token)
}

/// `if_4-A_7` -> `[(if, 4), (A, 7)]`; an item without `_` gets an empty key.
fn entity_tags(value: &str) -> impl Iterator<Item = EntityTag> + '_ {
    value.split('-').filter(|item| !item.is_empty()).map(|item| match item.split_once('_') {
        Some((kind, key)) => EntityTag::new(kind, key),
        None => EntityTag::new(item, ""),
    })
}

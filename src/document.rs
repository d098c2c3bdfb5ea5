// WHY: Assembles the persisted content document around the timing data -
// display text, paragraphs, headers, metadata. Presentation only; no timing
// decisions are made here.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::alignment::Word;
use crate::lookup::LookupTable;
use crate::segmenter::Sentence;

pub const CONTENT_VERSION: &str = "1.0";
pub const SOURCE_TAG: &str = "character-alignment";

/// Lines with at most this many words are header candidates
const HEADER_MAX_WORDS: usize = 8;

/// Keywords that mark a short line as a section header
const HEADER_KEYWORDS: &[&str] = &[
    "Summary",
    "Introduction",
    "Conclusion",
    "Overview",
    "Background",
    "Glossary",
];

#[derive(Debug, Clone, Serialize)]
pub struct Formatting {
    pub bold_headers: bool,
    pub paragraph_spacing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub word_count: usize,
    pub character_count: usize,
    pub estimated_reading_time: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub words: Vec<Word>,
    pub sentences: Vec<Sentence>,
    pub total_duration_ms: u64,
}

/// The content document persisted for the playback client
#[derive(Debug, Clone, Serialize)]
pub struct ContentDocument {
    pub version: String,
    pub source: String,
    pub display_text: String,
    pub paragraphs: Vec<String>,
    pub headers: Vec<String>,
    pub formatting: Formatting,
    pub metadata: Metadata,
    pub timing: Timing,
}

/// Lookup table in its persisted form: index pairs, `null` for the sentinel.
/// Stored separately from the content document for size reasons.
#[derive(Debug, Clone, Serialize)]
pub struct LookupTableFile {
    pub version: String,
    pub interval_ms: u64,
    pub total_duration_ms: u64,
    pub lookup: Vec<(Option<usize>, Option<usize>)>,
}

impl From<&LookupTable> for LookupTableFile {
    fn from(table: &LookupTable) -> Self {
        Self {
            version: CONTENT_VERSION.to_string(),
            interval_ms: table.interval_ms,
            total_duration_ms: table.total_duration_ms,
            lookup: table
                .entries
                .iter()
                .map(|e| (e.word_index, e.sentence_index))
                .collect(),
        }
    }
}

/// Build the content document. When a reference text is supplied its
/// paragraph breaks win over the reconstructed text's.
pub fn assemble(
    text: &str,
    words: Vec<Word>,
    sentences: Vec<Sentence>,
    total_duration_ms: u64,
    reference: Option<&str>,
) -> ContentDocument {
    let paragraphs = match reference {
        Some(reference_text) => reference_paragraphs(reference_text),
        None => extract_paragraphs(text),
    };
    let paragraphs = if paragraphs.is_empty() {
        vec![text.trim().to_string()]
    } else {
        paragraphs
    };

    let display_text = paragraphs.join("\n\n");
    let headers = extract_headers(text);
    debug!(
        "Assembled document: {} paragraphs, {} headers",
        paragraphs.len(),
        headers.len()
    );

    ContentDocument {
        version: CONTENT_VERSION.to_string(),
        source: SOURCE_TAG.to_string(),
        display_text,
        paragraphs,
        headers,
        formatting: Formatting {
            bold_headers: false,
            paragraph_spacing: true,
        },
        metadata: Metadata {
            word_count: words.len(),
            character_count: text.chars().count(),
            estimated_reading_time: estimated_reading_time(words.len()),
            language: "en".to_string(),
        },
        timing: Timing {
            words,
            sentences,
            total_duration_ms,
        },
    }
}

/// Reading time at 200 words per minute, never less than one minute
pub fn estimated_reading_time(word_count: usize) -> String {
    format!("{} minutes", (word_count / 200).max(1))
}

/// Paragraphs from the reconstructed text: runs of non-empty lines joined
/// with spaces, separated by blank lines
pub fn extract_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            current.push(line);
        } else if !current.is_empty() {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Paragraphs from reference text/markdown: split on blank lines, falling
/// back to single newlines, with leading markdown header markers stripped
pub fn reference_paragraphs(reference: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = reference
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(strip_markdown_header)
        .collect();

    if paragraphs.len() <= 1 {
        paragraphs = reference
            .lines()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(strip_markdown_header)
            .collect();
    }

    paragraphs
}

fn strip_markdown_header(paragraph: &str) -> String {
    paragraph
        .trim_start_matches('#')
        .trim_start()
        .to_string()
}

/// Header heuristic: short lines ending with a colon, starting uppercase
/// without a trailing period, or containing a section keyword. Duplicates
/// removed, first-seen order kept.
pub fn extract_headers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.split_whitespace().count() > HEADER_MAX_WORDS {
            continue;
        }

        let header_like = line.ends_with(':')
            || (line.chars().next().is_some_and(|c| c.is_uppercase()) && !line.ends_with('.'))
            || HEADER_KEYWORDS.iter().any(|k| line.contains(k));
        if !header_like {
            continue;
        }

        let header = line.trim_end_matches(':').to_string();
        if seen.insert(header.clone()) {
            headers.push(header);
        }
    }

    headers
}

// WHY: Stage 3 - the core boundary state machine. Consumes words in order,
// decides after each word whether a sentence ends there, and emits sentences
// as exact substrings of the reconstructed text.

use anyhow::Result;
use regex_automata::meta::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::alignment::Word;
use crate::structure::{StructureKind, TextStructure};

pub mod abbreviations;

pub use abbreviations::AbbreviationChecker;

/// Code-like context that suppresses semicolon breaks
const CODE_SNIPPET_PATTERN: &str = r"(?:if|while|for|def|function|class)\s*\([^)]*\)\s*\{?";

/// Diagnostic tag recording why the segmenter ended a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakReason {
    Period,
    ExclamationOrQuestion,
    ColonList,
    Semicolon,
    List(StructureKind),
    EndOfText,
}

impl BreakReason {
    pub fn tag(&self) -> String {
        match self {
            BreakReason::Period => "period".to_string(),
            BreakReason::ExclamationOrQuestion => "exclamation_or_question".to_string(),
            BreakReason::ColonList => "colon_list".to_string(),
            BreakReason::Semicolon => "semicolon".to_string(),
            BreakReason::List(kind) => format!("list_{}", kind.tag()),
            BreakReason::EndOfText => "end_of_text".to_string(),
        }
    }
}

impl Serialize for BreakReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// A detected sentence with timing, word range, and byte range
#[derive(Debug, Clone, Serialize)]
pub struct Sentence {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub word_start_index: usize,
    pub word_end_index: usize,
    pub char_start: usize,
    pub char_end: usize,
    pub break_reason: BreakReason,
}

/// Rule-based sentence segmenter with abbreviation and structure awareness
pub struct SentenceSegmenter {
    abbreviations: AbbreviationChecker,
    code_snippet: Regex,
}

impl SentenceSegmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            abbreviations: AbbreviationChecker::new(),
            code_snippet: Regex::new(CODE_SNIPPET_PATTERN)?,
        })
    }

    /// Segment with the full edge-case rules. Returns a new word sequence with
    /// `sentence_index` assigned plus the sentences; the input is not mutated.
    pub fn segment(
        &self,
        words: &[Word],
        text: &str,
        structures: &[TextStructure],
    ) -> (Vec<Word>, Vec<Sentence>) {
        // End positions of list-type structures force breaks regardless of
        // the word's own punctuation
        let list_ends: HashMap<usize, StructureKind> = structures
            .iter()
            .filter(|s| s.kind.is_list())
            .map(|s| (s.end, s.kind))
            .collect();

        let mut out_words = words.to_vec();
        let mut sentences = Vec::new();
        let mut sentence_start_char = 0usize;
        let mut first_word_index = 0usize;

        for i in 0..out_words.len() {
            out_words[i].sentence_index = sentences.len();

            let next_text = out_words.get(i + 1).map(|w| w.text.as_str());
            let Some(reason) = self.break_after(&out_words[i], next_text, text, &list_ends) else {
                continue;
            };

            sentences.push(emit_sentence(
                text,
                &out_words,
                first_word_index,
                i,
                sentence_start_char,
                out_words[i].char_end,
                reason,
            ));
            first_word_index = i + 1;
            sentence_start_char = skip_whitespace(text, out_words[i].char_end);
        }

        if first_word_index < out_words.len() {
            sentences.push(emit_sentence(
                text,
                &out_words,
                first_word_index,
                out_words.len() - 1,
                sentence_start_char,
                text.len(),
                BreakReason::EndOfText,
            ));
        }

        info!(
            "Segmented {} words into {} sentences",
            out_words.len(),
            sentences.len()
        );
        (out_words, sentences)
    }

    /// Minimal punctuation-only fallback: break on `.!?` unless the word looks
    /// like a short abbreviation followed by a lowercase continuation
    pub fn segment_simple(&self, words: &[Word], text: &str) -> (Vec<Word>, Vec<Sentence>) {
        let mut out_words = words.to_vec();
        let mut sentences = Vec::new();
        let mut sentence_start_char = 0usize;
        let mut first_word_index = 0usize;

        for i in 0..out_words.len() {
            out_words[i].sentence_index = sentences.len();

            let word_text = out_words[i].text.as_str();
            let last = word_text.chars().next_back();
            if !matches!(last, Some('.') | Some('!') | Some('?')) {
                continue;
            }

            let short_abbreviation = word_text.chars().count() <= 4
                && word_text.contains('.')
                && out_words
                    .get(i + 1)
                    .and_then(|w| w.text.chars().next())
                    .is_some_and(|c| c.is_lowercase());
            if short_abbreviation {
                continue;
            }

            let reason = if last == Some('.') {
                BreakReason::Period
            } else {
                BreakReason::ExclamationOrQuestion
            };
            sentences.push(emit_sentence(
                text,
                &out_words,
                first_word_index,
                i,
                sentence_start_char,
                out_words[i].char_end,
                reason,
            ));
            first_word_index = i + 1;
            sentence_start_char = skip_whitespace(text, out_words[i].char_end);
        }

        if first_word_index < out_words.len() {
            sentences.push(emit_sentence(
                text,
                &out_words,
                first_word_index,
                out_words.len() - 1,
                sentence_start_char,
                text.len(),
                BreakReason::EndOfText,
            ));
        }

        info!(
            "Simple segmentation produced {} sentences from {} words",
            sentences.len(),
            out_words.len()
        );
        (out_words, sentences)
    }

    /// Break decision for the current word's trailing character, in priority
    /// order; a list-structure end overrides whatever punctuation decided
    fn break_after(
        &self,
        word: &Word,
        next_text: Option<&str>,
        text: &str,
        list_ends: &HashMap<usize, StructureKind>,
    ) -> Option<BreakReason> {
        if let Some(kind) = list_ends.get(&word.char_end) {
            return Some(BreakReason::List(*kind));
        }

        let word_text = word.text.as_str();
        match word_text.chars().next_back()? {
            '.' => {
                if !self.abbreviations.is_abbreviation(word_text, next_text) {
                    return Some(BreakReason::Period);
                }
            }
            '!' | '?' => {
                // "?!" and friends are handled as one unit, not a break
                if !has_repeated_terminal(word_text) {
                    return Some(BreakReason::ExclamationOrQuestion);
                }
            }
            ':' => {
                if self.should_break_at_colon(text, word.char_end - 1) {
                    return Some(BreakReason::ColonList);
                }
            }
            ';' => {
                if self.should_break_at_semicolon(text, word.char_end - 1) {
                    return Some(BreakReason::Semicolon);
                }
            }
            _ => {}
        }
        None
    }

    /// A colon breaks only when what follows looks like the start of a list:
    /// a newline within the next 100 characters, or more than 3 of the next
    /// 10 tokens capitalized. Ratios (3:1) and times (5:30) never break.
    fn should_break_at_colon(&self, text: &str, colon_pos: usize) -> bool {
        let before = text[..colon_pos].chars().next_back();
        let after = &text[colon_pos + 1..];
        let first_after = after.chars().next();

        // Ratio guard: digit on both sides
        if before.is_some_and(|c| c.is_ascii_digit()) && first_after.is_some_and(|c| c.is_ascii_digit())
        {
            return false;
        }
        // Time guard: H:MM
        if looks_like_time(text, colon_pos) {
            return false;
        }

        let trimmed = after.trim_start();
        if !trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
        {
            return false;
        }

        if trimmed.chars().take(100).any(|c| c == '\n') {
            return true;
        }

        let capitalized = trimmed
            .split_whitespace()
            .take(10)
            .filter(|token| token.chars().next().is_some_and(|c| c.is_uppercase()))
            .count();
        capitalized > 3
    }

    /// Semicolons break by default, suppressed inside code-like spans and
    /// open quotations
    fn should_break_at_semicolon(&self, text: &str, semicolon_pos: usize) -> bool {
        !self.is_within_code(text, semicolon_pos) && !is_within_quotes(text, semicolon_pos)
    }

    /// Look for code patterns within roughly 50 characters of the position
    fn is_within_code(&self, text: &str, pos: usize) -> bool {
        let start = text[..pos]
            .char_indices()
            .rev()
            .take(50)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        let end = text[pos..]
            .char_indices()
            .take(51)
            .last()
            .map(|(i, c)| pos + i + c.len_utf8())
            .unwrap_or(text.len());
        self.code_snippet.is_match(&text[start..end])
    }
}

/// Build one sentence from the buffered word range; text is the exact
/// substring from the sentence start to the ending word, trimmed
fn emit_sentence(
    text: &str,
    words: &[Word],
    first_word_index: usize,
    last_word_index: usize,
    char_start: usize,
    char_end: usize,
    reason: BreakReason,
) -> Sentence {
    debug!(
        "Sentence break after word {} ({})",
        last_word_index,
        reason.tag()
    );
    Sentence {
        text: text[char_start..char_end].trim().to_string(),
        start_ms: words[first_word_index].start_ms,
        end_ms: words[last_word_index].end_ms,
        word_start_index: first_word_index,
        word_end_index: last_word_index,
        char_start,
        char_end,
        break_reason: reason,
    }
}

/// Byte offset of the first non-whitespace character at or after `from`
fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Two adjacent terminal marks ("?!", "!!") form one unit, not a break
fn has_repeated_terminal(word: &str) -> bool {
    word.as_bytes()
        .windows(2)
        .any(|pair| matches!(pair, [b'!' | b'?', b'!' | b'?']))
}

/// An odd number of quote characters before the position means it sits
/// inside an open quotation
fn is_within_quotes(text: &str, pos: usize) -> bool {
    let count = text[..pos].chars().filter(|&c| c == '"' || c == '\'').count();
    count % 2 == 1
}

/// H:MM shape around a colon: at least one digit before, exactly two after
fn looks_like_time(text: &str, colon_pos: usize) -> bool {
    let has_hour = text[..colon_pos]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit());
    let minutes = text[colon_pos + 1..]
        .chars()
        .take(3)
        .take_while(|c| c.is_ascii_digit())
        .count();
    has_hour && minutes == 2
}

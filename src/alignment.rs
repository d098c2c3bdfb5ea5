// WHY: Stage 1 of the pipeline - reconstructs text and word intervals from the
// character-level alignment trace; everything downstream consumes its output

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Top-level alignment JSON document as emitted by the TTS engine
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentFile {
    pub alignment: AlignmentTrace,
}

/// Character-level alignment trace: parallel arrays of characters and their
/// start/end times in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentTrace {
    pub characters: Vec<char>,
    #[serde(rename = "character_start_times_seconds")]
    pub start_times: Vec<f64>,
    #[serde(rename = "character_end_times_seconds")]
    pub end_times: Vec<f64>,
}

/// One timestamped character of the trace, times in integer milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSample {
    pub ch: char,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// A word with its time interval and byte range in the reconstructed text.
/// `char_start..char_end` is half-open; `sentence_index` is rewritten by the
/// segmenter and again by the coverage assigner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub char_start: usize,
    pub char_end: usize,
    pub sentence_index: usize,
}

/// Output of the aligner: reconstructed text plus word-level intervals
#[derive(Debug, Clone)]
pub struct AlignedText {
    pub text: String,
    pub words: Vec<Word>,
    pub total_duration_ms: u64,
}

/// Convert seconds to integer milliseconds
// WHY: round instead of truncate - alignment times arrive as floats and
// truncation turns 99.999... back into 99 on clean 100ms grids
fn to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

impl AlignmentTrace {
    /// Validate the parallel arrays and zip them into timestamped samples.
    /// Fails fast before any pipeline stage runs on malformed input.
    pub fn samples(&self) -> Result<Vec<CharacterSample>> {
        if self.characters.len() != self.start_times.len()
            || self.characters.len() != self.end_times.len()
        {
            bail!(
                "alignment arrays differ in length: {} characters, {} start times, {} end times",
                self.characters.len(),
                self.start_times.len(),
                self.end_times.len()
            );
        }

        Ok(self
            .characters
            .iter()
            .zip(self.start_times.iter().zip(self.end_times.iter()))
            .map(|(&ch, (&start, &end))| CharacterSample {
                ch,
                start_ms: to_ms(start),
                end_ms: to_ms(end),
            })
            .collect())
    }
}

/// Reconstruct the full text and extract words with time intervals.
///
/// Runs of non-whitespace characters accumulate into a word; the word opens
/// with the first buffered character's start time and closes with the last
/// buffered character's end time. A run not terminated by trailing whitespace
/// is still flushed as the final word.
pub fn align(trace: &AlignmentTrace) -> Result<AlignedText> {
    let samples = trace.samples()?;
    debug!("Aligning {} character samples", samples.len());

    let mut text = String::with_capacity(samples.len());
    let mut words = Vec::new();
    let mut buf = String::new();
    let mut word_start_ms = 0u64;
    let mut word_end_ms = 0u64;
    let mut word_char_start = 0usize;

    for sample in &samples {
        let pos = text.len();
        if sample.ch.is_whitespace() {
            if !buf.is_empty() {
                words.push(Word {
                    text: std::mem::take(&mut buf),
                    start_ms: word_start_ms,
                    end_ms: word_end_ms,
                    char_start: word_char_start,
                    char_end: pos,
                    sentence_index: 0,
                });
            }
        } else {
            if buf.is_empty() {
                word_start_ms = sample.start_ms;
                word_char_start = pos;
            }
            buf.push(sample.ch);
            word_end_ms = sample.end_ms;
        }
        text.push(sample.ch);
    }

    // Final run without trailing whitespace
    if !buf.is_empty() {
        let char_end = text.len();
        words.push(Word {
            text: buf,
            start_ms: word_start_ms,
            end_ms: word_end_ms,
            char_start: word_char_start,
            char_end,
            sentence_index: 0,
        });
    }

    let total_duration_ms = samples.last().map(|s| s.end_ms).unwrap_or(0);
    info!(
        "Aligned {} words from {} characters, total duration {}ms",
        words.len(),
        samples.len(),
        total_duration_ms
    );

    Ok(AlignedText {
        text,
        words,
        total_duration_ms,
    })
}

// WHY: Stage 6 - pre-sampled table so the playback client maps elapsed time
// to (word, sentence) with one division and one array read

use serde::Serialize;
use tracing::{debug, info};

use crate::alignment::Word;

/// Default sampling interval in milliseconds
pub const DEFAULT_LOOKUP_INTERVAL_MS: u64 = 10;

/// Active word/sentence at one sample time; `None` is the sentinel for a
/// position with no active word (should not occur after normalization, but
/// the builder tolerates it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub word_index: Option<usize>,
    pub sentence_index: Option<usize>,
}

/// Fixed-interval samples from 0 to `total_duration_ms` inclusive
#[derive(Debug, Clone, Serialize)]
pub struct LookupTable {
    pub interval_ms: u64,
    pub total_duration_ms: u64,
    pub entries: Vec<LookupEntry>,
}

impl LookupTable {
    /// Entry covering an elapsed playback time, the same O(1) division the
    /// client performs
    pub fn entry_at(&self, elapsed_ms: u64) -> Option<&LookupEntry> {
        self.entries.get((elapsed_ms / self.interval_ms) as usize)
    }
}

/// Sample the normalized timeline. The word cursor only moves forward, so
/// the whole build is O(total_duration/interval + word_count) rather than a
/// search per sample. Word spans are half-open: a word is active for
/// `start_ms <= t < end_ms`.
pub fn build_lookup_table(words: &[Word], total_duration_ms: u64, interval_ms: u64) -> LookupTable {
    let steps = (total_duration_ms / interval_ms) as usize + 1;
    let mut entries = Vec::with_capacity(steps);
    let mut cursor = 0usize;

    for step in 0..steps {
        let sample_ms = step as u64 * interval_ms;

        while cursor + 1 < words.len() && words[cursor + 1].start_ms <= sample_ms {
            cursor += 1;
        }

        // The cursor word is the last one starting at or before the sample;
        // a sample past its end sits in a residual gap and gets the sentinel
        let entry = match words.get(cursor) {
            Some(word) if word.start_ms <= sample_ms && sample_ms < word.end_ms => LookupEntry {
                word_index: Some(cursor),
                sentence_index: Some(word.sentence_index),
            },
            _ => LookupEntry {
                word_index: None,
                sentence_index: None,
            },
        };
        entries.push(entry);
    }

    let covered = entries.iter().filter(|e| e.word_index.is_some()).count();
    debug!(
        "Lookup coverage: {covered}/{} samples have an active word",
        entries.len()
    );
    info!(
        "Built lookup table: {} entries at {}ms intervals over {}ms",
        entries.len(),
        interval_ms,
        total_duration_ms
    );

    LookupTable {
        interval_ms,
        total_duration_ms,
        entries,
    }
}

// WHY: Stages 4 and 5 - close every timing gap so playback position always
// maps to an active word, then re-derive word ownership from the moved
// sentence boundaries. Onsets are never altered for small gaps; only span
// ends (and both sides of a midpoint split) move.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alignment::Word;
use crate::segmenter::Sentence;

/// Inter-word gaps at or above this are treated as paragraph silence and
/// split at the midpoint instead of handing the whole gap to the earlier word
pub const DEFAULT_GAP_THRESHOLD_MS: u64 = 500;

/// Diagnostics from gap normalization
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NormalizeReport {
    /// Gaps below the threshold, closed by extending the earlier word
    pub gaps_closed: usize,
    /// Gaps at or above the threshold, split at the midpoint
    pub gaps_split: usize,
    /// Overlapping pairs clamped (malformed input, recovered)
    pub overlaps_clamped: usize,
    pub total_gap_ms: u64,
    pub max_gap_ms: u64,
}

/// Diagnostics from sentence coverage assignment
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CoverageReport {
    /// Words whose midpoint fell outside every sentence span
    pub out_of_span: usize,
    /// Words force-assigned to sentence 0 (recoverable anomaly)
    pub forced: usize,
}

/// Close timing gaps between adjacent words. Gaps below the threshold extend
/// the earlier word to meet the next; larger gaps split at the midpoint.
/// Overlaps (next starts before current ends) are clamped with a warning.
pub fn normalize_words(words: &[Word], gap_threshold_ms: u64) -> (Vec<Word>, NormalizeReport) {
    let mut out = words.to_vec();
    let mut report = NormalizeReport::default();

    for i in 0..out.len().saturating_sub(1) {
        let current_end = out[i].end_ms;
        let next_start = out[i + 1].start_ms;

        if next_start > current_end {
            let gap = next_start - current_end;
            report.total_gap_ms += gap;
            report.max_gap_ms = report.max_gap_ms.max(gap);

            if gap < gap_threshold_ms {
                out[i].end_ms = next_start;
                report.gaps_closed += 1;
            } else {
                let midpoint = current_end + gap / 2;
                out[i].end_ms = midpoint;
                out[i + 1].start_ms = midpoint;
                report.gaps_split += 1;
            }
        } else if next_start < current_end {
            warn!(
                "Overlapping word timing: '{}' ends at {}ms but '{}' starts at {}ms, clamping",
                out[i].text,
                current_end,
                out[i + 1].text,
                next_start
            );
            out[i].end_ms = next_start;
            report.overlaps_clamped += 1;
        }
    }

    if report.gaps_closed + report.gaps_split > 0 {
        info!(
            "Eliminated {} gaps ({} split at midpoint), {}ms total, max {}ms",
            report.gaps_closed + report.gaps_split,
            report.gaps_split,
            report.total_gap_ms,
            report.max_gap_ms
        );
    }
    (out, report)
}

/// Rebuild sentence spans from their (already normalized) words, then
/// midpoint-normalize any remaining boundary mismatch so sentence spans are
/// contiguous. Idempotent on an already-normalized sequence.
pub fn normalize_sentences(sentences: &[Sentence], words: &[Word]) -> Vec<Sentence> {
    let mut out = sentences.to_vec();

    for sentence in &mut out {
        if let (Some(first), Some(last)) = (
            words.get(sentence.word_start_index),
            words.get(sentence.word_end_index),
        ) {
            sentence.start_ms = first.start_ms;
            sentence.end_ms = last.end_ms;
        }
    }

    for i in 0..out.len().saturating_sub(1) {
        let current_end = out[i].end_ms;
        let next_start = out[i + 1].start_ms;
        if current_end != next_start {
            let midpoint = (current_end + next_start) / 2;
            debug!(
                "Sentence boundary {} -> {} moved to midpoint {}ms",
                current_end, next_start, midpoint
            );
            out[i].end_ms = midpoint;
            out[i + 1].start_ms = midpoint;
        }
    }

    out
}

/// Reassign every word's `sentence_index` from the normalized sentence spans
/// by midpoint containment. Words outside all spans fall to the first/last
/// sentence at the extremes, otherwise to the nearest boundary; a word that
/// still cannot be placed goes to sentence 0 and is counted as forced.
pub fn assign_sentences(words: &[Word], sentences: &[Sentence]) -> (Vec<Word>, CoverageReport) {
    let mut out = words.to_vec();
    let mut report = CoverageReport::default();

    if sentences.is_empty() {
        if !out.is_empty() {
            warn!("No sentences to assign; forcing {} words to index 0", out.len());
            report.forced = out.len();
            for word in &mut out {
                word.sentence_index = 0;
            }
        }
        return (out, report);
    }

    for word in &mut out {
        let midpoint = (word.start_ms + word.end_ms) / 2;

        // Not a hot path; sentence spans are contiguous and ordered
        if let Some(index) = sentences
            .iter()
            .position(|s| s.start_ms <= midpoint && midpoint <= s.end_ms)
        {
            word.sentence_index = index;
            continue;
        }

        report.out_of_span += 1;
        let index = if midpoint < sentences[0].start_ms {
            0
        } else if midpoint > sentences[sentences.len() - 1].end_ms {
            sentences.len() - 1
        } else {
            nearest_sentence(sentences, midpoint)
        };
        warn!(
            "Word '{}' at {}ms outside all sentence spans, assigned to sentence {}",
            word.text, word.start_ms, index
        );
        word.sentence_index = index;
    }

    if report.out_of_span > 0 {
        info!(
            "Coverage assignment: {} words fell outside sentence spans",
            report.out_of_span
        );
    }
    (out, report)
}

/// Sentence whose boundary lies closest to the midpoint
fn nearest_sentence(sentences: &[Sentence], midpoint: u64) -> usize {
    let mut nearest = 0;
    let mut min_distance = u64::MAX;
    for (i, sentence) in sentences.iter().enumerate() {
        let distance = sentence
            .start_ms
            .abs_diff(midpoint)
            .min(sentence.end_ms.abs_diff(midpoint));
        if distance < min_distance {
            min_distance = distance;
            nearest = i;
        }
    }
    nearest
}

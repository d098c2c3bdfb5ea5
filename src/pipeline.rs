// WHY: Single entry point that runs the six stages in order. Each stage is
// pure over its inputs; this module owns the wiring and the config.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alignment::{self, AlignmentTrace};
use crate::document::{self, ContentDocument, LookupTableFile};
use crate::lookup::{self, DEFAULT_LOOKUP_INTERVAL_MS};
use crate::segmenter::SentenceSegmenter;
use crate::structure::StructureDetector;
use crate::timeline::{self, DEFAULT_GAP_THRESHOLD_MS};

/// Pipeline tuning knobs, deserializable from a JSON config file. Every
/// field is optional in the file; absent fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Structure-aware segmentation; `false` selects the punctuation-only
    /// fallback
    pub use_enhanced_detection: bool,
    /// Inter-word gaps at or above this split at the midpoint
    pub gap_threshold_ms: u64,
    /// Sampling interval for the lookup table
    pub lookup_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_enhanced_detection: true,
            gap_threshold_ms: DEFAULT_GAP_THRESHOLD_MS,
            lookup_interval_ms: DEFAULT_LOOKUP_INTERVAL_MS,
        }
    }
}

/// Both pipeline outputs, ready to persist as separate files
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub content: ContentDocument,
    pub lookup: LookupTableFile,
}

/// Run the full pipeline over a character-level timing trace. `reference`
/// is the original text as sent to synthesis, used only for paragraph
/// structure in the output document.
pub fn process_alignment(
    trace: &AlignmentTrace,
    reference: Option<&str>,
    config: &PipelineConfig,
) -> Result<ProcessedDocument> {
    if config.lookup_interval_ms == 0 {
        bail!("lookup_interval_ms must be positive");
    }

    let aligned = alignment::align(trace)?;
    info!(
        "Aligned {} words over {}ms",
        aligned.words.len(),
        aligned.total_duration_ms
    );

    let segmenter = SentenceSegmenter::new()?;
    let (words, sentences) = if config.use_enhanced_detection {
        let detector = StructureDetector::new()?;
        let structures = detector.detect(&aligned.text);
        segmenter.segment(&aligned.words, &aligned.text, &structures)
    } else {
        debug!("Enhanced detection disabled, using punctuation-only segmentation");
        segmenter.segment_simple(&aligned.words, &aligned.text)
    };

    let (words, gap_report) = timeline::normalize_words(&words, config.gap_threshold_ms);
    let sentences = timeline::normalize_sentences(&sentences, &words);
    let (words, coverage_report) = timeline::assign_sentences(&words, &sentences);
    debug!(
        "Timeline normalized: {:?}, coverage: {:?}",
        gap_report, coverage_report
    );

    let table = lookup::build_lookup_table(&words, aligned.total_duration_ms, config.lookup_interval_ms);
    let lookup_file = LookupTableFile::from(&table);

    let content = document::assemble(
        &aligned.text,
        words,
        sentences,
        aligned.total_duration_ms,
        reference,
    );

    Ok(ProcessedDocument {
        content,
        lookup: lookup_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(text: &str, ms_per_char: f64) -> AlignmentTrace {
        let characters: Vec<char> = text.chars().collect();
        let start_times: Vec<f64> = (0..characters.len())
            .map(|i| i as f64 * ms_per_char / 1000.0)
            .collect();
        let end_times: Vec<f64> = (1..=characters.len())
            .map(|i| i as f64 * ms_per_char / 1000.0)
            .collect();
        AlignmentTrace {
            characters,
            start_times,
            end_times,
        }
    }

    #[test]
    fn test_end_to_end_two_sentences() {
        let trace = trace("The test. Works.", 100.0);
        let doc = process_alignment(&trace, None, &PipelineConfig::default()).unwrap();

        assert_eq!(doc.content.timing.words.len(), 3);
        assert_eq!(doc.content.timing.sentences.len(), 2);
        assert_eq!(doc.content.timing.total_duration_ms, 1600);
        assert_eq!(doc.content.display_text, "The test. Works.");
        assert_eq!(doc.lookup.lookup.len(), 161);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PipelineConfig {
            lookup_interval_ms: 0,
            ..PipelineConfig::default()
        };
        let result = process_alignment(&trace("Hi.", 100.0), None, &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert!(config.use_enhanced_detection);
        assert_eq!(config.gap_threshold_ms, 500);
        assert_eq!(config.lookup_interval_ms, 10);
    }

    #[test]
    fn test_simple_mode_still_produces_document() {
        let config = PipelineConfig {
            use_enhanced_detection: false,
            ..PipelineConfig::default()
        };
        let doc = process_alignment(&trace("One. Two.", 100.0), None, &config).unwrap();
        assert_eq!(doc.content.timing.sentences.len(), 2);
    }

    #[test]
    fn test_reference_text_shapes_paragraphs() {
        let reference = "The test.\n\nWorks.";
        let doc = process_alignment(
            &trace("The test. Works.", 100.0),
            Some(reference),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(doc.content.paragraphs, vec!["The test.", "Works."]);
        assert_eq!(doc.content.display_text, "The test.\n\nWorks.");
    }
}

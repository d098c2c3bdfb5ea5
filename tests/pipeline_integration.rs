// End-to-end pipeline tests: alignment JSON in, content document and lookup
// table out.

use cueline::pipeline::{process_alignment, PipelineConfig};
use cueline::{AlignmentFile, AlignmentTrace};

/// The two-sentence scenario used throughout: per-character timings for
/// "The test. Works." at a uniform 100ms per character, with a 200ms pause
/// before "Works."
fn two_sentence_trace() -> AlignmentTrace {
    let characters: Vec<char> = "The test. Works.".chars().collect();
    let start_times = vec![
        0.0, 0.1, 0.2, 0.3, 0.35, 0.45, 0.55, 0.65, 0.75, 0.8, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5,
    ];
    let end_times = vec![
        0.1, 0.2, 0.3, 0.35, 0.45, 0.55, 0.65, 0.75, 0.8, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6,
    ];
    AlignmentTrace {
        characters,
        start_times,
        end_times,
    }
}

#[test]
fn two_sentence_document() {
    let doc = process_alignment(&two_sentence_trace(), None, &PipelineConfig::default()).unwrap();

    let words = &doc.content.timing.words;
    assert_eq!(words.len(), 3);
    assert_eq!(words[0].text, "The");
    assert_eq!(words[1].text, "test.");
    assert_eq!(words[2].text, "Works.");

    let sentences = &doc.content.timing.sentences;
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].text, "The test.");
    assert_eq!(sentences[1].text, "Works.");

    assert_eq!(words[0].sentence_index, 0);
    assert_eq!(words[1].sentence_index, 0);
    assert_eq!(words[2].sentence_index, 1);

    assert_eq!(doc.content.timing.total_duration_ms, 1600);
    assert_eq!(doc.content.metadata.word_count, 3);
    assert_eq!(doc.content.metadata.estimated_reading_time, "1 minutes");
}

#[test]
fn gaps_are_closed_in_output() {
    let doc = process_alignment(&two_sentence_trace(), None, &PipelineConfig::default()).unwrap();

    let words = &doc.content.timing.words;
    for pair in words.windows(2) {
        assert_eq!(
            pair[0].end_ms, pair[1].start_ms,
            "adjacent words must be contiguous"
        );
    }

    let sentences = &doc.content.timing.sentences;
    for pair in sentences.windows(2) {
        assert_eq!(pair[0].end_ms, pair[1].start_ms);
    }
}

#[test]
fn lookup_table_resolves_positions() {
    let doc = process_alignment(&two_sentence_trace(), None, &PipelineConfig::default()).unwrap();

    assert_eq!(doc.lookup.interval_ms, 10);
    assert_eq!(doc.lookup.total_duration_ms, 1600);
    assert_eq!(doc.lookup.lookup.len(), 161);

    // 250ms is inside "The" (sentence 0); 1200ms inside "Works." (sentence 1)
    assert_eq!(doc.lookup.lookup[25], (Some(0), Some(0)));
    assert_eq!(doc.lookup.lookup[120], (Some(2), Some(1)));
}

#[test]
fn alignment_json_round_trip() {
    let raw = r#"{
        "alignment": {
            "characters": ["H", "i", "."],
            "character_start_times_seconds": [0.0, 0.1, 0.2],
            "character_end_times_seconds": [0.1, 0.2, 0.3]
        }
    }"#;
    let file: AlignmentFile = serde_json::from_str(raw).unwrap();
    let doc = process_alignment(&file.alignment, None, &PipelineConfig::default()).unwrap();

    assert_eq!(doc.content.timing.words.len(), 1);
    assert_eq!(doc.content.timing.words[0].text, "Hi.");
    assert_eq!(doc.content.timing.total_duration_ms, 300);
}

#[tokio::test]
async fn alignment_file_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.json");
    let raw = r#"{
        "alignment": {
            "characters": ["O", "k", "."],
            "character_start_times_seconds": [0.0, 0.05, 0.1],
            "character_end_times_seconds": [0.05, 0.1, 0.15]
        }
    }"#;
    tokio::fs::write(&path, raw).await.unwrap();

    let read_back = tokio::fs::read_to_string(&path).await.unwrap();
    let file: AlignmentFile = serde_json::from_str(&read_back).unwrap();
    let doc = process_alignment(&file.alignment, None, &PipelineConfig::default()).unwrap();
    assert_eq!(doc.content.display_text, "Ok.");
}

#[test]
fn mismatched_arrays_fail_with_context() {
    let trace = AlignmentTrace {
        characters: vec!['a', 'b'],
        start_times: vec![0.0],
        end_times: vec![0.1],
    };
    let error = process_alignment(&trace, None, &PipelineConfig::default()).unwrap_err();
    assert!(error.to_string().contains("alignment arrays"));
}

#[test]
fn content_document_serializes_expected_shape() {
    let doc = process_alignment(&two_sentence_trace(), None, &PipelineConfig::default()).unwrap();
    let json = serde_json::to_value(&doc.content).unwrap();

    assert_eq!(json["version"], "1.0");
    assert_eq!(json["source"], "character-alignment");
    assert!(json["paragraphs"].is_array());
    assert!(json["formatting"]["paragraph_spacing"].as_bool().unwrap());
    assert_eq!(json["timing"]["sentences"][0]["break_reason"], "period");
    assert_eq!(json["metadata"]["language"], "en");
}

#[test]
fn lookup_file_serializes_null_sentinel() {
    let doc = process_alignment(&two_sentence_trace(), None, &PipelineConfig::default()).unwrap();
    let json = serde_json::to_value(&doc.lookup).unwrap();

    // The final sample sits at exactly total duration, past the last word's
    // half-open span
    let last = json["lookup"].as_array().unwrap().last().unwrap().clone();
    assert!(last[0].is_null());
    assert!(last[1].is_null());
}

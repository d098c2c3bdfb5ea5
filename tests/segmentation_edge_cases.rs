// Segmentation edge cases run through the whole pipeline, so the assertions
// hold on the final document rather than on the segmenter in isolation.

use cueline::pipeline::{process_alignment, PipelineConfig};
use cueline::AlignmentTrace;

fn uniform_trace(text: &str) -> AlignmentTrace {
    let characters: Vec<char> = text.chars().collect();
    let start_times: Vec<f64> = (0..characters.len()).map(|i| i as f64 * 0.1).collect();
    let end_times: Vec<f64> = (1..=characters.len()).map(|i| i as f64 * 0.1).collect();
    AlignmentTrace {
        characters,
        start_times,
        end_times,
    }
}

fn sentence_texts(text: &str) -> Vec<String> {
    let doc = process_alignment(&uniform_trace(text), None, &PipelineConfig::default()).unwrap();
    doc.content
        .timing
        .sentences
        .iter()
        .map(|s| s.text.clone())
        .collect()
}

#[test]
fn title_abbreviations_do_not_split() {
    let sentences = sentence_texts("Dr. Smith met Prof. Jones. They talked.");
    assert_eq!(sentences, vec!["Dr. Smith met Prof. Jones.", "They talked."]);
}

#[test]
fn country_abbreviation_does_not_split() {
    let sentences = sentence_texts("She moved to the U.S.A. Later she returned.");
    assert_eq!(sentences.len(), 1, "single-capital heuristic keeps 'A.' attached: {sentences:?}");
}

#[test]
fn degree_abbreviation_mid_sentence() {
    let sentences = sentence_texts("He holds a Ph.D. in physics. Impressive.");
    assert_eq!(
        sentences,
        vec!["He holds a Ph.D. in physics.", "Impressive."]
    );
}

#[test]
fn ordinary_period_words_do_split() {
    let sentences = sentence_texts("That was random. This is the end.");
    assert_eq!(sentences, vec!["That was random.", "This is the end."]);
}

#[test]
fn colon_introduced_list_items_become_sentences() {
    let sentences = sentence_texts("Examples include:\nTelematics\nWearables");
    assert_eq!(
        sentences,
        vec!["Examples include:", "Telematics", "Wearables"]
    );
}

#[test]
fn ratio_and_time_colons_never_split() {
    assert_eq!(sentence_texts("The odds were 3:1 against us.").len(), 1);
    assert_eq!(sentence_texts("We met at 5:30 in the lobby.").len(), 1);
}

#[test]
fn semicolon_splits_outside_quotes_only() {
    assert_eq!(
        sentence_texts("First clause; second clause."),
        vec!["First clause;", "second clause."]
    );
    assert_eq!(
        sentence_texts("He said \"wait; listen\" and left.").len(),
        1
    );
}

#[test]
fn repeated_terminal_punctuation_is_one_unit() {
    let sentences = sentence_texts("Really?! That cannot be true.");
    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0], "Really?! That cannot be true.");
}

#[test]
fn text_without_punctuation_is_one_sentence() {
    let sentences = sentence_texts("just a stream of words with no ending");
    assert_eq!(sentences.len(), 1);
}

#[test]
fn numbered_list_items_force_breaks() {
    let sentences = sentence_texts("Steps:\n1. Mix well\n2. Bake slowly");
    assert!(
        sentences.len() >= 3,
        "numbered items should each end a sentence: {sentences:?}"
    );
}

#[test]
fn simple_mode_ignores_structure() {
    let config = PipelineConfig {
        use_enhanced_detection: false,
        ..PipelineConfig::default()
    };
    let doc = process_alignment(
        &uniform_trace("Examples include:\nTelematics\nWearables"),
        None,
        &config,
    )
    .unwrap();
    // Punctuation-only mode sees no terminal punctuation until end of text
    assert_eq!(doc.content.timing.sentences.len(), 1);
}

#[test]
fn sentence_text_matches_source_slices() {
    let text = "One here. Two there. Three everywhere.";
    let doc = process_alignment(&uniform_trace(text), None, &PipelineConfig::default()).unwrap();
    for sentence in &doc.content.timing.sentences {
        assert_eq!(
            sentence.text,
            text[sentence.char_start..sentence.char_end].trim()
        );
    }
}

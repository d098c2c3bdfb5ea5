// WHY: Stage 2 - locates structural spans (lists, quotes, equations, URLs,
// headers) in the reconstructed text; the segmenter resolves overlaps by
// positional lookup, so nothing is merged or deduplicated here

use anyhow::Result;
use regex_automata::meta::Regex;
use serde::Serialize;
use tracing::{debug, info};

pub mod patterns;

/// Kinds of special text structure that influence segmentation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    ColonList,
    NumberedList,
    BulletedList,
    LetteredList,
    Quotation,
    Dialog,
    Equation,
    CodeBlock,
    Header,
    Url,
    Email,
    Abbreviation,
}

impl StructureKind {
    pub fn tag(&self) -> &'static str {
        match self {
            StructureKind::ColonList => "colon_list",
            StructureKind::NumberedList => "numbered_list",
            StructureKind::BulletedList => "bulleted_list",
            StructureKind::LetteredList => "lettered_list",
            StructureKind::Quotation => "quotation",
            StructureKind::Dialog => "dialog",
            StructureKind::Equation => "equation",
            StructureKind::CodeBlock => "code_block",
            StructureKind::Header => "header",
            StructureKind::Url => "url",
            StructureKind::Email => "email",
            StructureKind::Abbreviation => "abbreviation",
        }
    }

    /// List-type structures force sentence breaks at their end positions
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            StructureKind::ColonList
                | StructureKind::NumberedList
                | StructureKind::BulletedList
                | StructureKind::LetteredList
        )
    }
}

/// A detected structure: byte range into the reconstructed text, half-open
#[derive(Debug, Clone, Serialize)]
pub struct TextStructure {
    pub kind: StructureKind,
    pub start: usize,
    pub end: usize,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl TextStructure {
    fn new(kind: StructureKind, start: usize, end: usize, content: &str) -> Self {
        Self {
            kind,
            start,
            end,
            content: content.to_string(),
            speaker: None,
        }
    }
}

/// Pattern-driven structure detector; all patterns compile once at construction
pub struct StructureDetector {
    scan_rules: Vec<(StructureKind, Regex)>,
    dialog: Regex,
    numbered_item: Regex,
    lettered_item: Regex,
    bulleted_item: Regex,
}

impl StructureDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scan_rules: patterns::compile_scan_rules()?,
            dialog: Regex::new(patterns::DIALOG_PATTERN)?,
            numbered_item: Regex::new(patterns::NUMBERED_ITEM_PATTERN)?,
            lettered_item: Regex::new(patterns::LETTERED_ITEM_PATTERN)?,
            bulleted_item: Regex::new(patterns::BULLETED_ITEM_PATTERN)?,
        })
    }

    /// Detect all structures in the text, sorted by start position.
    /// Contributions from the sub-detectors are independent; overlapping
    /// spans are left as-is for the segmenter's positional lookup.
    pub fn detect(&self, text: &str) -> Vec<TextStructure> {
        let mut structures = self.detect_lists(text);
        structures.extend(self.detect_quotations(text));
        structures.extend(self.detect_dialog(text));
        structures.extend(self.detect_scan_rules(text));

        structures.sort_by_key(|s| (s.start, s.end));
        info!("Detected {} text structures", structures.len());
        structures
    }

    /// Line-based list detection. A colon-introduced list starts on the line
    /// after one ending with ':' and extends over consecutive item-shaped
    /// lines (uppercase/digit start, no trailing period), so every item ends
    /// a list structure and forces a sentence break.
    fn detect_lists(&self, text: &str) -> Vec<TextStructure> {
        let mut structures = Vec::new();
        let mut line_start = 0usize;
        let mut prev_ends_colon = false;
        let mut in_colon_list = false;

        for line in text.split('\n') {
            let line_end = line_start + line.len();

            let item_shaped = line
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
                && !line.ends_with('.');

            if (prev_ends_colon || in_colon_list) && item_shaped {
                structures.push(TextStructure::new(
                    StructureKind::ColonList,
                    line_start,
                    line_end,
                    line,
                ));
                in_colon_list = true;
            } else {
                in_colon_list = false;
            }

            if self.numbered_item.is_match(line) {
                structures.push(TextStructure::new(
                    StructureKind::NumberedList,
                    line_start,
                    line_end,
                    line,
                ));
            }
            if self.lettered_item.is_match(line) {
                structures.push(TextStructure::new(
                    StructureKind::LetteredList,
                    line_start,
                    line_end,
                    line,
                ));
            }
            if self.bulleted_item.is_match(line) {
                structures.push(TextStructure::new(
                    StructureKind::BulletedList,
                    line_start,
                    line_end,
                    line,
                ));
            }

            prev_ends_colon = line.ends_with(':');
            line_start = line_end + 1;
        }

        debug!("List detection found {} structures", structures.len());
        structures
    }

    /// Quote pairing by stack discipline: a quote character closes the span
    /// when it matches the open quote on top of the stack, otherwise it opens
    /// a new one. Straight quotes close themselves; curly quotes pair up.
    fn detect_quotations(&self, text: &str) -> Vec<TextStructure> {
        fn closes(open: char, ch: char) -> bool {
            matches!(
                (open, ch),
                ('"', '"')
                    | ('\'', '\'')
                    | ('\u{201C}', '\u{201D}')
                    | ('\u{2018}', '\u{2019}')
            )
        }

        let mut structures = Vec::new();
        let mut stack: Vec<(char, usize)> = Vec::new();

        for (pos, ch) in text.char_indices() {
            if !matches!(
                ch,
                '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}'
            ) {
                continue;
            }
            // Search downward for the matching open quote; unmatched marks
            // above it (stray apostrophes) are discarded with it
            match stack.iter().rposition(|&(open, _)| closes(open, ch)) {
                Some(idx) => {
                    let (_, start) = stack[idx];
                    stack.truncate(idx);
                    let end = pos + ch.len_utf8();
                    structures.push(TextStructure::new(
                        StructureKind::Quotation,
                        start,
                        end,
                        &text[start..end],
                    ));
                }
                None => stack.push((ch, pos)),
            }
        }

        structures
    }

    /// `Name:` immediately followed by an opening quote marks dialog; the
    /// speaker name is carried as metadata
    fn detect_dialog(&self, text: &str) -> Vec<TextStructure> {
        let mut structures = Vec::new();
        for caps in self.dialog.captures_iter(text) {
            let (Some(m), Some(speaker)) = (caps.get_match(), caps.get_group(1)) else {
                continue;
            };
            let mut structure = TextStructure::new(
                StructureKind::Dialog,
                m.start(),
                m.end(),
                &text[m.start()..m.end()],
            );
            structure.speaker = Some(text[speaker.start..speaker.end].to_string());
            structures.push(structure);
        }
        structures
    }

    /// Apply the whole-text rule table (equations, URLs, emails, headers)
    fn detect_scan_rules(&self, text: &str) -> Vec<TextStructure> {
        let mut structures = Vec::new();
        for (kind, regex) in &self.scan_rules {
            for m in regex.find_iter(text) {
                structures.push(TextStructure::new(
                    *kind,
                    m.start(),
                    m.end(),
                    &text[m.start()..m.end()],
                ));
            }
        }
        structures
    }
}

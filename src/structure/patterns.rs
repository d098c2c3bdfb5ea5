// WHY: Single data-driven rule table for whole-text structure scans so the
// rule set is testable and extensible without touching detector control flow

use anyhow::Result;
use regex_automata::meta::Regex;

use super::StructureKind;

/// Whole-text scan rules: each pattern's matches become structures of the
/// paired kind. Dialog is handled separately because it captures the speaker.
pub const SCAN_RULES: &[(StructureKind, &str)] = &[
    // digit operator digit, e.g. "2 + 2" or "10<20"
    (StructureKind::Equation, r"\b[0-9]+\s*[+\-*/=<>≤≥≠]\s*[0-9]+"),
    // formula form: single capital assigned a clause, e.g. "E = mc squared"
    (StructureKind::Equation, r"[A-Z]\s*=\s*[^.!?]+"),
    (StructureKind::Url, r"https?://[^\s]+|www\.[^\s]+"),
    (
        StructureKind::Email,
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    ),
    (
        StructureKind::Header,
        r"(?mi)^(?:Chapter|Section|Part)\s+[0-9]+[:.]\s*",
    ),
    (
        StructureKind::Header,
        r"(?mi)^(?:Figure|Table|Chart|Graph)\s+[0-9]+[:.]\s*",
    ),
];

/// Dialog marker anchored at line start; group 1 is the speaker name
pub const DIALOG_PATTERN: &str = "(?m)^([A-Z][a-z]+):\\s*[\"'\u{201C}\u{2018}]";

/// Line-anchored list item markers (matched against individual lines)
pub const NUMBERED_ITEM_PATTERN: &str = r"^[0-9]+[.)] ";
pub const LETTERED_ITEM_PATTERN: &str = r"^(?i)[a-z][.)] ";
pub const BULLETED_ITEM_PATTERN: &str = "^[\u{2022}\u{00B7}\u{25AA}\u{25AB}\u{25E6}\u{2023}\u{2043}\\-*+] ";

/// Compile the whole-text scan table
pub fn compile_scan_rules() -> Result<Vec<(StructureKind, Regex)>> {
    SCAN_RULES
        .iter()
        .map(|&(kind, pattern)| Ok((kind, Regex::new(pattern)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        let compiled = compile_scan_rules().unwrap();
        assert_eq!(compiled.len(), SCAN_RULES.len());
        for pattern in [
            DIALOG_PATTERN,
            NUMBERED_ITEM_PATTERN,
            LETTERED_ITEM_PATTERN,
            BULLETED_ITEM_PATTERN,
        ] {
            assert!(Regex::new(pattern).is_ok(), "pattern failed: {pattern}");
        }
    }

    #[test]
    fn test_equation_rule_matches() {
        let re = Regex::new(SCAN_RULES[0].1).unwrap();
        assert!(re.is_match("we know 2 + 2 = 4 here"));
        assert!(re.is_match("ratio 3<4"));
        assert!(!re.is_match("no math in this prose"));
    }

    #[test]
    fn test_header_rule_is_line_anchored() {
        let re = Regex::new(SCAN_RULES[4].1).unwrap();
        assert!(re.is_match("Chapter 3: Risk"));
        assert!(re.is_match("intro\nSection 12. Details"));
        assert!(!re.is_match("see chapter 3 for details"));
    }
}

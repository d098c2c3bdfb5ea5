// WHY: Centralized abbreviation handling so a trailing period on "Dr." or
// "U.S.A." never splits a sentence mid-name

use std::collections::HashSet;

/// Titles preceding proper nouns, e.g. "Dr. Smith"
pub const TITLES: &[&str] = &[
    "Dr", "Mr", "Mrs", "Ms", "Prof", "Sr", "Jr", "Rev", "Gen", "Col", "Maj", "Capt", "Lt", "Sgt",
];

/// Month abbreviations ("May" needs no period and is omitted)
pub const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
];

/// Common Latin, business, and academic abbreviations
pub const COMMON: &[&str] = &[
    "etc", "vs", "eg", "ie", "cf", "al", "Inc", "Corp", "Ltd", "Co", "LLC", "Ph.D", "M.D", "B.A",
    "M.A", "B.S", "M.S",
];

/// Time-of-day markers
pub const TIME_MARKERS: &[&str] = &["a.m", "p.m", "A.M", "P.M"];

/// Street/location abbreviations
pub const LOCATIONS: &[&str] = &["St", "Ave", "Rd", "Blvd", "Dr", "Ct", "Ln", "Pkwy"];

/// Measurement units
pub const UNITS: &[&str] = &[
    "ft", "in", "yd", "mi", "km", "cm", "mm", "m", "kg", "g", "lb", "oz",
];

/// Country abbreviations written with interior periods
pub const COUNTRIES: &[&str] = &["U.S", "U.K", "U.S.A"];

/// Organization acronyms
pub const ORGANIZATIONS: &[&str] = &["NATO", "UN", "EU", "WHO", "FBI", "CIA", "NASA", "IRS"];

/// Flattened O(1) lookup over all abbreviation categories
pub struct AbbreviationChecker {
    all: HashSet<&'static str>,
}

impl AbbreviationChecker {
    pub fn new() -> Self {
        let all = [
            TITLES,
            MONTHS,
            COMMON,
            TIME_MARKERS,
            LOCATIONS,
            UNITS,
            COUNTRIES,
            ORGANIZATIONS,
        ]
        .iter()
        .flat_map(|category| category.iter().copied())
        .collect();
        Self { all }
    }

    /// Decide whether a period-terminated word is an abbreviation rather than
    /// a sentence end. A word qualifies if, with its trailing period removed,
    /// it is in the table, matches the multi-initial shape ("U.S.A."), the
    /// next word starts lowercase, or it is a single capital initial.
    pub fn is_abbreviation(&self, word: &str, next_word: Option<&str>) -> bool {
        let Some(stripped) = word.strip_suffix('.') else {
            return false;
        };

        if self.all.contains(stripped) {
            return true;
        }

        if is_multi_initial(stripped) {
            return true;
        }

        // Lowercase continuation means the period did not end the sentence
        if next_word
            .and_then(|w| w.chars().next())
            .is_some_and(|c| c.is_lowercase())
        {
            return true;
        }

        // Single capital initial, e.g. the "B." in "George B. Smith"
        let mut chars = stripped.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-initial shape: an uppercase letter followed by one or more
/// period-uppercase pairs, matched against the word minus its final period
/// ("U.S.A." arrives here as "U.S.A")
fn is_multi_initial(stripped: &str) -> bool {
    let mut chars = stripped.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let mut saw_pair = false;
    loop {
        match chars.next() {
            None => return saw_pair,
            Some('.') => match chars.next() {
                Some(c) if c.is_ascii_uppercase() => saw_pair = true,
                _ => return false,
            },
            Some(_) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    // WHY: Single shared checker instance reduces test overhead
    static SHARED_CHECKER: OnceLock<AbbreviationChecker> = OnceLock::new();

    fn checker() -> &'static AbbreviationChecker {
        SHARED_CHECKER.get_or_init(AbbreviationChecker::new)
    }

    #[test]
    fn test_table_abbreviations() {
        for word in ["Dr.", "Inc.", "U.S.A.", "Ph.D.", "etc.", "p.m.", "Sgt."] {
            assert!(
                checker().is_abbreviation(word, None),
                "{word} should be an abbreviation"
            );
        }
    }

    #[test]
    fn test_ordinary_words_are_not_abbreviations() {
        for word in ["random.", "end.", "insurance.", "Works."] {
            assert!(
                !checker().is_abbreviation(word, None),
                "{word} should not be an abbreviation"
            );
        }
    }

    #[test]
    fn test_requires_trailing_period() {
        assert!(!checker().is_abbreviation("Dr", None));
        assert!(!checker().is_abbreviation("Dr,", None));
    }

    #[test]
    fn test_multi_initial_pattern() {
        assert!(checker().is_abbreviation("N.Y.C.", None));
        assert!(!checker().is_abbreviation("N..C.", None));
        assert!(!checker().is_abbreviation("n.y.", None));
    }

    #[test]
    fn test_lowercase_continuation() {
        assert!(checker().is_abbreviation("approx.", Some("three")));
        assert!(!checker().is_abbreviation("approx.", Some("Three")));
    }

    #[test]
    fn test_single_capital_initial() {
        assert!(checker().is_abbreviation("B.", Some("Smith")));
        assert!(!checker().is_abbreviation("b.", Some("Smith")));
    }
}

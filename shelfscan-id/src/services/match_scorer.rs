//! Author/title similarity scoring
//!
//! Scores are integers in 0..=100. A catalogue hit is only accepted when both
//! its author and title score at least [`CONFIDENCE`] and the pair passes
//! [`sanity_check`].

/// How good a fuzzy match needs to be
pub const CONFIDENCE: u8 = 75;

/// Similarity of two strings, 0..=100
///
/// Strings are scored by normalised Levenshtein distance
/// (`100 - 100 * distance / longest`, lengths in characters). One string
/// containing the other is a strong signal as long as the lengths are
/// comparable (ratio within 0.5..=2.0): such a pair scores 100 when equal and
/// never less than [`CONFIDENCE`] otherwise, so "murdoch" inside
/// "iris murdoch" is accepted while "murdoc" vs "murdoch" keeps its higher
/// edit-distance score of 86.
pub fn compare(a: &str, b: &str) -> u8 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);

    if longest == 0 {
        return 100;
    }

    let distance = strsim::levenshtein(a, b).min(longest);
    let edit_score = (100 - 100 * distance / longest) as u8;

    let contained = a.contains(b) || b.contains(a);
    let ratio_ok = len_a * 2 >= len_b && len_b * 2 >= len_a;

    if contained && ratio_ok {
        if len_a == len_b {
            return 100;
        }
        return edit_score.max(CONFIDENCE);
    }

    edit_score
}

/// Reject author/title pairs where one is part of the other
///
/// Autobiographies aside, such matches are nearly always junk.
pub fn sanity_check(author: &str, title: &str) -> bool {
    !(author.contains(title) || title.contains(author))
}

/// Acceptance rule for one scored catalogue hit
pub fn is_confident(author_score: u8, title_score: u8) -> bool {
    author_score >= CONFIDENCE && title_score >= CONFIDENCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_identical() {
        assert_eq!(compare("murdoch", "murdoch"), 100);
        assert_eq!(compare("a", "a"), 100);
        assert_eq!(compare("walter scott", "walter scott"), 100);
    }

    #[test]
    fn test_compare_single_edit() {
        // 100 - 100 * 1 / 7
        assert_eq!(compare("murdoch", "murdoc"), 86);
        assert_eq!(compare("murdoch", "murdock"), 86);
    }

    #[test]
    fn test_compare_containment_length_ratio() {
        // Edit distance alone would give 59
        assert_eq!(compare("murdoch", "iris murdoch"), CONFIDENCE);
        assert!(compare("orwell", "george orwell") < CONFIDENCE);
        // Too different in length to count as containment
        assert!(compare("ab", "abcdefgh") < CONFIDENCE);
    }

    #[test]
    fn test_compare_unrelated() {
        assert!(compare("talisman", "animal farm") < CONFIDENCE);
        assert_eq!(compare("abc", "xyz"), 0);
    }

    #[test]
    fn test_compare_symmetric() {
        let pairs = [
            ("murdoch", "murdoc"),
            ("walter scott", "water scot"),
            ("ab", "abcdefgh"),
            ("", "something"),
            ("talisman", "talismen"),
        ];
        for (a, b) in pairs {
            assert_eq!(compare(a, b), compare(b, a), "asymmetric for {:?}/{:?}", a, b);
        }
    }

    #[test]
    fn test_sanity_check() {
        assert!(sanity_check("walter scott", "talisman"));
        assert!(!sanity_check("iris murdoch", "murdoch"));
        assert!(!sanity_check("orwell", "orwell"));
    }

    #[test]
    fn test_is_confident() {
        assert!(is_confident(75, 100));
        assert!(!is_confident(74, 100));
        assert!(!is_confident(100, 60));
    }
}

//! Display-name content filter
//!
//! Pure functions only: the same input always gives the same verdict, with
//! no state carried between calls.

/// Multi-character look-alikes, replaced before single characters
const MULTI_CHAR_SUBSTITUTIONS: [(&str, &str); 2] = [("|<", "k"), ("|{", "k")];

/// Digits and symbols commonly used in place of letters
const CHAR_SUBSTITUTIONS: [(char, char); 14] = [
    ('0', 'o'),
    ('1', 'i'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('7', 't'),
    ('8', 'b'),
    ('9', 'g'),
    ('@', 'a'),
    ('$', 's'),
    ('!', 'i'),
    ('€', 'e'),
    ('(', 'c'),
    ('+', 't'),
];

/// Terms that may not appear anywhere in a normalized name
const DISALLOWED_TERMS: [&str; 33] = [
    "nigger", "nigga", "nig", "negro",
    "fuck", "fuk", "fck", "fuc",
    "shit", "sht", "shyt",
    "bitch", "btch", "bich",
    "asshole", "ass", "arsehole",
    "cunt", "cnt",
    "dick", "dik", "cock",
    "pussy", "puss",
    "whore", "hore", "slut",
    "fag", "faggot",
    "retard", "retrd",
    "twat", "wank",
];

/// Lowercase and undo look-alike substitutions, keeping non-letters
fn substitute(name: &str) -> String {
    let mut text = name.to_lowercase();
    for (from, to) in MULTI_CHAR_SUBSTITUTIONS {
        text = text.replace(from, to);
    }
    text.chars()
        .map(|c| {
            CHAR_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

fn letters_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_lowercase()).collect()
}

/// Canonical form checked against the disallowed list
pub fn normalize(name: &str) -> String {
    letters_only(&substitute(name))
}

/// Second reading where the first `a` stands for a `u` ("f4ck" -> "fuck")
pub fn alternate_normalization(name: &str) -> String {
    normalize(name).replacen('a', "u", 1)
}

/// Whether a name may be stored and echoed back
pub fn is_name_acceptable(name: &str) -> bool {
    let primary = normalize(name);
    if primary.is_empty() {
        return false;
    }
    let alternate = alternate_normalization(name);

    !DISALLOWED_TERMS
        .iter()
        .any(|term| primary.contains(term) || alternate.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_leetspeak() {
        assert_eq!(normalize("B0b"), "bob");
        assert_eq!(normalize("J@n3"), "jane");
        assert_eq!(normalize("|<ate"), "kate");
        assert_eq!(normalize("Mary-Jo 2"), "maryjo");
    }

    #[test]
    fn test_rejects_disallowed_and_variants() {
        assert!(!is_name_acceptable("fuck"));
        assert!(!is_name_acceptable("fu(k"));
        assert!(!is_name_acceptable("FUCK"));
        assert!(!is_name_acceptable("f.u.c.k"));
        assert!(!is_name_acceptable("sh1t"));
        assert!(!is_name_acceptable("$hit"));
        assert!(!is_name_acceptable("f4ck"));
    }

    #[test]
    fn test_accepts_ordinary_names() {
        assert!(is_name_acceptable("Phillippi"));
        assert!(is_name_acceptable("Marcus"));
        assert!(is_name_acceptable("Elena"));
        assert!(is_name_acceptable("Ana María"));
    }

    #[test]
    fn test_empty_or_symbol_only_rejected() {
        assert!(!is_name_acceptable(""));
        assert!(!is_name_acceptable("   "));
        assert!(!is_name_acceptable("%%%"));
    }

    #[test]
    fn test_pure_function() {
        for _ in 0..3 {
            assert!(is_name_acceptable("Phillippi"));
            assert!(!is_name_acceptable("fu(k"));
        }
    }
}

//! Suggestion utilities for helpful error messages.
//!
//! Provides Levenshtein distance calculation for suggesting
//! corrections when users make typos in `#[props(...)]` options.

/// Calculate the Levenshtein distance between two strings.
///
/// This is the minimum number of single-character edits (insertions,
/// deletions, or substitutions) required to change one string into the other.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row instead of the full matrix
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Find the closest matching option name from a list of valid names.
///
/// Returns `Some(suggestion)` if a close match is found (distance <= 3),
/// `None` otherwise.
pub fn find_closest_option(unknown: &str, valid: &[&str]) -> Option<String> {
    valid
        .iter()
        .map(|&name| (name, levenshtein_distance(unknown, name)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(name, _)| name.to_string())
}

/// Format a helpful error message for an unknown `#[props(...)]` option.
pub fn format_unknown_option_error(unknown: &str, valid: &[&str]) -> String {
    let mut msg = format!("unknown `props` option `{}`", unknown);

    if let Some(suggestion) = find_closest_option(unknown, valid) {
        msg.push_str(&format!("\n\nDid you mean `{}`?", suggestion));
    }

    if !valid.is_empty() {
        msg.push_str("\n\nValid options are: ");
        msg.push_str(&valid.join(", "));
    }

    msg
}

/// Format an error for a field that selects two comparison modes.
pub fn format_conflicting_options_error(first: &str, second: &str) -> String {
    format!(
        "conflicting `props` options `{}` and `{}`; a field takes at most one",
        first, second
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_levenshtein_same() {
        assert_eq!(levenshtein_distance("skip", "skip"), 0);
    }

    #[test]
    fn test_levenshtein_one_char() {
        assert_eq!(levenshtein_distance("skip", "slip"), 1); // substitution
        assert_eq!(levenshtein_distance("skip", "ski"), 1); // deletion
        assert_eq!(levenshtein_distance("skip", "skipp"), 1); // insertion
    }

    #[test]
    fn test_find_closest() {
        let valid = vec!["skip", "by_value"];
        assert_eq!(find_closest_option("skp", &valid), Some("skip".into()));
        assert_eq!(find_closest_option("byvalue", &valid), Some("by_value".into()));
        assert_eq!(find_closest_option("deep_compare", &valid), None);
    }

    #[test]
    fn test_unknown_option_message_lists_valid_options() {
        let msg = format_unknown_option_error("skp", &["skip", "by_value"]);
        assert!(msg.contains("Did you mean `skip`?"));
        assert!(msg.ends_with("Valid options are: skip, by_value"));
    }
}

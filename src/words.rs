//! Word queue: free-form text → ordered list of words, plus bundled samples.

/// Starter texts shown on the setup screen (simple sentences for early readers).
pub const SAMPLE_TEXTS: [&str; 3] = [
    "Ala ma kota, a kot ma Alę. Kot lubi mleko.",
    "Wielki smok spał w jaskini. Rycerz był dzielny.",
    "Zosia poszła do lasu. Znalazła tam grzyby.",
];

/// Split free-form input into the word queue: whitespace runs collapse,
/// leading/trailing whitespace is dropped, empty tokens never appear.
/// Punctuation is kept attached to its word.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_sentence() {
        assert_eq!(split_words("Ala ma kota."), vec!["Ala", "ma", "kota."]);
    }

    #[test]
    fn test_split_collapses_whitespace_runs() {
        assert_eq!(
            split_words("  a\n\n b\t\t c  "),
            vec!["a", "b", "c"]
        );
        // Any run length normalizes the same way
        assert_eq!(split_words("a b"), split_words("a     \n  b"));
    }

    #[test]
    fn test_split_empty_and_blank() {
        assert!(split_words("").is_empty());
        assert!(split_words("   \t\n  ").is_empty());
    }

    #[test]
    fn test_split_keeps_punctuation() {
        assert_eq!(split_words("kot, pies!"), vec!["kot,", "pies!"]);
    }

    #[test]
    fn test_samples_all_non_empty() {
        for text in SAMPLE_TEXTS {
            assert!(!split_words(text).is_empty());
        }
    }
}

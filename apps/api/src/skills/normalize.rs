//! Text normalisation shared by the vocabulary, the extractor and the corpus index.
//!
//! Lowercases, treats every character other than alphanumerics and `+ # . -` as a
//! separator, then trims sentence punctuation off token edges so identifiers such as
//! `c++`, `c#`, `node.js`, `.net` and `ci-cd` survive intact.

/// Splits text into normalised tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-')))
        .filter_map(clean_token)
        .collect()
}

/// Normalised form of a phrase: its tokens joined by single spaces.
pub fn normalize_phrase(text: &str) -> String {
    tokenize(text).join(" ")
}

fn clean_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(['.', '-']).trim_start_matches('-');

    // Keep a single leading dot only when it prefixes a word (".net").
    let trimmed = match trimmed.strip_prefix('.') {
        Some(rest) if rest.starts_with(|c: char| c.is_alphanumeric()) => trimmed,
        Some(_) => trimmed.trim_start_matches(['.', '-']),
        None => trimmed,
    };

    if trimmed.chars().any(char::is_alphanumeric) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(tokenize("  Python \n\t SQL  "), vec!["python", "sql"]);
    }

    #[test]
    fn test_preserves_symbol_identifiers() {
        assert_eq!(
            tokenize("C++, C#, Node.js and .NET."),
            vec!["c++", "c#", "node.js", "and", ".net"]
        );
    }

    #[test]
    fn test_internal_hyphen_kept_edges_trimmed() {
        assert_eq!(tokenize("-ci-cd- pipelines"), vec!["ci-cd", "pipelines"]);
    }

    #[test]
    fn test_sentence_period_stripped() {
        assert_eq!(tokenize("I know rust."), vec!["i", "know", "rust"]);
    }

    #[test]
    fn test_symbol_only_tokens_dropped() {
        assert!(tokenize("... --- + # ()").is_empty());
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("  Machine   Learning "), "machine learning");
        assert_eq!(normalize_phrase(""), "");
    }
}

// Posting normalizer: raw "Key Skills" text -> ordered token list.
//
// The same function runs on the training path and on the query path, so a
// user typing "Python, SQL" gets exactly the tokens a posting listing
// "python,sql" was trained with.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Characters that never survive cleaning: anything but ASCII letters and spaces.
static NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z ]").expect("static regex is valid"));

/// Lowercase skill tokens in the order they were listed. Duplicates are kept.
pub type NormalizedSkills = Vec<String>;

/// Split on commas, strip non-alphabetic characters, trim, lowercase, and drop
/// empty segments.
pub fn normalize_skills(raw: &str) -> NormalizedSkills {
    raw.split(',')
        .map(|segment| NON_ALPHA.replace_all(segment, "").trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_empty_segments() {
        assert_eq!(normalize_skills(" Python ,  , SQL,"), vec!["python", "sql"]);
    }

    #[test]
    fn test_empty_and_whitespace_inputs() {
        assert!(normalize_skills("").is_empty());
        assert!(normalize_skills("   \t ").is_empty());
        assert!(normalize_skills(",,,").is_empty());
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        assert_eq!(
            normalize_skills("SQL, Python, sql"),
            vec!["sql", "python", "sql"]
        );
    }

    #[test]
    fn test_strips_non_alphabetic_characters() {
        assert_eq!(normalize_skills("Java, C++"), vec!["java", "c"]);
        assert_eq!(normalize_skills("123, R"), vec!["r"]);
        assert_eq!(
            normalize_skills("Machine Learning, Node.js"),
            vec!["machine learning", "nodejs"]
        );
    }
}

//! Freshness policies: does a query need live search results?
//!
//! These are pure functions behind a trait so the trigger rule can be swapped
//! (configured keywords, a test double) without touching the pipeline.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Built-in recency keywords.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "today",
    "latest",
    "breaking",
    "news",
    "this week",
    "this month",
];

/// Decides whether a user query is time-sensitive.
pub trait FreshnessClassifier: Send + Sync {
    fn is_fresh(&self, text: &str) -> bool;
}

/// Matches any keyword as a whole word, case-insensitively.
pub struct KeywordClassifier {
    // None when the keyword list is empty: nothing is ever fresh.
    pattern: Option<Regex>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Result<Self, regex_lite::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| {
                k.split_whitespace()
                    .map(regex_lite::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        // The built-in keywords are plain words; escaping makes this infallible.
        Self::new(DEFAULT_KEYWORDS).unwrap_or(Self { pattern: None })
    }
}

impl FreshnessClassifier for KeywordClassifier {
    fn is_fresh(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.is_match(&text.to_lowercase()))
    }
}

static DEFAULT_CLASSIFIER: LazyLock<KeywordClassifier> = LazyLock::new(KeywordClassifier::default);

/// Classify with the built-in keyword list.
pub fn is_fresh(text: &str) -> bool {
    DEFAULT_CLASSIFIER.is_fresh(text)
}

/// Whether a query is long enough to warrant a deep search.
pub fn exceeds_length(text: &str, min_chars: usize) -> bool {
    text.chars().count() > min_chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arithmetic_is_not_fresh() {
        assert!(!is_fresh("what's 2+2"));
        assert!(!is_fresh("what is 2+2"));
        assert!(!is_fresh(""));
    }

    #[test]
    fn each_default_keyword_triggers() {
        for keyword in DEFAULT_KEYWORDS {
            assert!(is_fresh(&format!("what happened {keyword}?")), "{keyword}");
        }
    }

    #[test]
    fn possessive_keyword_still_matches() {
        assert!(is_fresh("today's news"));
        assert!(is_fresh("breaking: markets fall"));
    }

    #[test]
    fn keyword_inside_a_word_does_not_match() {
        assert!(!is_fresh("newsletter templates"));
        assert!(!is_fresh("the greatest hits"));
        assert!(!is_fresh("todayish"));
    }

    #[test]
    fn matching_ignores_case_and_spacing() {
        assert!(is_fresh("LATEST rust release"));
        assert!(is_fresh("anything big this   week?"));
        assert!(!is_fresh("this weekend"));
    }

    #[test]
    fn custom_keywords_replace_defaults() {
        let classifier = KeywordClassifier::new(["score", "right now"]).unwrap();
        assert!(classifier.is_fresh("what's the score"));
        assert!(classifier.is_fresh("who is winning right now"));
        assert!(!classifier.is_fresh("today's news"));
    }

    #[test]
    fn keywords_are_matched_literally() {
        let classifier = KeywordClassifier::new(["v1.0"]).unwrap();
        assert!(classifier.is_fresh("is v1.0 out yet"));
        assert!(!classifier.is_fresh("is v100 out yet"));
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let classifier = KeywordClassifier::new(Vec::<String>::new()).unwrap();
        assert!(!classifier.is_fresh("today's breaking news"));
    }

    #[test]
    fn length_threshold_is_exclusive() {
        assert!(!exceeds_length(&"a".repeat(50), 50));
        assert!(exceeds_length(&"a".repeat(51), 50));
        // Counts characters, not bytes.
        assert!(!exceeds_length(&"é".repeat(50), 50));
    }
}

//! The classification rule.

use crate::catalog::WarningSet;

/// Label produced when the text mentions the subject.
pub const SUBJECT_LABEL: &str = "nasa";

/// Returns true if the lowercase `token` appears in `text` as a whole
/// whitespace-separated word, ignoring case.
pub fn contains_token(text: &str, token: &str) -> bool {
    text.split_whitespace().any(|word| word.to_lowercase() == token)
}

/// Classifies a text.
///
/// Pure and deterministic: the result depends only on `text`. A whole-word
/// "nasa" (any case) yields `{"nasa"}`; anything else yields the empty set.
pub fn classify(text: &str) -> WarningSet {
    let mut warnings = WarningSet::new();
    if contains_token(text, SUBJECT_LABEL) {
        warnings.insert(SUBJECT_LABEL);
    }
    warnings
}

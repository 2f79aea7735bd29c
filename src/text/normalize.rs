use regex::Regex;

/// Whitespace and bracket cleanup applied to segment text and raw tokens.
///
/// Square-bracket pairs containing only whitespace are transcription
/// artifacts and are deleted; any remaining whitespace run collapses to a
/// single space. Applying the normalizer twice yields the same result as
/// applying it once.
#[derive(Debug)]
pub struct Normalizer {
    empty_brackets: Regex,
    whitespace: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            empty_brackets: Regex::new(r"\[\s*\]").expect("hardcoded pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("hardcoded pattern is valid"),
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let stripped = self.empty_brackets.replace_all(text, "");
        self.whitespace.replace_all(&stripped, " ").into_owned()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

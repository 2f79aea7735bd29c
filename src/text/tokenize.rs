use regex::Regex;

/// Splits utterance text into raw tokens.
///
/// A token is either a maximal run of non-whitespace characters, or such a
/// run containing exactly one balanced, non-nested parenthesis group which
/// may have non-whitespace characters attached on either side. Parenthesized
/// annotations like `(lacht)` or `ge(nau)so` therefore stay atomic.
/// Whitespace only separates; it never appears inside a token.
#[derive(Debug)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\S*\([^()]*\)\S*|\S+").expect("hardcoded pattern is valid"),
        }
    }

    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Annotation category assigned to a transcription token.
///
/// The taxonomy loosely follows GAT-2 transcription conventions; `Plain`
/// marks an ordinary lexical token and serializes as `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Unintelligible,
    MultipleVariants,
    Mimesis,
    AssumedWording,
    Pause,
    OtherNote,
    Anonymized,
    Hesitation,
    Lengthening,
    ProperNameAbbreviation,
    #[serde(rename = "-")]
    Plain,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Unintelligible => "unintelligible",
            Category::MultipleVariants => "multiple_variants",
            Category::Mimesis => "mimesis",
            Category::AssumedWording => "assumed_wording",
            Category::Pause => "pause",
            Category::OtherNote => "other_note",
            Category::Anonymized => "anonymized",
            Category::Hesitation => "hesitation",
            Category::Lengthening => "lengthening",
            Category::ProperNameAbbreviation => "proper_name_abbreviation",
            Category::Plain => "-",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token after variant resolution and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedToken {
    /// Canonical surface form
    pub form: String,
    /// Alternative pronunciation variant, if the token carried one
    pub alternative: Option<String>,
    pub category: Category,
}

/// How a single classification rule matches a form
#[derive(Debug)]
enum Matcher {
    /// The whole form matches the pattern
    Full(Regex),
    /// The pattern occurs anywhere in the form
    Contains(Regex),
    /// The form is one of these literals
    OneOf(&'static [&'static str]),
    /// Every cased character is uppercase and at least one cased character exists
    AllCaps,
}

impl Matcher {
    fn matches(&self, form: &str) -> bool {
        match self {
            Matcher::Full(re) => re.is_match(form),
            Matcher::Contains(re) => re.is_match(form),
            Matcher::OneOf(words) => words.contains(&form),
            Matcher::AllCaps => {
                let mut has_cased = false;
                for c in form.chars() {
                    if c.is_lowercase() {
                        return false;
                    }
                    if c.is_uppercase() {
                        has_cased = true;
                    }
                }
                has_cased
            }
        }
    }
}

/// Misspelled variants of the unintelligible marker found in the corpus
const UNINTELLIGIBLE_TYPOS: &[&str] = &["(unverständlcih)", "(UMVERSTÄNDLICH)", "(unverständlch)"];

/// Non-linguistic sound descriptions with capitalization or wrapping the
/// mimesis pattern does not cover
const SOUND_WORDS: &[&str] = &[
    "(gelächter)",
    "(lacht)",
    "(Biergeräusch)",
    "(lachen)",
    "((lacht))",
    "(weinen)",
    "(singend)",
    "((schmunzelt))",
    "(lippenflattern)",
    "(ha)",
];

const HESITATIONS: &[&str] = &["ehm", "eh", "mhm", "hm"];

/// Classifies tokens into annotation categories.
///
/// Rules are evaluated strictly in table order and the first match wins.
/// The order carries meaning: parenthesis-based rules run before the
/// colon/lengthening rule so colons inside notes never misfire, and the
/// `MAXX` literal sits directly before the anonymization rule because that
/// name abbreviation would otherwise match the XX pattern.
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<(Matcher, Category)>,
}

impl Classifier {
    pub fn new() -> Self {
        let full = |pattern: &str| {
            Matcher::Full(Regex::new(pattern).expect("hardcoded pattern is valid"))
        };
        let contains = |pattern: &str| {
            Matcher::Contains(Regex::new(pattern).expect("hardcoded pattern is valid"))
        };

        let rules = vec![
            (
                full(r"^\((UNV.*ICH|unv.*ich|\?{1,3})\)$"),
                Category::Unintelligible,
            ),
            (Matcher::OneOf(UNINTELLIGIBLE_TYPOS), Category::Unintelligible),
            (full(r"^\([a-z]+/[a-z]+\)$"), Category::MultipleVariants),
            (full(r"^\(+[A-ZÄÖÜ\s]+\)+$"), Category::Mimesis),
            (Matcher::OneOf(SOUND_WORDS), Category::Mimesis),
            (full(r"^\(+[a-zäöü\s]+\)+$"), Category::AssumedWording),
            (full(r"^\(\.+\)$"), Category::Pause),
            (full(r"^\(\d+(\.\d+)?s?\)$"), Category::Pause),
            (full(r"^\(.+\)$"), Category::OtherNote),
            (Matcher::OneOf(&["MAXX"]), Category::ProperNameAbbreviation),
            (contains(r"XX{1,3}"), Category::Anonymized),
            (Matcher::OneOf(HESITATIONS), Category::Hesitation),
            (contains(r":{1,3}"), Category::Lengthening),
            (Matcher::AllCaps, Category::ProperNameAbbreviation),
        ];

        Self { rules }
    }

    /// Category for an already variant-resolved, trimmed form
    pub fn category_of(&self, form: &str) -> Category {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(form))
            .map(|&(_, category)| category)
            .unwrap_or(Category::Plain)
    }

    /// Resolve a raw token's variant split and assign its category
    pub fn classify(&self, token: &str) -> ClassifiedToken {
        let (form, alternative) = resolve_variant(token);
        let form = form.trim().to_string();
        let category = self.category_of(&form);
        ClassifiedToken {
            form,
            alternative,
            category,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a token on its first `/` into canonical form and alternative.
///
/// The alternative loses a trailing `)` and the form loses a leading `(`,
/// so a wrapped variant pair like `(griesse/griezi)` never keeps a stray
/// parenthesis on either side.
pub fn resolve_variant(token: &str) -> (String, Option<String>) {
    match token.split_once('/') {
        Some((head, tail)) => {
            let alternative = tail.trim_end_matches(')').to_string();
            let form = head.strip_prefix('(').unwrap_or(head).to_string();
            (form, Some(alternative))
        }
        None => (token.to_string(), None),
    }
}

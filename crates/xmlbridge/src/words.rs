//! English singularization used to pair plural containers with their items.
//!
//! This is a suffix heuristic, not a dictionary. It lower-cases its input and
//! misreads words like `houses` (`hous`) or `news` (`new`); callers fix such
//! words through [`WordRules::exclude_words`] and [`WordRules::include_words`].

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Characters that block the `-hes` rule when they precede it (`bathes`, `clothes`, ...)
const HES_BLOCKERS: &str = "aeioudgkprt";
const VOWELS: &str = "aeiou";

/// Singularization switch plus per-word overrides
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WordRules {
    /// Master switch; with it off [`WordRules::to_singular`] returns its input untouched
    pub singularize_words: bool,
    /// Words that are never changed
    pub exclude_words: BTreeSet<String>,
    /// Explicit plural -> singular mappings, checked after the exclusions
    pub include_words: BTreeMap<String, String>,
}

impl WordRules {
    /// Rules with singularization switched on and no overrides
    pub fn singularize() -> Self {
        Self {
            singularize_words: true,
            ..Self::default()
        }
    }

    /// Never touch `word`
    pub fn exclude(mut self, word: impl Into<String>) -> Self {
        self.exclude_words.insert(word.into());
        self
    }

    /// Map `plural` to `singular` instead of applying the suffix rules
    pub fn include(mut self, plural: impl Into<String>, singular: impl Into<String>) -> Self {
        self.include_words.insert(plural.into(), singular.into());
        self
    }

    /// Singular form of `word`.
    ///
    /// Overrides win over the suffix rules, and the first matching rule wins.
    pub fn to_singular<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if !self.singularize_words {
            return Cow::Borrowed(word);
        }

        let word = word.trim().to_lowercase();

        if self.exclude_words.contains(&word) {
            return Cow::Owned(word);
        }
        if let Some(mapped) = self.include_words.get(&word) {
            return Cow::Owned(mapped.clone());
        }

        Cow::Owned(apply_suffix_rules(word))
    }

    /// Whether a list stored under `name` is written as a wrapper holding singular items
    pub fn wraps(&self, name: &str) -> bool {
        self.singularize_words && self.to_singular(name) != name
    }
}

fn apply_suffix_rules(word: String) -> String {
    // already singular Latin words: status, corpus, bus
    if word.ends_with("us") {
        return word;
    }

    if ends_with_sibilant_es(&word) {
        if let Some(stem) = word.strip_suffix("es") {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.chars().last().is_some_and(|c| !VOWELS.contains(c)) {
            return format!("{stem}y");
        }
    }

    if !word.ends_with("ss") {
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
    }

    word
}

fn ends_with_sibilant_es(word: &str) -> bool {
    if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        return true;
    }
    word.strip_suffix("hes")
        .and_then(|stem| stem.chars().last())
        .is_some_and(|c| !HES_BLOCKERS.contains(c))
}

//! Multilingual display strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Display text keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolyglotText {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_strings: BTreeMap<String, String>,
}

impl PolyglotText {
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.display_strings.insert(language.into(), text.into());
        self
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.display_strings.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.display_strings.is_empty()
    }
}

/// Text in the default language only.
pub fn simple_text(text: impl Into<String>) -> PolyglotText {
    PolyglotText::default().with(DEFAULT_LANGUAGE, text)
}

/// Text from `(language, text)` pairs.
pub fn polyglot<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> PolyglotText {
    pairs
        .into_iter()
        .fold(PolyglotText::default(), |text, (lang, s)| text.with(lang, s))
}

//! Keyword chips and answer highlighting.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free keyword list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    /// Start from the backend's split words, dropping blanks and repeats.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for word in words {
            set.add(word);
        }
        set
    }

    /// Append a keyword. Returns whether the set changed.
    pub fn add(&mut self, word: impl Into<String>) -> bool {
        let word = word.into();
        if word.trim().is_empty() || self.words.contains(&word) {
            return false;
        }
        self.words.push(word);
        true
    }

    /// Remove the keyword at `index`. Returns whether the set changed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.words.len() {
            return false;
        }
        self.words.remove(index);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The wire form expected by the chunk lookup.
    pub fn joined(&self) -> String {
        self.words.join(";")
    }
}

/// A run of answer text, highlighted when it matched a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub keyword: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            keyword: false,
        }
    }

    fn keyword(text: &str) -> Self {
        Self {
            text: text.to_string(),
            keyword: true,
        }
    }
}

/// Split `message` into plain and keyword segments. Alternatives are tried in
/// keyword order at each position, so earlier keywords win overlaps.
pub fn highlight_answer(message: &str, keywords: &[String]) -> Vec<Segment> {
    let alternatives: Vec<String> = keywords
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| regex::escape(word))
        .collect();
    if alternatives.is_empty() || message.is_empty() {
        return vec![Segment::plain(message)];
    }
    let pattern = match Regex::new(&alternatives.join("|")) {
        Ok(pattern) => pattern,
        Err(err) => {
            tracing::warn!(error = %err, "keyword pattern rejected, highlighting disabled");
            return vec![Segment::plain(message)];
        }
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(message) {
        if found.start() > cursor {
            segments.push(Segment::plain(&message[cursor..found.start()]));
        }
        segments.push(Segment::keyword(found.as_str()));
        cursor = found.end();
    }
    if cursor < message.len() {
        segments.push(Segment::plain(&message[cursor..]));
    }
    segments
}

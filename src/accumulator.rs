//! Completed-word accumulation
//!
//! Collects the words recognised during a signing session until they are
//! turned into a sentence.

/// Ordered list of recognised words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordAccumulator {
    words: Vec<String>,
}

impl WordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed word
    pub fn push(&mut self, word: impl Into<String>) {
        let word = word.into();
        tracing::info!("Word added: {}", word);
        self.words.push(word);
    }

    /// Remove and return the most recent word
    pub fn undo_last(&mut self) -> Option<String> {
        let removed = self.words.pop();
        if let Some(ref word) = removed {
            tracing::info!("Word removed: {}", word);
        }
        removed
    }

    /// Remove all words
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Take all words, leaving the accumulator empty
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.words)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words joined for display, e.g. `나, 학교, 가다`
    pub fn display_text(&self) -> String {
        self.words.join(", ")
    }
}

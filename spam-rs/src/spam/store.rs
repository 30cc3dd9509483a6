//! Word-frequency store
//!
//! Holds per-label token counts and per-label message counts. Counts only
//! ever grow: training is the sole mutation and nothing is removed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::tokenizer::tokenize;
use super::types::Label;

/// Per-label token and message counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyStore {
    spam_tokens: HashMap<String, u64>,
    ham_tokens: HashMap<String, u64>,
    spam_count: u64,
    ham_count: u64,
}

impl FrequencyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn from a message under the given label
    ///
    /// Every token occurrence is counted, so a word repeated three times in
    /// one message adds three. The message counter grows by one even when
    /// the message has no tokens.
    pub fn train(&mut self, label: Label, message: &str) {
        let tokens = tokenize(message);

        match label {
            Label::Spam => self.spam_count += 1,
            Label::Ham => self.ham_count += 1,
        }

        let table = self.tokens_mut(label);
        for token in tokens {
            *table.entry(token).or_insert(0) += 1;
        }
    }

    /// Learn from a spam message
    pub fn train_spam(&mut self, message: &str) {
        self.train(Label::Spam, message);
    }

    /// Learn from a ham (non-spam) message
    pub fn train_ham(&mut self, message: &str) {
        self.train(Label::Ham, message);
    }

    /// Stored count for each distinct token of `message` under `label`
    ///
    /// Tokens never seen under `label` map to `epsilon` instead of zero.
    pub fn word_frequencies(&self, message: &str, label: Label, epsilon: f64) -> BTreeMap<String, f64> {
        let table = self.tokens(label);

        let mut frequencies = BTreeMap::new();
        for token in tokenize(message) {
            if frequencies.contains_key(&token) {
                continue;
            }
            let frequency = match table.get(&token) {
                Some(&count) => count as f64,
                None => epsilon,
            };
            frequencies.insert(token, frequency);
        }
        frequencies
    }

    /// Stored count of `token` under `label` (0 when absent)
    pub fn count(&self, label: Label, token: &str) -> u64 {
        self.tokens(label).get(token).copied().unwrap_or(0)
    }

    /// Number of spam messages trained
    pub fn spam_count(&self) -> u64 {
        self.spam_count
    }

    /// Number of ham messages trained
    pub fn ham_count(&self) -> u64 {
        self.ham_count
    }

    /// Number of messages trained under `label`
    pub fn message_count(&self, label: Label) -> u64 {
        match label {
            Label::Spam => self.spam_count,
            Label::Ham => self.ham_count,
        }
    }

    /// Number of messages trained under either label
    pub fn total_messages(&self) -> u64 {
        self.spam_count + self.ham_count
    }

    /// Number of distinct tokens seen under `label`
    pub fn vocabulary_size(&self, label: Label) -> usize {
        self.tokens(label).len()
    }

    /// All tokens as `(token, spam_count, ham_count)`, sorted by token
    pub fn get_tokens(&self) -> Vec<(String, u64, u64)> {
        let mut result: Vec<(String, u64, u64)> = self
            .spam_tokens
            .iter()
            .map(|(token, &spam)| (token.clone(), spam, self.count(Label::Ham, token)))
            .collect();

        result.extend(
            self.ham_tokens
                .iter()
                .filter(|(token, _)| !self.spam_tokens.contains_key(*token))
                .map(|(token, &ham)| (token.clone(), 0, ham)),
        );

        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    /// Load token counts, e.g. from the database
    ///
    /// Zero counts are not stored, so an absent entry and a loaded zero are
    /// indistinguishable.
    pub fn load_tokens(&mut self, tokens: Vec<(String, u64, u64)>) {
        for (token, spam, ham) in tokens {
            if spam > 0 {
                self.spam_tokens.insert(token.clone(), spam);
            }
            if ham > 0 {
                self.ham_tokens.insert(token, ham);
            }
        }
    }

    /// Restore both message counters
    pub fn load_message_counts(&mut self, spam_count: u64, ham_count: u64) {
        self.spam_count = spam_count;
        self.ham_count = ham_count;
    }

    /// Drop zero counts so that such tokens read as unseen
    ///
    /// Training never stores a zero, but a deserialized store may.
    pub fn normalize(&mut self) {
        self.spam_tokens.retain(|_, count| *count > 0);
        self.ham_tokens.retain(|_, count| *count > 0);
    }

    fn tokens(&self, label: Label) -> &HashMap<String, u64> {
        match label {
            Label::Spam => &self.spam_tokens,
            Label::Ham => &self.ham_tokens,
        }
    }

    fn tokens_mut(&mut self, label: Label) -> &mut HashMap<String, u64> {
        match label {
            Label::Spam => &mut self.spam_tokens,
            Label::Ham => &mut self.ham_tokens,
        }
    }
}

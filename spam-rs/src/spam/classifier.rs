//! Naive Bayes scorer
//!
//! Scores a message under each label as
//! `ln P(label) + Σ ln(count(token, label) / messages(label))` over the
//! distinct tokens of the message, and predicts spam only when the spam
//! score is strictly greater than the ham score.

use tracing::debug;

use super::store::FrequencyStore;
use super::types::{Classification, Label};
use crate::error::{Result, SpamError};

/// Count substituted for a token never seen under a label
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Naive Bayes classifier reading from a borrowed frequency store
#[derive(Debug, Clone, Copy)]
pub struct NaiveBayesClassifier<'a> {
    store: &'a FrequencyStore,
    epsilon: f64,
}

impl<'a> NaiveBayesClassifier<'a> {
    /// Create a classifier with the default epsilon
    pub fn new(store: &'a FrequencyStore) -> Self {
        Self::with_epsilon(store, DEFAULT_EPSILON)
    }

    /// Create a classifier with a custom epsilon
    pub fn with_epsilon(store: &'a FrequencyStore, epsilon: f64) -> Self {
        Self { store, epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn store(&self) -> &'a FrequencyStore {
        self.store
    }

    /// Log-score of `message` under `label`
    ///
    /// Token likelihoods are normalized by the number of messages trained
    /// under the label, not by its total word count.
    pub fn score_for(&self, message: &str, label: Label) -> Result<f64> {
        let total = self.store.total_messages();
        if total == 0 {
            return Err(SpamError::EmptyTotal);
        }

        let label_count = self.store.message_count(label);
        if label_count == 0 {
            return Err(SpamError::EmptyStore { label });
        }

        let label_count = label_count as f64;
        let frequencies = self.store.word_frequencies(message, label, self.epsilon);

        let likelihood: f64 = frequencies
            .values()
            .map(|count| (count / label_count).ln())
            .sum();

        Ok(likelihood + (label_count / total as f64).ln())
    }

    /// Score a message under both labels and pick one
    pub fn classify(&self, message: &str) -> Result<Classification> {
        let spam_score = self.score_for(message, Label::Spam)?;
        let ham_score = self.score_for(message, Label::Ham)?;

        // Ties go to ham
        let label = if spam_score > ham_score {
            Label::Spam
        } else {
            Label::Ham
        };

        debug!(%label, spam_score, ham_score, "Classified message");

        Ok(Classification {
            label,
            spam_score,
            ham_score,
        })
    }

    /// Whether `message` is classified as spam
    pub fn is_spam(&self, message: &str) -> Result<bool> {
        Ok(self.classify(message)?.is_spam())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_store() -> FrequencyStore {
        let mut store = FrequencyStore::new();
        store.train_spam("buy cheap now");
        store.train_ham("let's meet for lunch");
        store
    }

    #[test]
    fn test_score_for_matches_formula() {
        let mut store = FrequencyStore::new();
        store.train_spam("cheap cheap pills");
        store.train_spam("cheap watches");
        store.train_ham("lunch");

        let classifier = NaiveBayesClassifier::new(&store);
        let score = classifier.score_for("cheap pills unknown cheap", Label::Spam).unwrap();

        // cheap: 3/2, pills: 1/2, unknown: eps/2, prior: 2/3
        let expected = (3.0f64 / 2.0).ln()
            + (1.0f64 / 2.0).ln()
            + (DEFAULT_EPSILON / 2.0).ln()
            + (2.0f64 / 3.0).ln();
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let store = trained_store();
        let classifier = NaiveBayesClassifier::new(&store);

        assert!(classifier.is_spam("buy cheap stuff").unwrap());
        assert!(!classifier.is_spam("let's meet").unwrap());
    }

    #[test]
    fn test_empty_message_uses_priors() {
        let mut store = trained_store();
        let classifier = NaiveBayesClassifier::new(&store);

        // Equal priors tie, ties go to ham
        let result = classifier.classify("").unwrap();
        assert_eq!(result.spam_score, result.ham_score);
        assert_eq!(result.label, Label::Ham);

        store.train_spam("more");
        let classifier = NaiveBayesClassifier::new(&store);
        assert!(classifier.is_spam("").unwrap());
    }

    #[test]
    fn test_untrained_store_errors() {
        let store = FrequencyStore::new();
        let classifier = NaiveBayesClassifier::new(&store);

        assert!(matches!(classifier.is_spam("hello"), Err(SpamError::EmptyTotal)));
        assert!(matches!(
            classifier.score_for("hello", Label::Ham),
            Err(SpamError::EmptyTotal)
        ));
    }

    #[test]
    fn test_single_label_store_errors() {
        let mut store = FrequencyStore::new();
        store.train_ham("hello there");
        let classifier = NaiveBayesClassifier::new(&store);

        assert!(classifier.score_for("hello", Label::Ham).unwrap().is_finite());
        assert!(matches!(
            classifier.is_spam("hello"),
            Err(SpamError::EmptyStore { label: Label::Spam })
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let store = trained_store();
        let classifier = NaiveBayesClassifier::new(&store);

        let first = classifier.classify("cheap lunch for now, buy it").unwrap();
        for _ in 0..20 {
            let again = classifier.classify("cheap lunch for now, buy it").unwrap();
            assert_eq!(again.label, first.label);
            assert_eq!(again.spam_score.to_bits(), first.spam_score.to_bits());
            assert_eq!(again.ham_score.to_bits(), first.ham_score.to_bits());
        }
    }

    #[test]
    fn test_custom_epsilon() {
        let store = trained_store();
        let classifier = NaiveBayesClassifier::with_epsilon(&store, 0.5);
        assert_eq!(classifier.epsilon(), 0.5);

        let score = classifier.score_for("stuff", Label::Spam).unwrap();
        let expected = 0.5f64.ln() + 0.5f64.ln();
        assert!((score - expected).abs() < 1e-12);
    }
}

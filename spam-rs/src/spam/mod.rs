//! Spam classification module
//!
//! Provides the tokenizer, the word-frequency store, the naive Bayes
//! classifier built on top of it, and a database-backed manager that
//! shares one store between trainers and classifiers.

pub mod classifier;
pub mod manager;
pub mod store;
pub mod tokenizer;
pub mod types;

pub use classifier::{NaiveBayesClassifier, DEFAULT_EPSILON};
pub use manager::{SpamManager, SpamStats};
pub use store::FrequencyStore;
pub use tokenizer::tokenize;
pub use types::*;

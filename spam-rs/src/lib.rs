//! spam-rs: word-frequency naive Bayes spam filter
//!
//! Classifies short text messages as spam or ham from per-label word
//! counts.
//!
//! # Example
//!
//! ```
//! use spam_rs::spam::{FrequencyStore, NaiveBayesClassifier};
//!
//! let mut store = FrequencyStore::new();
//! store.train_spam("buy cheap now");
//! store.train_ham("let's meet for lunch");
//!
//! let classifier = NaiveBayesClassifier::new(&store);
//! assert!(classifier.is_spam("buy cheap stuff").unwrap());
//! assert!(!classifier.is_spam("let's meet").unwrap());
//! ```
//!
//! # Modules
//!
//! - [`spam`]: Tokenizer, frequency store, classifier and manager
//! - [`dataset`]: CSV loading and train/test splitting
//! - [`evaluation`]: Training driver and accuracy/F1 metrics
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod spam;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SpamError};

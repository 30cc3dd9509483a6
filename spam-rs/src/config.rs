//! Configuration for spam-rs

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SpamError};
use crate::spam::DEFAULT_EPSILON;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Count used for tokens never seen under a label
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

/// Labeled CSV dataset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
    /// Header of the label column ("spam"/"ham")
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Header of the message column
    #[serde(default = "default_text_column")]
    pub text_column: String,
    /// Fraction of samples held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Shuffle seed; unseeded when absent
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_database_url() -> String {
    "sqlite://spam.db".to_string()
}

fn default_dataset_path() -> String {
    "spam.csv".to_string()
}

fn default_label_column() -> String {
    "v1".to_string()
}

fn default_text_column() -> String {
    "v2".to_string()
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_seed() -> Option<u64> {
    Some(42)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            label_column: default_label_column(),
            text_column: default_text_column(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpamError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SpamError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override the split settings (e.g. from the command line) and revalidate
    pub fn apply_split_overrides(&mut self, test_ratio: Option<f64>, seed: Option<u64>) -> Result<()> {
        if let Some(test_ratio) = test_ratio {
            self.dataset.test_ratio = test_ratio;
        }
        if seed.is_some() {
            self.dataset.seed = seed;
        }
        self.validate()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let epsilon = self.classifier.epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(SpamError::Config(format!(
                "epsilon must be a positive finite number, got {}",
                epsilon
            )));
        }

        let ratio = self.dataset.test_ratio;
        if !(0.0..1.0).contains(&ratio) {
            return Err(SpamError::Config(format!(
                "test_ratio must be in [0, 1), got {}",
                ratio
            )));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(SpamError::Config(format!(
                "Unknown log format '{}' (expected \"pretty\" or \"json\")",
                other
            ))),
        }
    }
}

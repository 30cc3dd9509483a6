//! Spam types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpamError;

/// Classification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    /// Both labels, spam first
    pub const ALL: [Label; 2] = [Label::Spam, Label::Ham];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
        }
    }

    pub fn is_spam(&self) -> bool {
        matches!(self, Label::Spam)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = SpamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("spam") {
            Ok(Label::Spam)
        } else if trimmed.eq_ignore_ascii_case("ham") {
            Ok(Label::Ham)
        } else {
            Err(SpamError::InvalidLabel(s.to_string()))
        }
    }
}

/// A labeled message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub label: Label,
    pub text: String,
}

impl Sample {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// Result of classifying one message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Predicted label
    pub label: Label,
    /// Natural-log joint likelihood under spam
    pub spam_score: f64,
    /// Natural-log joint likelihood under ham
    pub ham_score: f64,
}

impl Classification {
    pub fn is_spam(&self) -> bool {
        self.label.is_spam()
    }
}

/// Classification audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamLog {
    /// Unique ID
    pub id: String,
    /// Predicted label
    pub label: Label,
    /// Spam log-score
    pub spam_score: f64,
    /// Ham log-score
    pub ham_score: f64,
    /// Leading part of the message
    pub excerpt: String,
    /// Timestamp
    pub created_at: DateTime<Utc>,
}

//! Training driver and evaluation metrics
//!
//! Metrics are computed for the spam class: a positive is a message
//! predicted or labeled as spam.

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::spam::{FrequencyStore, Label, NaiveBayesClassifier, Sample};

/// Train `store` on every sample, once each
pub fn train(store: &mut FrequencyStore, samples: &[Sample]) {
    for sample in samples {
        store.train(sample.label, &sample.text);
    }
    info!(
        samples = samples.len(),
        spam = store.spam_count(),
        ham = store.ham_count(),
        "Training complete"
    );
}

/// Confusion matrix for the spam class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        match (actual, predicted) {
            (Label::Spam, Label::Spam) => self.true_positive += 1,
            (Label::Ham, Label::Spam) => self.false_positive += 1,
            (Label::Ham, Label::Ham) => self.true_negative += 1,
            (Label::Spam, Label::Ham) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Fraction classified correctly
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Correct spam predictions over all spam predictions
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// Correct spam predictions over all actual spam
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Evaluation results
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl From<ConfusionMatrix> for EvaluationReport {
    fn from(matrix: ConfusionMatrix) -> Self {
        Self {
            matrix,
            accuracy: matrix.accuracy(),
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1: matrix.f1(),
        }
    }
}

/// Classify every sample and compare against its label
pub fn evaluate(classifier: &NaiveBayesClassifier<'_>, samples: &[Sample]) -> Result<EvaluationReport> {
    let mut matrix = ConfusionMatrix::default();
    for sample in samples {
        let predicted = classifier.classify(&sample.text)?.label;
        matrix.record(sample.label, predicted);
    }

    let report = EvaluationReport::from(matrix);
    info!(
        samples = samples.len(),
        accuracy = report.accuracy,
        f1 = report.f1,
        "Evaluation complete"
    );
    Ok(report)
}

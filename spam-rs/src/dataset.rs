//! Labeled message datasets
//!
//! Loads `(label, text)` samples from a CSV file and partitions them into
//! training and evaluation sets.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::{info, warn};

use crate::config::DatasetConfig;
use crate::error::{Result, SpamError};
use crate::spam::{Label, Sample};

/// Load samples from a CSV file with a header row
pub fn load_csv<P: AsRef<Path>>(path: P, config: &DatasetConfig) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let samples = read_samples(reader, config)?;
    info!(path = %path.display(), samples = samples.len(), "Loaded dataset");
    Ok(samples)
}

/// Read samples from any CSV source
pub fn read_samples<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    config: &DatasetConfig,
) -> Result<Vec<Sample>> {
    let headers = reader.byte_headers()?.clone();
    let label_idx = column_index(&headers, &config.label_column)?;
    let text_idx = column_index(&headers, &config.text_column)?;

    let mut samples = Vec::new();
    for (row, record) in reader.byte_records().enumerate() {
        let record = record?;

        let label = match record.get(label_idx).map(decode_field) {
            Some(raw) => match raw.parse::<Label>() {
                Ok(label) => label,
                Err(_) => {
                    warn!(row = row + 1, label = %raw, "Skipping row with unknown label");
                    continue;
                }
            },
            None => {
                warn!(row = row + 1, "Skipping row without label column");
                continue;
            }
        };

        let text = record.get(text_idx).map(decode_field).unwrap_or_default();
        samples.push(Sample { label, text });
    }

    Ok(samples)
}

fn column_index(headers: &csv::ByteRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| decode_field(h).trim() == name)
        .ok_or_else(|| SpamError::Dataset(format!("Missing column '{}'", name)))
}

/// UTF-8 when valid, Latin-1 otherwise
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Split samples into `(train, test)`
///
/// The test partition holds `round(len * test_ratio)` samples. With a seed
/// the shuffle is reproducible.
pub fn train_test_split(
    samples: &[Sample],
    test_ratio: f64,
    seed: Option<u64>,
) -> (Vec<Sample>, Vec<Sample>) {
    let mut shuffled = samples.to_vec();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    shuffled.shuffle(&mut rng);

    let ratio = test_ratio.clamp(0.0, 1.0);
    let test_len = ((shuffled.len() as f64) * ratio).round() as usize;
    let test = shuffled.split_off(shuffled.len() - test_len);

    (shuffled, test)
}

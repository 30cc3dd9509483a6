//! spam-rs: naive Bayes spam filter CLI
//!
//! # Usage
//!
//! ```bash
//! # Hold out 20% of the dataset and report accuracy / F1
//! spam-rs evaluate --data spam.csv
//!
//! # Train the persistent model
//! spam-rs train --data spam.csv
//!
//! # Classify a message with the persistent model
//! spam-rs classify "WINNER!! Claim your prize now"
//! ```

use clap::{Parser, Subcommand};
use spam_rs::config::{Config, LoggingConfig};
use spam_rs::dataset::{load_csv, train_test_split};
use spam_rs::evaluation::{evaluate, train};
use spam_rs::spam::{FrequencyStore, NaiveBayesClassifier, SpamManager};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "spam-rs")]
#[command(about = "Classify messages as spam or ham", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a split of the dataset and report accuracy and F1
    Evaluate {
        /// CSV dataset path
        #[arg(long)]
        data: Option<PathBuf>,
        /// Fraction of samples held out for testing
        #[arg(long)]
        test_ratio: Option<f64>,
        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train the persistent model on the whole dataset
    Train {
        /// CSV dataset path
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Classify a message with the persistent model
    Classify {
        /// Message text
        message: String,
        /// Record the result in the audit log
        #[arg(long)]
        log: bool,
    },
    /// Show model statistics
    Stats,
    /// Export the persistent model to JSON
    Export {
        path: PathBuf,
    },
    /// Replace the persistent model with a JSON export
    Import {
        path: PathBuf,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("spam_rs={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn open_manager(config: &Config) -> anyhow::Result<SpamManager> {
    let options = SqliteConnectOptions::from_str(&config.storage.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let manager = SpamManager::new(pool, config.classifier.epsilon);
    manager.init_db().await?;
    Ok(manager)
}

fn dataset_path(data: Option<PathBuf>, config: &Config) -> PathBuf {
    data.unwrap_or_else(|| PathBuf::from(&config.dataset.path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None if Path::new("spam.toml").exists() => Config::from_file("spam.toml")?,
        None => Config::default(),
    };

    init_logging(&config.logging);
    info!("Starting spam-rs v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Evaluate { data, test_ratio, seed } => {
            config.apply_split_overrides(test_ratio, seed)?;

            let path = dataset_path(data, &config);
            let samples = load_csv(&path, &config.dataset)?;

            let (training, testing) =
                train_test_split(&samples, config.dataset.test_ratio, config.dataset.seed);
            info!(train = training.len(), test = testing.len(), "Split dataset");

            let mut store = FrequencyStore::new();
            train(&mut store, &training);

            let classifier = NaiveBayesClassifier::with_epsilon(&store, config.classifier.epsilon);
            let report = evaluate(&classifier, &testing)?;

            println!("Samples:   {} train / {} test", training.len(), testing.len());
            println!("Accuracy:  {:.2}%", report.accuracy * 100.0);
            println!("Precision: {:.2}%", report.precision * 100.0);
            println!("Recall:    {:.2}%", report.recall * 100.0);
            println!("F1 (spam): {:.2}%", report.f1 * 100.0);
            println!(
                "Confusion: TP={} FP={} TN={} FN={}",
                report.matrix.true_positive,
                report.matrix.false_positive,
                report.matrix.true_negative,
                report.matrix.false_negative
            );
        }
        Commands::Train { data } => {
            let path = dataset_path(data, &config);
            let samples = load_csv(&path, &config.dataset)?;

            let manager = open_manager(&config).await?;
            manager.learn_batch(&samples).await?;

            let stats = manager.get_stats().await?;
            println!(
                "✓ Trained on {} messages ({} spam, {} ham in model)",
                samples.len(),
                stats.spam_learned,
                stats.ham_learned
            );
        }
        Commands::Classify { message, log } => {
            let manager = open_manager(&config).await?;
            let result = manager.classify(&message).await?;

            if log {
                manager.log_result(&message, &result).await?;
            }

            println!("{}", result.label);
            println!("  spam score: {:.4}", result.spam_score);
            println!("  ham score:  {:.4}", result.ham_score);
        }
        Commands::Stats => {
            let manager = open_manager(&config).await?;
            let stats = manager.get_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Export { path } => {
            let manager = open_manager(&config).await?;
            manager.export_json(&path).await?;
            println!("✓ Exported model to {}", path.display());
        }
        Commands::Import { path } => {
            let manager = open_manager(&config).await?;
            manager.import_json(&path).await?;
            println!("✓ Imported model from {}", path.display());
        }
    }

    Ok(())
}

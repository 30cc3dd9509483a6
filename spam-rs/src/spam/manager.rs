//! Spam manager for database persistence
//!
//! Shares one frequency store between concurrent trainers and classifiers
//! behind a read-write lock and keeps it in sync with SQLite.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::classifier::NaiveBayesClassifier;
use super::store::FrequencyStore;
use super::tokenizer::tokenize;
use super::types::*;
use crate::error::Result;

/// Length of the message excerpt kept in the audit log
const EXCERPT_CHARS: usize = 80;

/// Spam management statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct SpamStats {
    /// Spam messages learned
    pub spam_learned: u64,
    /// Ham messages learned
    pub ham_learned: u64,
    /// Distinct tokens seen in spam
    pub spam_vocabulary: usize,
    /// Distinct tokens seen in ham
    pub ham_vocabulary: usize,
    /// Classifications in the audit log
    pub messages_classified: u64,
    /// Logged classifications predicted as spam
    pub spam_detected: u64,
}

/// Spam manager
pub struct SpamManager {
    db: SqlitePool,
    store: Arc<RwLock<FrequencyStore>>,
    epsilon: f64,
}

impl SpamManager {
    /// Create a new spam manager
    pub fn new(db: SqlitePool, epsilon: f64) -> Self {
        Self {
            db,
            store: Arc::new(RwLock::new(FrequencyStore::new())),
            epsilon,
        }
    }

    /// Initialize database tables and load the persisted store
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS spam_tokens (
                token TEXT PRIMARY KEY,
                spam_count INTEGER NOT NULL DEFAULT 0,
                ham_count INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS spam_training (
                label TEXT PRIMARY KEY,
                message_count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS spam_log (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                spam_score REAL NOT NULL,
                ham_score REAL NOT NULL,
                excerpt TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        self.load_store().await
    }

    /// Replace the in-memory store with the persisted one
    async fn load_store(&self) -> Result<()> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT token, spam_count, ham_count FROM spam_tokens",
        )
        .fetch_all(&self.db)
        .await?;

        let tokens: Vec<(String, u64, u64)> = rows
            .into_iter()
            .map(|(t, s, h)| (t, s as u64, h as u64))
            .collect();

        let counters = sqlx::query_as::<_, (String, i64)>(
            "SELECT label, message_count FROM spam_training",
        )
        .fetch_all(&self.db)
        .await?;

        let mut spam_count = 0;
        let mut ham_count = 0;
        for (label, count) in counters {
            match label.parse::<Label>()? {
                Label::Spam => spam_count = count as u64,
                Label::Ham => ham_count = count as u64,
            }
        }

        let mut loaded = FrequencyStore::new();
        let token_count = tokens.len();
        loaded.load_tokens(tokens);
        loaded.load_message_counts(spam_count, ham_count);

        *self.store.write().await = loaded;

        info!(
            tokens = token_count,
            spam = spam_count,
            ham = ham_count,
            "Loaded frequency store"
        );

        Ok(())
    }

    /// Learn from a labeled message
    pub async fn learn(&self, label: Label, message: &str) -> Result<()> {
        let mut occurrences: BTreeMap<String, u64> = BTreeMap::new();
        for token in tokenize(message) {
            *occurrences.entry(token).or_insert(0) += 1;
        }

        // Keep the write lock until the rows are committed so the database
        // never sees counts older than what another learner already wrote.
        // Memory is only updated once the commit succeeded.
        let mut store = self.store.write().await;

        let mut tx = self.db.begin().await?;
        let now = Utc::now().to_rfc3339();
        for (token, added) in &occurrences {
            let mut spam_count = store.count(Label::Spam, token);
            let mut ham_count = store.count(Label::Ham, token);
            match label {
                Label::Spam => spam_count += added,
                Label::Ham => ham_count += added,
            }
            Self::upsert_token(&mut tx, token, spam_count, ham_count, &now).await?;
        }
        Self::upsert_counter(&mut tx, label, store.message_count(label) + 1).await?;
        tx.commit().await?;

        store.train(label, message);

        debug!(%label, tokens = occurrences.len(), "Learned message");
        Ok(())
    }

    /// Learn from spam message
    pub async fn learn_spam(&self, message: &str) -> Result<()> {
        self.learn(Label::Spam, message).await
    }

    /// Learn from ham message
    pub async fn learn_ham(&self, message: &str) -> Result<()> {
        self.learn(Label::Ham, message).await
    }

    /// Learn from many samples and persist the whole store once
    pub async fn learn_batch(&self, samples: &[Sample]) -> Result<()> {
        let mut store = self.store.write().await;
        let mut next = store.clone();
        for sample in samples {
            next.train(sample.label, &sample.text);
        }
        Self::save_store(&self.db, &next).await?;
        *store = next;

        info!(
            samples = samples.len(),
            spam = store.spam_count(),
            ham = store.ham_count(),
            "Learned batch"
        );
        Ok(())
    }

    /// Write every token row and both counters in one transaction
    async fn save_store(db: &SqlitePool, store: &FrequencyStore) -> Result<()> {
        let mut tx = db.begin().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query("DELETE FROM spam_tokens").execute(&mut *tx).await?;
        for (token, spam_count, ham_count) in store.get_tokens() {
            Self::upsert_token(&mut tx, &token, spam_count, ham_count, &now).await?;
        }
        for label in Label::ALL {
            Self::upsert_counter(&mut tx, label, store.message_count(label)).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert_token(
        tx: &mut Transaction<'_, Sqlite>,
        token: &str,
        spam_count: u64,
        ham_count: u64,
        updated_at: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO spam_tokens (token, spam_count, ham_count, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET
                spam_count = excluded.spam_count,
                ham_count = excluded.ham_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(token)
        .bind(spam_count as i64)
        .bind(ham_count as i64)
        .bind(updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_counter(
        tx: &mut Transaction<'_, Sqlite>,
        label: Label,
        message_count: u64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO spam_training (label, message_count) VALUES (?, ?)
            ON CONFLICT(label) DO UPDATE SET message_count = excluded.message_count
            "#,
        )
        .bind(label.as_str())
        .bind(message_count as i64)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Classify a message
    pub async fn classify(&self, message: &str) -> Result<Classification> {
        let store = self.store.read().await;
        NaiveBayesClassifier::with_epsilon(&store, self.epsilon).classify(message)
    }

    /// Copy of the current store
    pub async fn snapshot(&self) -> FrequencyStore {
        self.store.read().await.clone()
    }

    /// Write the store to a JSON file
    pub async fn export_json(&self, path: &Path) -> Result<()> {
        let json = {
            let store = self.store.read().await;
            serde_json::to_string_pretty(&*store)?
        };
        tokio::fs::write(path, json).await?;
        info!(path = %path.display(), "Exported frequency store");
        Ok(())
    }

    /// Replace the store with a JSON file's contents and persist it
    pub async fn import_json(&self, path: &Path) -> Result<()> {
        let json = tokio::fs::read_to_string(path).await?;
        let mut imported: FrequencyStore = serde_json::from_str(&json)?;
        imported.normalize();

        let mut store = self.store.write().await;
        Self::save_store(&self.db, &imported).await?;
        *store = imported;

        info!(path = %path.display(), "Imported frequency store");
        Ok(())
    }

    /// Log a classification result
    pub async fn log_result(&self, message: &str, result: &Classification) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let excerpt: String = message.chars().take(EXCERPT_CHARS).collect();

        sqlx::query(
            "INSERT INTO spam_log (id, label, spam_score, ham_score, excerpt, created_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(result.label.as_str())
        .bind(result.spam_score)
        .bind(result.ham_score)
        .bind(&excerpt)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Get classification logs, newest first
    pub async fn get_logs(&self, limit: i64) -> Result<Vec<SpamLog>> {
        let rows = sqlx::query_as::<_, (String, String, f64, f64, String, String)>(
            "SELECT id, label, spam_score, ham_score, excerpt, created_at FROM spam_log ORDER BY created_at DESC LIMIT ?"
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(id, label, spam_score, ham_score, excerpt, created_at)| -> Result<SpamLog> {
                Ok(SpamLog {
                    id,
                    label: label.parse()?,
                    spam_score,
                    ham_score,
                    excerpt,
                    created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                        .map(|d| d.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })
            .collect()
    }

    /// Clear classification logs
    pub async fn clear_logs(&self) -> Result<()> {
        sqlx::query("DELETE FROM spam_log")
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Get spam statistics
    pub async fn get_stats(&self) -> Result<SpamStats> {
        let (messages_classified,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM spam_log")
            .fetch_one(&self.db)
            .await?;

        let (spam_detected,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM spam_log WHERE label = 'spam'")
                .fetch_one(&self.db)
                .await?;

        let store = self.store.read().await;

        Ok(SpamStats {
            spam_learned: store.spam_count(),
            ham_learned: store.ham_count(),
            spam_vocabulary: store.vocabulary_size(Label::Spam),
            ham_vocabulary: store.vocabulary_size(Label::Ham),
            messages_classified: messages_classified as u64,
            spam_detected: spam_detected as u64,
        })
    }
}

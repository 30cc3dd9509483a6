//! Integration tests for the database-backed spam manager

use spam_rs::spam::{FrequencyStore, Label, Sample, SpamManager, DEFAULT_EPSILON};
use spam_rs::SpamError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

async fn setup_test_db() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn setup_manager(pool: SqlitePool) -> SpamManager {
    let manager = SpamManager::new(pool, DEFAULT_EPSILON);
    manager.init_db().await.unwrap();
    manager
}

fn samples() -> Vec<Sample> {
    vec![
        Sample::new(Label::Spam, "buy cheap now"),
        Sample::new(Label::Ham, "let's meet for lunch"),
        Sample::new(Label::Spam, "cheap cheap pills"),
        Sample::new(Label::Ham, "lunch at noon?"),
    ]
}

#[tokio::test]
async fn test_classify_before_training_fails() {
    let manager = setup_manager(setup_test_db().await).await;

    let result = manager.classify("hello").await;
    assert!(matches!(result, Err(SpamError::EmptyTotal)));
}

#[tokio::test]
async fn test_learn_and_classify() {
    let manager = setup_manager(setup_test_db().await).await;

    manager.learn_spam("buy cheap now").await.unwrap();
    manager.learn_ham("let's meet for lunch").await.unwrap();

    let result = manager.classify("buy cheap stuff").await.unwrap();
    assert_eq!(result.label, Label::Spam);
    assert!(result.spam_score > result.ham_score);

    let result = manager.classify("let's meet").await.unwrap();
    assert_eq!(result.label, Label::Ham);
}

#[tokio::test]
async fn test_learned_state_survives_reload() {
    let pool = setup_test_db().await;
    let manager = setup_manager(pool.clone()).await;

    for sample in samples() {
        manager.learn(sample.label, &sample.text).await.unwrap();
    }
    manager.learn_ham("").await.unwrap();
    let expected = manager.snapshot().await;

    let reloaded = setup_manager(pool).await;
    let restored = reloaded.snapshot().await;

    assert_eq!(restored, expected);
    assert_eq!(restored.spam_count(), 2);
    assert_eq!(restored.ham_count(), 3);
    assert_eq!(restored.count(Label::Spam, "cheap"), 3);
}

#[tokio::test]
async fn test_learn_batch_matches_in_memory_training() {
    let pool = setup_test_db().await;
    let manager = setup_manager(pool.clone()).await;
    manager.learn_batch(&samples()).await.unwrap();

    let mut expected = FrequencyStore::new();
    for sample in samples() {
        expected.train(sample.label, &sample.text);
    }
    assert_eq!(manager.snapshot().await, expected);

    let reloaded = setup_manager(pool).await;
    assert_eq!(reloaded.snapshot().await, expected);
}

#[tokio::test]
async fn test_json_export_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let source = setup_manager(setup_test_db().await).await;
    source.learn_batch(&samples()).await.unwrap();
    source.export_json(&path).await.unwrap();

    let pool = setup_test_db().await;
    let target = setup_manager(pool.clone()).await;
    target.learn_spam("something that will be replaced").await.unwrap();
    target.import_json(&path).await.unwrap();

    let expected = source.snapshot().await;
    assert_eq!(target.snapshot().await, expected);

    let reloaded = setup_manager(pool).await;
    assert_eq!(reloaded.snapshot().await, expected);
}

#[tokio::test]
async fn test_logs_and_stats() {
    let manager = setup_manager(setup_test_db().await).await;
    manager.learn_batch(&samples()).await.unwrap();

    let spam = manager.classify("cheap pills now").await.unwrap();
    manager.log_result("cheap pills now", &spam).await.unwrap();
    let ham = manager.classify("lunch at noon").await.unwrap();
    manager.log_result("lunch at noon", &ham).await.unwrap();

    let logs = manager.get_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|l| l.label == Label::Spam && l.excerpt == "cheap pills now"));

    let stats = manager.get_stats().await.unwrap();
    assert_eq!(stats.spam_learned, 2);
    assert_eq!(stats.ham_learned, 2);
    assert_eq!(stats.messages_classified, 2);
    assert_eq!(stats.spam_detected, 1);
    assert_eq!(stats.spam_vocabulary, 4);

    manager.clear_logs().await.unwrap();
    assert!(manager.get_logs(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_learning_and_classification() {
    let manager = Arc::new(setup_manager(setup_test_db().await).await);
    manager.learn_batch(&samples()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                manager.learn_spam("cheap offer").await.unwrap();
            } else {
                manager.classify("lunch at noon").await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let store = manager.snapshot().await;
    assert_eq!(store.spam_count(), 6);
    assert_eq!(store.count(Label::Spam, "offer"), 4);
}

#[tokio::test]
async fn test_failed_learn_leaves_store_unchanged() {
    let pool = setup_test_db().await;
    let manager = setup_manager(pool.clone()).await;
    manager.learn_ham("let's meet for lunch").await.unwrap();
    manager.learn_spam("buy cheap now").await.unwrap();
    let before = manager.snapshot().await;

    sqlx::query("DROP TABLE spam_training")
        .execute(&pool)
        .await
        .unwrap();

    assert!(manager.learn_spam("buy cheap").await.is_err());
    assert_eq!(manager.snapshot().await, before);

    assert!(manager.learn_batch(&samples()).await.is_err());
    assert_eq!(manager.snapshot().await, before);
}

#[tokio::test]
async fn test_import_ignores_zero_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        r#"{"spam_tokens":{"cheap":0,"buy":1},"ham_tokens":{"lunch":1},"spam_count":1,"ham_count":1}"#,
    )
    .unwrap();

    let pool = setup_test_db().await;
    let manager = setup_manager(pool.clone()).await;
    manager.import_json(&path).await.unwrap();

    let result = manager.classify("cheap").await.unwrap();
    assert!(result.spam_score.is_finite());
    assert!(result.ham_score.is_finite());
    assert_eq!(result.spam_score, result.ham_score);

    // Memory matches what a reload rebuilds from the database
    let reloaded = setup_manager(pool).await;
    assert_eq!(reloaded.snapshot().await, manager.snapshot().await);
}

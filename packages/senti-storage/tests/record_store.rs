use std::sync::Arc;

use tokio::fs;

use senti_config::Postgres;
use senti_domain::{NewRecord, Probabilities};
use senti_storage::{Error, RecordStore, db::Db, json_file::JsonFileStore};
use senti_testkit::{TempStoreDir, TestDatabase};

fn probabilities(positive: f64, negative: f64, neutral: f64) -> Probabilities {
	Probabilities::from([
		("positive".to_string(), positive),
		("negative".to_string(), negative),
		("neutral".to_string(), neutral),
	])
}

fn new_record(text: &str, class: &str, confidence: f64) -> NewRecord {
	NewRecord::new(text, class, confidence, probabilities(0.2, 0.3, 0.5))
}

/// Behaviour both backends must share.
async fn exercise_contract(store: &dyn RecordStore) {
	store.initialize().await.expect("Failed to initialize store.");
	store.initialize().await.expect("Second initialize must be a no-op.");

	let info = store.info().await.expect("Failed to read info.");

	assert_eq!(info.total_entries, 0);
	assert!(store.list_all().await.expect("Failed to list.").is_empty());

	let first = store.insert(new_record("first", "positive", 0.9)).await.expect("insert");
	let second = store.insert(new_record("second", "negative", 0.8)).await.expect("insert");
	let third = store.insert(new_record("third", "positive", 0.7)).await.expect("insert");

	assert_eq!((first.id, second.id, third.id), (1, 2, 3));
	assert_eq!(first.source, "web_analyzer");

	let all = store.list_all().await.expect("Failed to list.");
	let ids = all.iter().map(|record| record.id).collect::<Vec<_>>();

	assert_eq!(ids, vec![3, 2, 1]);
	assert_eq!(all[2].text, "first");
	assert_eq!(all[2].predicted_class, "positive");
	assert_eq!(all[2].confidence, 0.9);
	assert_eq!(all[2].probabilities, probabilities(0.2, 0.3, 0.5));

	for n in 0..=all.len() {
		let recent = store.list_recent(n).await.expect("Failed to list recent.");

		assert_eq!(recent, all[..n].to_vec());
	}

	assert_eq!(store.list_recent(10).await.expect("Failed to list recent.").len(), 3);
	assert_eq!(store.info().await.expect("Failed to read info.").total_entries, 3);

	store.clear_all().await.expect("Failed to clear.");

	let info = store.info().await.expect("Failed to read info.");

	assert_eq!(info.total_entries, 0);
	assert!(store.list_all().await.expect("Failed to list.").is_empty());

	let after_clear = store.insert(new_record("fourth", "neutral", 0.6)).await.expect("insert");

	assert_eq!(after_clear.id, 4, "Ids must continue past the pre-clear high-water mark.");
}

#[tokio::test]
async fn json_file_store_honours_contract() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = JsonFileStore::new(dir.store_file());

	exercise_contract(&store).await;
}

#[tokio::test]
async fn json_file_store_writes_flattened_layout() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = JsonFileStore::new(dir.store_file());
	let mut probabilities = probabilities(0.1, 0.2, 0.3);

	probabilities.insert("mixed".to_string(), 0.4);

	store.initialize().await.expect("Failed to initialize store.");
	store
		.insert(NewRecord::new("meh", "mixed", 0.4, probabilities.clone()))
		.await
		.expect("Failed to insert.");

	let raw = fs::read(dir.store_file()).await.expect("Failed to read store file.");
	let json: serde_json::Value = serde_json::from_slice(&raw).expect("Store file must be JSON.");
	let entry = &json["sentiment_analysis"][0];

	assert_eq!(entry["id"], 1);
	assert_eq!(entry["positive_prob"], 0.1);
	assert_eq!(entry["negative_prob"], 0.2);
	assert_eq!(entry["neutral_prob"], 0.3);
	assert_eq!(entry["other_probs"]["mixed"], 0.4);
	assert_eq!(json["metadata"]["total_entries"], 1);
	assert_eq!(json["metadata"]["last_id"], 1);

	let listed = store.list_all().await.expect("Failed to list.");

	assert_eq!(listed[0].probabilities, probabilities);
}

#[tokio::test]
async fn json_file_store_reads_missing_file_as_empty() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = JsonFileStore::new(dir.path().join("nested").join("store.json"));

	assert!(store.list_all().await.expect("Failed to list.").is_empty());

	let info = store.info().await.expect("Failed to read info.");

	assert_eq!(info.total_entries, 0);
	assert_eq!(info.file_size, Some(0));
	assert_eq!(info.database_type, "json_file");

	store.initialize().await.expect("Failed to initialize nested store.");

	assert!(store.path().exists());
}

#[tokio::test]
async fn json_file_store_initialize_keeps_existing_records() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = JsonFileStore::new(dir.store_file());

	store.initialize().await.expect("Failed to initialize store.");
	store.insert(new_record("kept", "positive", 0.9)).await.expect("Failed to insert.");

	let reopened = JsonFileStore::new(dir.store_file());

	reopened.initialize().await.expect("Failed to initialize store.");

	let records = reopened.list_all().await.expect("Failed to list.");

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].text, "kept");
}

#[tokio::test]
async fn json_file_store_reports_corrupt_file() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");

	fs::write(dir.store_file(), b"{ not json").await.expect("Failed to seed file.");

	let store = JsonFileStore::new(dir.store_file());
	let err = store
		.insert(new_record("lost", "positive", 0.9))
		.await
		.expect_err("Expected corrupt file error.");

	assert!(matches!(err, Error::Corrupt { .. }), "Unexpected error: {err:?}");

	let raw = fs::read(dir.store_file()).await.expect("Failed to read store file.");

	assert_eq!(raw, b"{ not json");
}

#[tokio::test]
async fn json_file_store_failed_write_keeps_previous_document() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = JsonFileStore::new(dir.store_file());

	store.initialize().await.expect("Failed to initialize store.");
	store.insert(new_record("kept", "positive", 0.9)).await.expect("Failed to insert.");

	// A directory squatting on the temp path makes the write step fail.
	let mut tmp = dir.store_file().into_os_string();

	tmp.push(".tmp");
	fs::create_dir(&tmp).await.expect("Failed to block temp path.");

	let err = store
		.insert(new_record("dropped", "negative", 0.8))
		.await
		.expect_err("Expected write failure.");

	assert!(matches!(err, Error::Io { .. }), "Unexpected error: {err:?}");

	fs::remove_dir(&tmp).await.expect("Failed to unblock temp path.");

	let records = store.list_all().await.expect("Failed to list.");

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].text, "kept");

	let next = store.insert(new_record("next", "neutral", 0.5)).await.expect("Failed to insert.");

	assert_eq!(next.id, 2);
}

#[tokio::test]
async fn json_file_store_concurrent_inserts_get_distinct_ids() {
	let dir = TempStoreDir::new().expect("Failed to create temp dir.");
	let store = Arc::new(JsonFileStore::new(dir.store_file()));

	store.initialize().await.expect("Failed to initialize store.");

	let mut handles = Vec::new();

	for n in 0..16 {
		let store = Arc::clone(&store);

		handles.push(tokio::spawn(async move {
			store.insert(new_record(&format!("text {n}"), "positive", 0.5)).await
		}));
	}

	let mut ids = Vec::new();

	for handle in handles {
		ids.push(handle.await.expect("Insert task panicked.").expect("Failed to insert.").id);
	}

	ids.sort_unstable();

	assert_eq!(ids, (1..=16).collect::<Vec<_>>());
	assert_eq!(store.info().await.expect("Failed to read info.").total_entries, 16);
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SENTI_PG_DSN to run."]
async fn postgres_store_honours_contract() {
	let Some(base_dsn) = senti_testkit::env_dsn() else {
		eprintln!("Skipping postgres_store_honours_contract; set SENTI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	exercise_contract(&db).await;

	let info = db.info().await.expect("Failed to read info.");

	assert_eq!(info.database_type, "postgres");
	assert_eq!(info.connection_status.as_deref(), Some("connected"));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SENTI_PG_DSN to run."]
async fn postgres_store_concurrent_inserts_get_distinct_ids() {
	let Some(base_dsn) = senti_testkit::env_dsn() else {
		eprintln!("Skipping postgres_store_concurrent_inserts_get_distinct_ids; set SENTI_PG_DSN.");

		return;
	};

	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 4 };
	let db = Arc::new(Db::connect(&cfg).await.expect("Failed to connect to Postgres."));

	db.initialize().await.expect("Failed to initialize schema.");

	let mut handles = Vec::new();

	for n in 0..12 {
		let db = Arc::clone(&db);

		handles.push(tokio::spawn(async move {
			db.insert(new_record(&format!("text {n}"), "negative", 0.5)).await
		}));
	}

	let mut ids = Vec::new();

	for handle in handles {
		let record = handle.await.expect("Insert task panicked.").expect("Failed to insert.");

		ids.push(record.id);
	}

	ids.sort_unstable();

	assert_eq!(ids, (1..=12).collect::<Vec<_>>());

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

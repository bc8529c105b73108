use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use senti_config::{Config, Error, StorageBackend};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(edit: impl FnOnce(&mut toml::Table)) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn section<'a>(root: &'a mut toml::Table, path: &[&str]) -> &'a mut toml::Table {
	let mut table = root;

	for key in path {
		table = table
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	table
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("senti_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> senti_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = senti_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Expected sample config to load.");

	assert_eq!(cfg.storage.backend, StorageBackend::JsonFile);
	assert_eq!(cfg.service.environment, "development");
	assert_eq!(cfg.api.recent_entries_limit, 5);
	assert_eq!(
		cfg.storage.json_file.as_ref().map(|json_file| json_file.path.clone()),
		Some(PathBuf::from("data/sentiment_data.json"))
	);
}

#[test]
fn api_section_is_optional() {
	let payload = sample_toml_with(|root| {
		root.remove("api");
	});
	let cfg = load_payload(payload).expect("Expected config without [api] to load.");

	assert_eq!(cfg.api.recent_entries_limit, 5);
}

#[test]
fn blank_environment_falls_back_to_development() {
	let payload = sample_toml_with(|root| {
		section(root, &["service"]).insert("environment".to_string(), Value::from("  "));
	});
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert_eq!(cfg.service.environment, "development");
}

#[test]
fn missing_config_file_reports_path() {
	let path = env::temp_dir().join("senti_config_test_missing_file.toml");
	let err = senti_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err:?}");
}

#[test]
fn unknown_backend_fails_to_parse() {
	let payload = sample_toml_with(|root| {
		section(root, &["storage"]).insert("backend".to_string(), Value::from("sqlite"));
	});
	let err = load_payload(payload).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err:?}");
}

#[test]
fn http_bind_must_be_socket_address() {
	let payload = sample_toml_with(|root| {
		section(root, &["service"]).insert("http_bind".to_string(), Value::from("localhost"));
	});
	let err = load_payload(payload).expect_err("Expected http_bind validation error.");

	assert!(
		err.to_string().contains("service.http_bind must be a socket address"),
		"Unexpected error: {err}"
	);
}

#[test]
fn json_file_backend_requires_section() {
	let mut cfg = base_config();

	cfg.storage.json_file = None;

	let err = senti_config::validate(&cfg).expect_err("Expected json_file validation error.");

	assert!(
		err.to_string()
			.contains("storage.json_file is required when storage.backend is json_file."),
		"Unexpected error: {err}"
	);
}

#[test]
fn postgres_backend_requires_positive_pool() {
	let mut cfg = base_config();

	cfg.storage.backend = StorageBackend::Postgres;

	assert!(senti_config::validate(&cfg).is_ok());

	if let Some(postgres) = cfg.storage.postgres.as_mut() {
		postgres.pool_max_conns = 0;
	}

	let err = senti_config::validate(&cfg).expect_err("Expected pool validation error.");

	assert!(
		err.to_string().contains("storage.postgres.pool_max_conns must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn postgres_backend_requires_dsn() {
	let mut cfg = base_config();

	cfg.storage.backend = StorageBackend::Postgres;

	if let Some(postgres) = cfg.storage.postgres.as_mut() {
		postgres.dsn = " ".to_string();
	}

	let err = senti_config::validate(&cfg).expect_err("Expected dsn validation error.");

	assert!(
		err.to_string().contains("storage.postgres.dsn must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn recent_entries_limit_must_be_positive() {
	let mut cfg = base_config();

	cfg.api.recent_entries_limit = 0;

	let err = senti_config::validate(&cfg).expect_err("Expected api validation error.");

	assert!(
		err.to_string().contains("api.recent_entries_limit must be greater than zero."),
		"Unexpected error: {err}"
	);
}

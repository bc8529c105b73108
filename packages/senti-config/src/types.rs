use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub api: Api,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Reported by the health endpoint. Blank values fall back to "development".
	#[serde(default = "default_environment")]
	pub environment: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub json_file: Option<JsonFile>,
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	JsonFile,
	Postgres,
}
impl StorageBackend {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::JsonFile => "json_file",
			Self::Postgres => "postgres",
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonFile {
	pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Api {
	/// Number of entries returned under `recent_entries` by the stats endpoint.
	#[serde(default = "default_recent_entries_limit")]
	pub recent_entries_limit: u32,
}
impl Default for Api {
	fn default() -> Self {
		Self { recent_entries_limit: default_recent_entries_limit() }
	}
}

pub(crate) fn default_environment() -> String {
	"development".to_string()
}

fn default_recent_entries_limit() -> u32 {
	5
}

mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	str::FromStr,
};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const ADMIN_DATABASE: &str = "postgres";

/// Unique scratch directory under the system temp dir, removed on drop.
pub struct TempStoreDir {
	path: PathBuf,
}
impl TempStoreDir {
	pub fn new() -> Result<Self> {
		let path = env::temp_dir().join(format!("senti_test_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path)?;

		Ok(Self { path })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Location for a store file inside this directory. The file itself is not created.
	pub fn store_file(&self) -> PathBuf {
		self.path.join("sentiment_data.json")
	}
}
impl Drop for TempStoreDir {
	fn drop(&mut self) {
		if let Err(err) = fs::remove_dir_all(&self.path) {
			eprintln!("Test store cleanup failed for {:?}: {err}.", self.path);
		}
	}
}

/// Throwaway Postgres database created next to the one `SENTI_PG_DSN` points at.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse SENTI_PG_DSN: {err}.")))?;
		let admin_options = base_options.clone().database(ADMIN_DATABASE);
		let mut admin_conn = PgConnection::connect_with(&admin_options).await?;
		let name = format!("senti_test_{}", Uuid::new_v4().simple());

		admin_conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin_options })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database. Callers close their own pools first.
	pub async fn cleanup(self) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.admin_options).await?;

		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name).as_str())
			.await?;

		Ok(())
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("SENTI_PG_DSN").ok()
}

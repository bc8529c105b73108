use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Failed to {action} {path:?}: {source}")]
	Io { action: &'static str, path: PathBuf, source: std::io::Error },
	#[error("Store file {path:?} is not a valid sentiment document: {source}")]
	Corrupt { path: PathBuf, source: serde_json::Error },
	#[error("Failed to encode sentiment document: {0}")]
	Encode(#[from] serde_json::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Api, Config, JsonFile, Postgres, Service, Storage, StorageBackend};

use std::{fs, net::SocketAddr, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.http_bind.trim().parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a socket address such as 127.0.0.1:3001."
				.to_string(),
		});
	}

	match cfg.storage.backend {
		StorageBackend::JsonFile => {
			let Some(json_file) = cfg.storage.json_file.as_ref() else {
				return Err(Error::Validation {
					message: "storage.json_file is required when storage.backend is json_file."
						.to_string(),
				});
			};

			if json_file.path.as_os_str().is_empty() {
				return Err(Error::Validation {
					message: "storage.json_file.path must be non-empty.".to_string(),
				});
			}
		},
		StorageBackend::Postgres => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
	}

	if cfg.api.recent_entries_limit == 0 {
		return Err(Error::Validation {
			message: "api.recent_entries_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let environment = cfg.service.environment.trim();

	cfg.service.environment = if environment.is_empty() {
		types::default_environment()
	} else {
		environment.to_string()
	};
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
}

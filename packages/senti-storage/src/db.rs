use sqlx::{PgPool, postgres::PgPoolOptions};
use time::OffsetDateTime;

use senti_domain::{NewRecord, SentimentRecord};

use crate::{BoxFuture, RecordStore, Result, StoreInfo, queries, schema};

pub const DATABASE_TYPE: &str = "postgres";

const SCHEMA_LOCK_ID: i64 = 5_120_419;

/// Relational backend. Ids come from `max(id, last_id) + 1` computed while the metadata row
/// is locked, so concurrent inserts never share an id.
pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &senti_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// Transaction-scoped advisory lock: concurrent starters apply the DDL one at a time.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)")
			.bind(SCHEMA_LOCK_ID)
			.execute(&mut *tx)
			.await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		let count = queries::count_records(&self.pool).await?;

		tracing::info!(total_entries = count, "Sentiment schema ready.");

		Ok(())
	}

	async fn insert_inner(&self, record: NewRecord) -> Result<SentimentRecord> {
		let now = OffsetDateTime::now_utc();
		let mut tx = self.pool.begin().await?;
		let meta = queries::lock_meta(&mut *tx).await?;
		let max_id = queries::max_record_id(&mut *tx).await?;
		let id = max_id.max(meta.last_id) + 1;
		let row = queries::insert_record(&mut *tx, id, &record, now).await?;

		queries::touch_meta(&mut *tx, id, now).await?;

		tx.commit().await?;

		tracing::info!(id, predicted_class = %row.predicted_class, "Sentiment record inserted.");

		Ok(row.into())
	}

	async fn list_inner(&self, limit: Option<usize>) -> Result<Vec<SentimentRecord>> {
		let limit = limit.map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
		let rows = queries::select_records(&self.pool, limit).await?;

		Ok(rows.into_iter().map(SentimentRecord::from).collect())
	}

	async fn info_inner(&self) -> Result<StoreInfo> {
		let meta = queries::fetch_meta(&self.pool).await?;
		let count = queries::count_records(&self.pool).await?;

		Ok(StoreInfo {
			total_entries: u64::try_from(count).unwrap_or_default(),
			created_at: meta.created_at,
			last_updated: meta.last_updated,
			database_type: DATABASE_TYPE.to_string(),
			file_path: None,
			file_size: None,
			connection_status: Some("connected".to_string()),
		})
	}

	async fn clear_inner(&self) -> Result<()> {
		let now = OffsetDateTime::now_utc();
		let mut tx = self.pool.begin().await?;
		let meta = queries::lock_meta(&mut *tx).await?;
		let max_id = queries::max_record_id(&mut *tx).await?;
		let removed = queries::delete_all_records(&mut *tx).await?;

		queries::touch_meta(&mut *tx, max_id.max(meta.last_id), now).await?;

		tx.commit().await?;

		tracing::info!(removed, "Sentiment store cleared.");

		Ok(())
	}
}

impl RecordStore for Db {
	fn initialize(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.ensure_schema())
	}

	fn insert(&self, record: NewRecord) -> BoxFuture<'_, Result<SentimentRecord>> {
		Box::pin(self.insert_inner(record))
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<SentimentRecord>>> {
		Box::pin(self.list_inner(None))
	}

	fn list_recent(&self, limit: usize) -> BoxFuture<'_, Result<Vec<SentimentRecord>>> {
		Box::pin(self.list_inner(Some(limit)))
	}

	fn info(&self) -> BoxFuture<'_, Result<StoreInfo>> {
		Box::pin(self.info_inner())
	}

	fn clear_all(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.clear_inner())
	}
}

use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;

use senti_domain::NewRecord;

use crate::{
	Result,
	models::{MetaRow, SentimentRow, SplitProbabilities},
};

const RECORD_COLUMNS: &str = "\
id,
	text,
	predicted_class,
	confidence,
	positive_prob,
	negative_prob,
	neutral_prob,
	other_probs,
	created_at,
	source";

/// Locks the metadata row until the surrounding transaction ends.
pub async fn lock_meta(conn: &mut PgConnection) -> Result<MetaRow> {
	let row = sqlx::query_as::<_, MetaRow>(
		"\
SELECT created_at, last_updated, last_id
FROM sentiment_store_meta
WHERE singleton
FOR UPDATE",
	)
	.fetch_one(conn)
	.await?;

	Ok(row)
}

pub async fn fetch_meta(pool: &PgPool) -> Result<MetaRow> {
	let row = sqlx::query_as::<_, MetaRow>(
		"SELECT created_at, last_updated, last_id FROM sentiment_store_meta WHERE singleton",
	)
	.fetch_one(pool)
	.await?;

	Ok(row)
}

pub async fn max_record_id(conn: &mut PgConnection) -> Result<i64> {
	let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM sentiment_analysis")
		.fetch_one(conn)
		.await?;

	Ok(max)
}

pub async fn insert_record(
	conn: &mut PgConnection,
	id: i64,
	record: &NewRecord,
	now: OffsetDateTime,
) -> Result<SentimentRow> {
	let split = SplitProbabilities::split(&record.probabilities);
	let sql = format!(
		"\
INSERT INTO sentiment_analysis (
	{RECORD_COLUMNS}
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
RETURNING
	{RECORD_COLUMNS}"
	);
	let row = sqlx::query_as::<_, SentimentRow>(&sql)
		.bind(id)
		.bind(record.text.as_str())
		.bind(record.predicted_class.as_str())
		.bind(record.confidence)
		.bind(split.positive)
		.bind(split.negative)
		.bind(split.neutral)
		.bind(sqlx::types::Json(&split.other))
		.bind(now)
		.bind(record.source.as_str())
		.fetch_one(conn)
		.await?;

	Ok(row)
}

pub async fn touch_meta(
	conn: &mut PgConnection,
	last_id: i64,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query("UPDATE sentiment_store_meta SET last_id = $1, last_updated = $2 WHERE singleton")
		.bind(last_id)
		.bind(now)
		.execute(conn)
		.await?;

	Ok(())
}

/// Newest first. `None` returns every row.
pub async fn select_records(pool: &PgPool, limit: Option<i64>) -> Result<Vec<SentimentRow>> {
	let sql = format!(
		"\
SELECT
	{RECORD_COLUMNS}
FROM sentiment_analysis
ORDER BY created_at DESC, id DESC
LIMIT $1"
	);
	let rows = sqlx::query_as::<_, SentimentRow>(&sql).bind(limit).fetch_all(pool).await?;

	Ok(rows)
}

pub async fn count_records(pool: &PgPool) -> Result<i64> {
	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM sentiment_analysis").fetch_one(pool).await?;

	Ok(count)
}

pub async fn delete_all_records(conn: &mut PgConnection) -> Result<u64> {
	let result = sqlx::query("DELETE FROM sentiment_analysis").execute(conn).await?;

	Ok(result.rows_affected())
}

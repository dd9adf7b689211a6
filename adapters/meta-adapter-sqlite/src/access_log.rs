//! Access log storage and statistics

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use printq_types::meta_adapter::{
	AccessLog, AccessLogEntry, AccessStats, ListAccessLogOptions, PathCount,
};
use printq_types::prelude::*;

use crate::inspect;

fn map_log(row: &SqliteRow) -> Result<AccessLog, sqlx::Error> {
	let status_code: i64 = row.try_get("status_code")?;
	let duration_ms: i64 = row.try_get("duration_ms")?;
	Ok(AccessLog {
		log_id: row.try_get("log_id")?,
		entry: AccessLogEntry {
			ip: row.try_get("ip")?,
			path: row.try_get("path")?,
			method: row.try_get("method")?,
			status_code: u16::try_from(status_code).unwrap_or_default(),
			user_agent: row.try_get("user_agent")?,
			user_id: row.try_get("user_id")?,
			user_email: row.try_get("user_email")?,
			success: row.try_get("success")?,
			error_message: row.try_get("error_message")?,
			duration_ms: u64::try_from(duration_ms).unwrap_or_default(),
			timestamp: Timestamp(row.try_get("created_at")?),
		},
	})
}

/// Appends the WHERE clause selected by the list options
fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, opts: &ListAccessLogOptions) {
	query.push(" WHERE 1=1");
	if let Some(ip) = &opts.ip {
		query.push(" AND ip = ").push_bind(ip.to_string());
	}
	if let Some(success) = opts.success {
		query.push(" AND success = ").push_bind(success);
	}
}

/// (total, successful, unique addresses)
fn map_totals(row: &SqliteRow) -> Result<(i64, i64, i64), sqlx::Error> {
	Ok((
		row.try_get("total")?,
		// sum() is NULL over an empty set
		row.try_get::<Option<i64>, _>("successful")?.unwrap_or(0),
		row.try_get("unique_ips")?,
	))
}

fn to_u64(value: i64) -> u64 {
	u64::try_from(value).unwrap_or_default()
}

pub(crate) async fn create(db: &SqlitePool, entry: &AccessLogEntry) -> ClResult<i64> {
	let res = sqlx::query(
		"INSERT INTO access_logs (ip, path, method, status_code, user_agent, user_id, user_email,
			success, error_message, duration_ms, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(&*entry.ip)
	.bind(&*entry.path)
	.bind(&*entry.method)
	.bind(i64::from(entry.status_code))
	.bind(&*entry.user_agent)
	.bind(entry.user_id.as_deref())
	.bind(entry.user_email.as_deref())
	.bind(entry.success)
	.bind(entry.error_message.as_deref())
	.bind(i64::try_from(entry.duration_ms).unwrap_or(i64::MAX))
	.bind(entry.timestamp.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(res.last_insert_rowid())
}

pub(crate) async fn list(
	db: &SqlitePool,
	opts: &ListAccessLogOptions,
) -> ClResult<(Vec<AccessLog>, u64)> {
	let mut count_query = QueryBuilder::new("SELECT count(*) AS total FROM access_logs");
	push_filters(&mut count_query, opts);
	let total: i64 = count_query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("total"))
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let mut query = QueryBuilder::new(
		"SELECT log_id, ip, path, method, status_code, user_agent, user_id, user_email,
		success, error_message, duration_ms, created_at FROM access_logs",
	);
	push_filters(&mut query, opts);
	query
		.push(" ORDER BY created_at DESC, log_id DESC LIMIT ")
		.push_bind(i64::from(opts.limit))
		.push(" OFFSET ")
		.push_bind(i64::from(opts.offset));

	let rows =
		query.build().fetch_all(db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	let logs = rows
		.iter()
		.map(map_log)
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok((logs, to_u64(total)))
}

pub(crate) async fn stats(
	db: &SqlitePool,
	since: Timestamp,
	top_paths: u32,
) -> ClResult<AccessStats> {
	let row = sqlx::query(
		"SELECT count(*) AS total, sum(success) AS successful, count(DISTINCT ip) AS unique_ips
		FROM access_logs WHERE created_at >= ?",
	)
	.bind(since.0)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let (total, successful, unique_ips) =
		map_totals(&row).inspect_err(inspect).map_err(|_| Error::DbError)?;

	let rows = sqlx::query(
		"SELECT path, count(*) AS hits FROM access_logs WHERE created_at >= ?
		GROUP BY path ORDER BY hits DESC, path LIMIT ?",
	)
	.bind(since.0)
	.bind(i64::from(top_paths))
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let top_endpoints = rows
		.iter()
		.map(|row| {
			Ok(PathCount {
				path: row.try_get("path")?,
				count: to_u64(row.try_get("hits")?),
			})
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(AccessStats {
		total_requests: to_u64(total),
		successful_requests: to_u64(successful),
		failed_requests: to_u64(total - successful),
		unique_ips: to_u64(unique_ips),
		top_endpoints,
	})
}

// vim: ts=4

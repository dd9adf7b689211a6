//! IP ban list

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use printq_types::meta_adapter::BannedIp;
use printq_types::prelude::*;

use crate::inspect;

fn map_ban(row: &SqliteRow) -> Result<BannedIp, sqlx::Error> {
	Ok(BannedIp {
		ip: row.try_get("ip")?,
		reason: row.try_get("reason")?,
		banned_by: row.try_get("banned_by")?,
		banned_at: Timestamp(row.try_get("banned_at")?),
		expires_at: row.try_get::<Option<i64>, _>("expires_at")?.map(Timestamp),
	})
}

pub(crate) async fn read(db: &SqlitePool, ip: &str) -> ClResult<Option<BannedIp>> {
	let row = sqlx::query(
		"SELECT ip, reason, banned_by, banned_at, expires_at FROM banned_ips WHERE ip = ?",
	)
	.bind(ip)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	row.as_ref().map(map_ban).transpose().inspect_err(inspect).map_err(|_| Error::DbError)
}

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<BannedIp>> {
	let rows = sqlx::query(
		"SELECT ip, reason, banned_by, banned_at, expires_at FROM banned_ips
		ORDER BY banned_at DESC, rowid DESC",
	)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(map_ban)
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

pub(crate) async fn create(db: &SqlitePool, ban: &BannedIp) -> ClResult<()> {
	let res = sqlx::query(
		"INSERT INTO banned_ips (ip, reason, banned_by, banned_at, expires_at)
		VALUES (?, ?, ?, ?, ?)",
	)
	.bind(&*ban.ip)
	.bind(&*ban.reason)
	.bind(&*ban.banned_by)
	.bind(ban.banned_at.0)
	.bind(ban.expires_at.map(|ts| ts.0))
	.execute(db)
	.await;

	match res {
		Ok(_) => Ok(()),
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			Err(Error::Conflict("IP is already banned".into()))
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) async fn delete(db: &SqlitePool, ip: &str) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM banned_ips WHERE ip = ?")
		.bind(ip)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn delete_expired(db: &SqlitePool, now: Timestamp) -> ClResult<u64> {
	let res = sqlx::query("DELETE FROM banned_ips WHERE expires_at NOT NULL AND expires_at <= ?")
		.bind(now.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected())
}

// vim: ts=4

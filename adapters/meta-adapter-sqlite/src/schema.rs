//! Database schema initialization

use sqlx::SqlitePool;

/// Creates all tables and indexes that do not exist yet
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Settings
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		name text NOT NULL,
		value text,
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Ban list
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS banned_ips (
		ip text NOT NULL,
		reason text NOT NULL,
		banned_by text NOT NULL,
		banned_at integer NOT NULL,
		expires_at integer,
		PRIMARY KEY(ip)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_banned_ips_expires_at ON banned_ips(expires_at)
		WHERE expires_at NOT NULL",
	)
	.execute(&mut *tx)
	.await?;

	// Access log
	//************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS access_logs (
		log_id integer PRIMARY KEY AUTOINCREMENT,
		ip text NOT NULL,
		path text NOT NULL,
		method text NOT NULL,
		status_code integer NOT NULL,
		user_agent text NOT NULL,
		user_id text,
		user_email text,
		success boolean NOT NULL,
		error_message text,
		duration_ms integer NOT NULL,
		created_at integer NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_access_logs_created_at ON access_logs(created_at)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_access_logs_ip ON access_logs(ip, created_at)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4

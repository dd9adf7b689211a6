//! SQLite implementation of the printq meta adapter
//!
//! Stores the server settings document, the IP ban list and the access log.
//! Timestamps are stored as Unix seconds.

#![forbid(unsafe_code)]

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use printq_types::meta_adapter::{
	AccessLog, AccessLogEntry, AccessStats, BannedIp, ListAccessLogOptions, MetaAdapter,
};
use printq_types::prelude::*;

mod access_log;
mod ban;
mod schema;
mod setting;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (and creates if missing) the database file at `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		info!("Meta database opened: {}", path.display());

		Ok(Self { db })
	}
}

#[async_trait]
impl MetaAdapter for MetaAdapterSqlite {
	// Settings
	//**********
	async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>> {
		setting::read(&self.db, key).await
	}

	async fn update_setting(&self, key: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		setting::update(&self.db, key, value).await
	}

	// Ban list
	//**********
	async fn read_banned_ip(&self, ip: &str) -> ClResult<Option<BannedIp>> {
		ban::read(&self.db, ip).await
	}

	async fn list_banned_ips(&self) -> ClResult<Vec<BannedIp>> {
		ban::list(&self.db).await
	}

	async fn create_banned_ip(&self, ban: &BannedIp) -> ClResult<()> {
		ban::create(&self.db, ban).await
	}

	async fn delete_banned_ip(&self, ip: &str) -> ClResult<()> {
		ban::delete(&self.db, ip).await
	}

	async fn delete_expired_banned_ips(&self, now: Timestamp) -> ClResult<u64> {
		ban::delete_expired(&self.db, now).await
	}

	// Access log
	//************
	async fn create_access_log(&self, entry: &AccessLogEntry) -> ClResult<i64> {
		access_log::create(&self.db, entry).await
	}

	async fn list_access_logs(
		&self,
		opts: &ListAccessLogOptions,
	) -> ClResult<(Vec<AccessLog>, u64)> {
		access_log::list(&self.db, opts).await
	}

	async fn read_access_stats(&self, since: Timestamp, top_paths: u32) -> ClResult<AccessStats> {
		access_log::stats(&self.db, since, top_paths).await
	}
}

// vim: ts=4

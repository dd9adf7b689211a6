//! In-memory adapters for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use printq_core::access::ResponseObserver;
use printq_types::meta_adapter::{
	AccessLog, AccessLogEntry, AccessStats, BannedIp, ListAccessLogOptions, MetaAdapter, PathCount,
};
use printq_types::prelude::*;

#[derive(Debug, Default)]
pub struct MemoryMetaAdapter {
	settings: Mutex<HashMap<Box<str>, serde_json::Value>>,
	bans: Mutex<Vec<BannedIp>>,
	logs: Mutex<Vec<AccessLog>>,
	/// Makes every ban list read fail
	pub fail_ban_reads: AtomicBool,
	/// Drops expired bans right after every ban read, like a purge running in between
	pub purge_after_ban_read: AtomicBool,
	/// Makes every access log write fail
	pub fail_log_writes: AtomicBool,
	pub log_writes: AtomicU32,
	pub setting_reads: Mutex<u32>,
}

impl MemoryMetaAdapter {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn set_fail_ban_reads(&self, fail: bool) {
		self.fail_ban_reads.store(fail, Ordering::SeqCst);
	}

	pub fn set_purge_after_ban_read(&self, purge: bool) {
		self.purge_after_ban_read.store(purge, Ordering::SeqCst);
	}

	pub fn set_fail_log_writes(&self, fail: bool) {
		self.fail_log_writes.store(fail, Ordering::SeqCst);
	}

	/// Attempted access log writes, failed ones included
	pub fn log_writes(&self) -> u32 {
		self.log_writes.load(Ordering::SeqCst)
	}

	pub fn setting_reads(&self) -> u32 {
		*self.setting_reads.lock()
	}

	pub fn logs(&self) -> Vec<AccessLog> {
		self.logs.lock().clone()
	}

	pub fn raw_setting(&self, key: &str) -> Option<serde_json::Value> {
		self.settings.lock().get(key).cloned()
	}

	pub fn put_raw_setting(&self, key: &str, value: serde_json::Value) {
		self.settings.lock().insert(key.into(), value);
	}
}

#[async_trait]
impl MetaAdapter for MemoryMetaAdapter {
	async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>> {
		*self.setting_reads.lock() += 1;
		Ok(self.settings.lock().get(key).cloned())
	}

	async fn update_setting(&self, key: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		let mut settings = self.settings.lock();
		match value {
			Some(value) => settings.insert(key.into(), value),
			None => settings.remove(key),
		};
		Ok(())
	}

	async fn read_banned_ip(&self, ip: &str) -> ClResult<Option<BannedIp>> {
		if self.fail_ban_reads.load(Ordering::SeqCst) {
			return Err(Error::DbError);
		}
		let mut bans = self.bans.lock();
		let ban = bans.iter().find(|b| &*b.ip == ip).cloned();
		if self.purge_after_ban_read.load(Ordering::SeqCst) {
			let now = Timestamp::now();
			bans.retain(|b| b.is_active(now));
		}
		Ok(ban)
	}

	async fn list_banned_ips(&self) -> ClResult<Vec<BannedIp>> {
		let mut bans = self.bans.lock().clone();
		bans.sort_by(|a, b| b.banned_at.cmp(&a.banned_at));
		Ok(bans)
	}

	async fn create_banned_ip(&self, ban: &BannedIp) -> ClResult<()> {
		let mut bans = self.bans.lock();
		if bans.iter().any(|b| b.ip == ban.ip) {
			return Err(Error::Conflict("IP is already banned".into()));
		}
		bans.push(ban.clone());
		Ok(())
	}

	async fn delete_banned_ip(&self, ip: &str) -> ClResult<()> {
		let mut bans = self.bans.lock();
		let before = bans.len();
		bans.retain(|b| &*b.ip != ip);
		if bans.len() == before { Err(Error::NotFound) } else { Ok(()) }
	}

	async fn delete_expired_banned_ips(&self, now: Timestamp) -> ClResult<u64> {
		let mut bans = self.bans.lock();
		let before = bans.len();
		bans.retain(|b| b.is_active(now));
		Ok((before - bans.len()) as u64)
	}

	async fn create_access_log(&self, entry: &AccessLogEntry) -> ClResult<i64> {
		self.log_writes.fetch_add(1, Ordering::SeqCst);
		if self.fail_log_writes.load(Ordering::SeqCst) {
			return Err(Error::DbError);
		}
		let mut logs = self.logs.lock();
		let log_id = logs.len() as i64 + 1;
		logs.push(AccessLog { log_id, entry: entry.clone() });
		Ok(log_id)
	}

	async fn list_access_logs(
		&self,
		opts: &ListAccessLogOptions,
	) -> ClResult<(Vec<AccessLog>, u64)> {
		let logs = self.logs.lock();
		let matching: Vec<AccessLog> = logs
			.iter()
			.rev()
			.filter(|l| opts.ip.as_deref().is_none_or(|ip| &*l.entry.ip == ip))
			.filter(|l| opts.success.is_none_or(|s| l.entry.success == s))
			.cloned()
			.collect();
		let total = matching.len() as u64;
		let page =
			matching.into_iter().skip(opts.offset as usize).take(opts.limit as usize).collect();
		Ok((page, total))
	}

	async fn read_access_stats(&self, since: Timestamp, top_paths: u32) -> ClResult<AccessStats> {
		let logs = self.logs.lock();
		let recent: Vec<&AccessLog> = logs.iter().filter(|l| l.entry.timestamp >= since).collect();

		let mut ips: Vec<&str> = recent.iter().map(|l| &*l.entry.ip).collect();
		ips.sort_unstable();
		ips.dedup();

		let mut paths: HashMap<&str, u64> = HashMap::new();
		for log in &recent {
			*paths.entry(&*log.entry.path).or_default() += 1;
		}
		let mut top: Vec<PathCount> =
			paths.into_iter().map(|(path, count)| PathCount { path: path.into(), count }).collect();
		top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
		top.truncate(top_paths as usize);

		let successful = recent.iter().filter(|l| l.entry.success).count() as u64;
		Ok(AccessStats {
			total_requests: recent.len() as u64,
			successful_requests: successful,
			failed_requests: recent.len() as u64 - successful,
			unique_ips: ips.len() as u64,
			top_endpoints: top,
		})
	}
}

/// Observer collecting entries synchronously
#[derive(Default)]
pub struct CollectingObserver {
	entries: Mutex<Vec<AccessLogEntry>>,
}

impl CollectingObserver {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn entries(&self) -> Vec<AccessLogEntry> {
		self.entries.lock().clone()
	}
}

impl ResponseObserver for CollectingObserver {
	fn on_response_finalized(&self, entry: AccessLogEntry) {
		self.entries.lock().push(entry);
	}
}

// vim: ts=4

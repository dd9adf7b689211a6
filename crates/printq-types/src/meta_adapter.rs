//! Adapter that persists server settings, the IP ban list and the access log.

use async_trait::async_trait;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{serialize_timestamp_iso, serialize_timestamp_iso_opt},
};

// Ban list //
//**********//
/// A persisted rule rejecting all traffic from one IP address
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedIp {
	pub ip: Box<str>,
	pub reason: Box<str>,
	/// Identity (e-mail) of the administrator who issued the ban
	pub banned_by: Box<str>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub banned_at: Timestamp,
	/// `None` means the ban never expires
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub expires_at: Option<Timestamp>,
}

impl BannedIp {
	pub fn is_active(&self, now: Timestamp) -> bool {
		self.expires_at.is_none_or(|exp| exp > now)
	}
}

// Access log //
//************//
/// One completed HTTP request
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
	pub ip: Box<str>,
	pub path: Box<str>,
	pub method: Box<str>,
	pub status_code: u16,
	pub user_agent: Box<str>,
	pub user_id: Option<Box<str>>,
	pub user_email: Option<Box<str>>,
	pub success: bool,
	pub error_message: Option<Box<str>>,
	pub duration_ms: u64,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub timestamp: Timestamp,
}

/// A stored access log entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
	pub log_id: i64,
	#[serde(flatten)]
	pub entry: AccessLogEntry,
}

#[derive(Debug, Default, Clone)]
pub struct ListAccessLogOptions {
	pub ip: Option<Box<str>>,
	pub success: Option<bool>,
	/// Zero based offset
	pub offset: u32,
	pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCount {
	pub path: Box<str>,
	pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStats {
	pub total_requests: u64,
	pub successful_requests: u64,
	pub failed_requests: u64,
	#[serde(rename = "uniqueIPs")]
	pub unique_ips: u64,
	pub top_endpoints: Vec<PathCount>,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Settings
	//**********
	/// Reads a stored setting document, `None` if it was never written
	async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>>;

	/// Writes a setting document, `None` deletes it
	async fn update_setting(&self, key: &str, value: Option<serde_json::Value>) -> ClResult<()>;

	// Ban list
	//**********
	/// Reads the record for an address regardless of its expiry
	async fn read_banned_ip(&self, ip: &str) -> ClResult<Option<BannedIp>>;

	/// Lists all records, newest first
	async fn list_banned_ips(&self) -> ClResult<Vec<BannedIp>>;

	/// Stores a new record. Fails with `Error::Conflict` if the address already has one.
	async fn create_banned_ip(&self, ban: &BannedIp) -> ClResult<()>;

	/// Deletes the record for an address. Fails with `Error::NotFound` if there is none.
	async fn delete_banned_ip(&self, ip: &str) -> ClResult<()>;

	/// Deletes every record that expired at or before `now`, returns the number removed
	async fn delete_expired_banned_ips(&self, now: Timestamp) -> ClResult<u64>;

	// Access log
	//************
	async fn create_access_log(&self, entry: &AccessLogEntry) -> ClResult<i64>;

	/// Lists entries newest first, together with the total number of matching entries
	async fn list_access_logs(&self, opts: &ListAccessLogOptions)
	-> ClResult<(Vec<AccessLog>, u64)>;

	/// Aggregates entries recorded at or after `since`
	async fn read_access_stats(&self, since: Timestamp, top_paths: u32) -> ClResult<AccessStats>;
}


// vim: ts=4

//! Meta adapter tests
//!
//! Settings documents, ban list semantics and access log queries against a
//! temporary database.

use printq_meta_adapter_sqlite::MetaAdapterSqlite;
use printq_types::meta_adapter::{AccessLogEntry, BannedIp, ListAccessLogOptions, MetaAdapter};
use printq_types::prelude::*;
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	(adapter, temp_dir)
}

fn ban(ip: &str, banned_at: i64, expires_at: Option<i64>) -> BannedIp {
	BannedIp {
		ip: ip.into(),
		reason: "abuse".into(),
		banned_by: "admin@example.com".into(),
		banned_at: Timestamp(banned_at),
		expires_at: expires_at.map(Timestamp),
	}
}

fn log_entry(ip: &str, path: &str, status_code: u16, timestamp: i64) -> AccessLogEntry {
	AccessLogEntry {
		ip: ip.into(),
		path: path.into(),
		method: "GET".into(),
		status_code,
		user_agent: "test-agent".into(),
		user_id: None,
		user_email: None,
		success: status_code < 400,
		error_message: (status_code >= 400).then(|| "Not Found".into()),
		duration_ms: 3,
		timestamp: Timestamp(timestamp),
	}
}

// Settings //
//**********//

#[tokio::test]
async fn test_setting_roundtrip_and_delete() {
	let (adapter, _temp) = create_test_adapter().await;

	assert!(adapter.read_setting("server").await.expect("read").is_none());

	let doc = serde_json::json!({ "lockoutAttempts": 4, "smtpHost": "mail.example.com" });
	adapter.update_setting("server", Some(doc.clone())).await.expect("write");
	assert_eq!(adapter.read_setting("server").await.expect("read"), Some(doc));

	adapter.update_setting("server", None).await.expect("delete");
	assert!(adapter.read_setting("server").await.expect("read").is_none());
}

#[tokio::test]
async fn test_settings_survive_reopen() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let path = temp_dir.path().join("meta.db");

	{
		let adapter = MetaAdapterSqlite::new(&path).await.expect("adapter");
		adapter
			.update_setting("server", Some(serde_json::json!({ "lockoutDuration": 30 })))
			.await
			.expect("write");
	}

	let adapter = MetaAdapterSqlite::new(&path).await.expect("adapter");
	let doc = adapter.read_setting("server").await.expect("read").expect("stored");
	assert_eq!(doc["lockoutDuration"], 30);
}

// Ban list //
//**********//

#[tokio::test]
async fn test_ban_create_read_delete() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_banned_ip(&ban("9.9.9.9", 1_000, Some(4_600))).await.expect("create");
	let stored = adapter.read_banned_ip("9.9.9.9").await.expect("read");
	assert_eq!(stored, Some(ban("9.9.9.9", 1_000, Some(4_600))));
	assert!(adapter.read_banned_ip("8.8.8.8").await.expect("read").is_none());

	adapter.delete_banned_ip("9.9.9.9").await.expect("delete");
	assert!(adapter.read_banned_ip("9.9.9.9").await.expect("read").is_none());
	assert!(matches!(adapter.delete_banned_ip("9.9.9.9").await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_duplicate_ban_conflicts() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_banned_ip(&ban("9.9.9.9", 1_000, None)).await.expect("create");
	let res = adapter.create_banned_ip(&ban("9.9.9.9", 2_000, None)).await;

	assert!(matches!(res, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_bans_listed_newest_first() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_banned_ip(&ban("1.1.1.1", 1_000, None)).await.expect("create");
	adapter.create_banned_ip(&ban("3.3.3.3", 3_000, None)).await.expect("create");
	adapter.create_banned_ip(&ban("2.2.2.2", 2_000, None)).await.expect("create");

	let bans = adapter.list_banned_ips().await.expect("list");
	let ips: Vec<&str> = bans.iter().map(|b| &*b.ip).collect();
	assert_eq!(ips, ["3.3.3.3", "2.2.2.2", "1.1.1.1"]);
}

#[tokio::test]
async fn test_purge_only_removes_expired_bans() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_banned_ip(&ban("1.1.1.1", 0, Some(1_000))).await.expect("create");
	adapter.create_banned_ip(&ban("2.2.2.2", 0, Some(5_000))).await.expect("create");
	adapter.create_banned_ip(&ban("3.3.3.3", 0, None)).await.expect("create");

	let removed = adapter.delete_expired_banned_ips(Timestamp(1_000)).await.expect("purge");
	assert_eq!(removed, 1);

	let bans = adapter.list_banned_ips().await.expect("list");
	assert_eq!(bans.len(), 2);
	assert!(bans.iter().all(|b| &*b.ip != "1.1.1.1"));
}

// Access log //
//************//

#[tokio::test]
async fn test_access_log_list_filters_and_paging() {
	let (adapter, _temp) = create_test_adapter().await;

	for i in 0..5 {
		let entry = log_entry("10.0.0.1", "/api/health", 200, 100 + i);
		adapter.create_access_log(&entry).await.expect("log");
	}
	adapter.create_access_log(&log_entry("10.0.0.2", "/api/missing", 404, 200)).await.expect("log");

	let (logs, total) = adapter
		.list_access_logs(&ListAccessLogOptions { limit: 50, ..Default::default() })
		.await
		.expect("list");
	assert_eq!(total, 6);
	assert_eq!(&*logs[0].entry.path, "/api/missing");
	assert_eq!(logs[0].entry.error_message.as_deref(), Some("Not Found"));

	let (logs, total) = adapter
		.list_access_logs(&ListAccessLogOptions {
			ip: Some("10.0.0.1".into()),
			offset: 2,
			limit: 2,
			..Default::default()
		})
		.await
		.expect("list");
	assert_eq!(total, 5);
	assert_eq!(logs.len(), 2);
	assert_eq!(logs[0].entry.timestamp, Timestamp(102));

	let (logs, total) = adapter
		.list_access_logs(&ListAccessLogOptions { success: Some(false), limit: 50, ..Default::default() })
		.await
		.expect("list");
	assert_eq!(total, 1);
	assert_eq!(logs[0].entry.status_code, 404);
	assert!(!logs[0].entry.success);
}

#[tokio::test]
async fn test_access_stats() {
	let (adapter, _temp) = create_test_adapter().await;

	// Outside the window
	adapter.create_access_log(&log_entry("10.0.0.9", "/old", 200, 10)).await.expect("log");

	adapter.create_access_log(&log_entry("10.0.0.1", "/api/health", 200, 100)).await.expect("log");
	adapter.create_access_log(&log_entry("10.0.0.1", "/api/health", 200, 101)).await.expect("log");
	adapter.create_access_log(&log_entry("10.0.0.2", "/api/health", 200, 102)).await.expect("log");
	adapter.create_access_log(&log_entry("10.0.0.2", "/api/missing", 404, 103)).await.expect("log");

	let stats = adapter.read_access_stats(Timestamp(100), 10).await.expect("stats");
	assert_eq!(stats.total_requests, 4);
	assert_eq!(stats.successful_requests, 3);
	assert_eq!(stats.failed_requests, 1);
	assert_eq!(stats.unique_ips, 2);
	assert_eq!(stats.top_endpoints.len(), 2);
	assert_eq!(&*stats.top_endpoints[0].path, "/api/health");
	assert_eq!(stats.top_endpoints[0].count, 3);

	let empty = adapter.read_access_stats(Timestamp(1_000), 10).await.expect("stats");
	assert_eq!(empty.total_requests, 0);
	assert_eq!(empty.successful_requests, 0);
	assert!(empty.top_endpoints.is_empty());
}

// vim: ts=4

//! Settings service tests
//!
//! Default document creation, cache staleness and validated updates.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MemoryMetaAdapter;
use printq_core::password;
use printq_core::settings::service::SETTINGS_KEY;
use printq_core::settings::{SettingsPatch, SettingsProvider, SettingsService};
use printq_types::prelude::*;

fn service(meta: &Arc<MemoryMetaAdapter>) -> SettingsService {
	SettingsService::new(meta.clone(), "letmein")
}

#[tokio::test]
async fn test_first_read_creates_defaults() {
	let meta = MemoryMetaAdapter::new();
	let settings = service(&meta).get().await.expect("settings");

	assert_eq!(settings.lockout_attempts, 3);
	assert_eq!(settings.lockout_duration, 15);
	assert!(
		password::check_password("letmein".into(), settings.admin_password.clone())
			.await
			.expect("verify")
	);
	assert!(meta.raw_setting(SETTINGS_KEY).is_some());
}

#[tokio::test]
async fn test_cached_reads_skip_the_adapter() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);

	service.get().await.expect("settings");
	let reads = meta.setting_reads();
	service.get().await.expect("settings");
	service.get().await.expect("settings");

	assert_eq!(meta.setting_reads(), reads);
}

#[tokio::test]
async fn test_external_change_visible_after_staleness_bound() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);
	service.get().await.expect("settings");
	tokio::time::pause();

	let mut raw = meta.raw_setting(SETTINGS_KEY).expect("stored");
	raw["lockoutAttempts"] = serde_json::json!(7);
	meta.put_raw_setting(SETTINGS_KEY, raw);

	tokio::time::advance(Duration::from_secs(59)).await;
	assert_eq!(service.get().await.expect("settings").lockout_attempts, 3);

	tokio::time::advance(Duration::from_secs(2)).await;
	assert_eq!(service.get().await.expect("settings").lockout_attempts, 7);
}

#[tokio::test]
async fn test_update_reads_stored_document_once() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);
	service.get().await.expect("settings");

	let reads = meta.setting_reads();
	service
		.update(SettingsPatch { lockout_attempts: Some(4), ..SettingsPatch::default() })
		.await
		.expect("update");

	assert_eq!(meta.setting_reads(), reads + 1);
	assert_eq!(meta.raw_setting(SETTINGS_KEY).expect("stored")["lockoutAttempts"], 4);
}

#[tokio::test]
async fn test_update_creates_missing_document() {
	let meta = MemoryMetaAdapter::new();
	let settings = service(&meta)
		.update(SettingsPatch { lockout_duration: Some(45), ..SettingsPatch::default() })
		.await
		.expect("update");

	assert_eq!(settings.lockout_duration, 45);
	assert_eq!(settings.lockout_attempts, 3);
	assert!(
		password::check_password("letmein".into(), settings.admin_password.clone())
			.await
			.expect("verify")
	);
	assert_eq!(meta.setting_reads(), 1);
}

#[tokio::test]
async fn test_local_update_visible_immediately() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);
	service.get().await.expect("settings");

	service
		.update(SettingsPatch {
			lockout_attempts: Some(5),
			lockout_duration: Some(30),
			..SettingsPatch::default()
		})
		.await
		.expect("update");

	let settings = service.get().await.expect("settings");
	assert_eq!(settings.lockout_attempts, 5);
	assert_eq!(settings.lockout_duration, 30);
}

#[tokio::test]
async fn test_update_rejects_zero_lockout_attempts() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);

	let res = service
		.update(SettingsPatch { lockout_attempts: Some(0), ..SettingsPatch::default() })
		.await;

	assert!(matches!(res, Err(Error::ValidationError(_))));
	assert_eq!(service.get().await.expect("settings").lockout_attempts, 3);
}

#[tokio::test]
async fn test_update_rehashes_admin_password() {
	let meta = MemoryMetaAdapter::new();
	let service = service(&meta);

	let settings = service
		.update(SettingsPatch { admin_password: Some("n3w".into()), ..SettingsPatch::default() })
		.await
		.expect("update");

	assert_ne!(&*settings.admin_password, "n3w");
	assert!(
		password::check_password("n3w".into(), settings.admin_password.clone())
			.await
			.expect("verify")
	);
}

#[tokio::test]
async fn test_invalid_stored_document_is_an_error() {
	let meta = MemoryMetaAdapter::new();
	meta.put_raw_setting(SETTINGS_KEY, serde_json::json!({ "lockoutAttempts": 0 }));

	assert!(matches!(service(&meta).get().await, Err(Error::Internal(_))));
}

// vim: ts=4

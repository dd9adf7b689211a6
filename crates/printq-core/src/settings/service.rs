//! Settings service with caching and validation

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use printq_types::meta_adapter::MetaAdapter;

use super::types::{ServerSettings, SettingsPatch};
use crate::password;
use crate::prelude::*;

/// Key of the settings document in the meta adapter
pub const SETTINGS_KEY: &str = "server";

/// How long a cached settings document may be served
pub const MAX_STALENESS: Duration = Duration::from_secs(60);

/// Source of the current server settings
///
/// Updates made through the provider are visible immediately. Updates made
/// elsewhere become visible within the provider's staleness bound.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
	async fn get(&self) -> ClResult<Arc<ServerSettings>>;

	async fn update(&self, patch: SettingsPatch) -> ClResult<Arc<ServerSettings>>;

	/// Forces the next `get` to re-read the stored document
	fn clear_cache(&self);
}

struct CachedSettings {
	settings: Arc<ServerSettings>,
	fetched_at: Instant,
}

pub struct SettingsService {
	meta: Arc<dyn MetaAdapter>,
	default_admin_password: Box<str>,
	max_age: Duration,
	cache: RwLock<Option<CachedSettings>>,
	// Serializes document creation and updates
	write_lock: tokio::sync::Mutex<()>,
}

impl SettingsService {
	pub fn new(meta: Arc<dyn MetaAdapter>, default_admin_password: impl Into<Box<str>>) -> Self {
		Self {
			meta,
			default_admin_password: default_admin_password.into(),
			max_age: MAX_STALENESS,
			cache: RwLock::new(None),
			write_lock: tokio::sync::Mutex::new(()),
		}
	}

	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = max_age;
		self
	}

	fn cached(&self) -> Option<Arc<ServerSettings>> {
		self.cache
			.read()
			.as_ref()
			.filter(|cached| cached.fetched_at.elapsed() < self.max_age)
			.map(|cached| cached.settings.clone())
	}

	fn store_cache(&self, settings: Arc<ServerSettings>) {
		*self.cache.write() = Some(CachedSettings { settings, fetched_at: Instant::now() });
	}

	async fn read_stored(&self) -> ClResult<Option<ServerSettings>> {
		let Some(value) = self.meta.read_setting(SETTINGS_KEY).await? else {
			return Ok(None);
		};
		let settings: ServerSettings = serde_json::from_value(value).map_err(|err| {
			error!("Stored server settings are malformed: {}", err);
			Error::Internal("malformed server settings".into())
		})?;
		if let Err(err) = settings.validate() {
			error!("Stored server settings are invalid: {}", err);
			return Err(Error::Internal("invalid server settings".into()));
		}
		Ok(Some(settings))
	}

	async fn write_stored(&self, settings: &ServerSettings) -> ClResult<()> {
		let value = serde_json::to_value(settings)?;
		self.meta.update_setting(SETTINGS_KEY, Some(value)).await
	}

	async fn default_settings(&self) -> ClResult<ServerSettings> {
		Ok(ServerSettings {
			admin_password: password::hash_password(self.default_admin_password.clone()).await?,
			updated_at: Timestamp::now(),
			..ServerSettings::default()
		})
	}

	/// Reads the stored document, creating it with defaults on first use
	async fn load(&self) -> ClResult<ServerSettings> {
		if let Some(settings) = self.read_stored().await? {
			return Ok(settings);
		}

		let _lock = self.write_lock.lock().await;
		// Someone else may have created it while we waited
		if let Some(settings) = self.read_stored().await? {
			return Ok(settings);
		}

		let settings = self.default_settings().await?;
		self.write_stored(&settings).await?;
		info!("Created default server settings");
		Ok(settings)
	}
}

#[async_trait]
impl SettingsProvider for SettingsService {
	async fn get(&self) -> ClResult<Arc<ServerSettings>> {
		if let Some(settings) = self.cached() {
			return Ok(settings);
		}

		let settings = Arc::new(self.load().await?);
		self.store_cache(settings.clone());
		debug!("Server settings reloaded");
		Ok(settings)
	}

	async fn update(&self, patch: SettingsPatch) -> ClResult<Arc<ServerSettings>> {
		let _lock = self.write_lock.lock().await;
		let mut settings = match self.read_stored().await? {
			Some(settings) => settings,
			None => self.default_settings().await?,
		};
		let new_password = settings.apply(patch);
		settings.validate()?;
		if let Some(new_password) = new_password {
			settings.admin_password = password::hash_password(new_password).await?;
		}
		settings.updated_at = Timestamp::now();

		self.write_stored(&settings).await?;
		let settings = Arc::new(settings);
		self.store_cache(settings.clone());
		info!("Server settings updated");
		Ok(settings)
	}

	fn clear_cache(&self) {
		*self.cache.write() = None;
	}
}

// vim: ts=4

//! App builder - constructs and runs the printq application

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::meta_adapter::MetaAdapter;
use crate::prelude::*;
use crate::routes;
use printq_core::access::{AccessLogger, BanService};
use printq_core::rate_limit::{AdminRegisterGuard, RateLimiter};
use printq_core::settings::{SettingsProvider, SettingsService};
pub use printq_core::app::{App, AppBuilderOpts, AppState, BanCheckPolicy, ServerMode, VERSION};

/// How often expired bans are removed from the ban list
const BAN_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub struct AppBuilder {
	opts: AppBuilderOpts,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Ignore the error when a subscriber is already installed (several apps in one process)
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { opts: AppBuilderOpts::default(), meta_adapter: None }
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}

	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}

	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.jwt_secret = jwt_secret.into();
		self
	}

	pub fn token_expire_hours(&mut self, hours: u32) -> &mut Self {
		self.opts.token_expire_hours = hours;
		self
	}

	pub fn ban_check_policy(&mut self, policy: BanCheckPolicy) -> &mut Self {
		self.opts.ban_check_policy = policy;
		self
	}

	pub fn default_admin_password(&mut self, password: impl Into<Box<str>>) -> &mut Self {
		self.opts.default_admin_password = password.into();
		self
	}

	pub fn rate_limit_capacity(&mut self, max_tracked_ips: NonZeroUsize) -> &mut Self {
		self.opts.rate_limit.max_tracked_ips = max_tracked_ips;
		self
	}

	pub fn rate_limit_ttl(&mut self, entry_ttl: Duration) -> &mut Self {
		self.opts.rate_limit.entry_ttl = entry_ttl;
		self
	}

	// Adapters
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.meta_adapter = Some(meta_adapter);
		self
	}

	/// Builds the application state without starting any background task
	pub async fn build(self) -> ClResult<App> {
		let Some(meta_adapter) = self.meta_adapter else {
			error!("FATAL: No meta adapter configured");
			return Err(Error::Internal("No meta adapter configured".to_string()));
		};
		if self.opts.jwt_secret.is_empty() {
			error!("FATAL: No JWT secret configured");
			return Err(Error::Internal("No JWT secret configured".to_string()));
		}

		let settings: Arc<dyn SettingsProvider> = Arc::new(SettingsService::new(
			meta_adapter.clone(),
			self.opts.default_admin_password.clone(),
		));
		// Creates the settings document on first start
		let loaded = settings.get().await.inspect_err(|err| {
			error!("FATAL: Cannot load server settings: {}", err);
		})?;
		info!(
			lockout_attempts = loaded.lockout_attempts,
			lockout_duration = loaded.lockout_duration,
			"Server settings loaded"
		);

		info!(
			capacity = self.opts.rate_limit.max_tracked_ips.get(),
			ttl_secs = self.opts.rate_limit.entry_ttl.as_secs(),
			"Admin registration rate limiter initialized"
		);

		let app: App = Arc::new(AppState {
			admin_register: AdminRegisterGuard::new(RateLimiter::new(&self.opts.rate_limit)),
			bans: Arc::new(BanService::new(meta_adapter.clone())),
			access_log: Arc::new(AccessLogger::new(meta_adapter.clone())),
			settings,
			meta_adapter,
			opts: self.opts,
		});

		Ok(app)
	}

	pub async fn run(self) -> ClResult<()> {
		info!("printq V{}", VERSION);

		let app = self.build().await?;
		let router = routes::init(app.clone());

		// Periodic ban list maintenance
		{
			let app = app.clone();
			tokio::spawn(async move {
				loop {
					tokio::time::sleep(BAN_PURGE_INTERVAL).await;
					if let Err(e) = app.bans.purge_expired(Timestamp::now()).await {
						warn!("Failed to purge expired IP bans: {}", e);
					}
				}
			});
		}

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!(mode = ?app.opts.mode, "Listening on HTTP {}", app.opts.listen);

		axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4

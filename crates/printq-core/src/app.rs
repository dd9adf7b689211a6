//! App state type

use std::str::FromStr;
use std::sync::Arc;

use printq_types::meta_adapter::MetaAdapter;

use crate::access::{BanService, ResponseObserver};
use crate::prelude::*;
use crate::rate_limit::{AdminRegisterGuard, RateLimitConfig};
use crate::settings::SettingsProvider;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
	/// Clients connect directly, the socket peer is the client
	Standalone,
	/// Behind a reverse proxy, forwarding headers are trusted
	Proxy,
}

impl FromStr for ServerMode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"standalone" => Ok(ServerMode::Standalone),
			"proxy" => Ok(ServerMode::Proxy),
			_ => Err(Error::ValidationError(format!("invalid server mode: {}", s))),
		}
	}
}

/// What the ban gate does when the ban list cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BanCheckPolicy {
	/// Let the request through
	#[default]
	FailOpen,
	/// Reject the request with 503
	FailClosed,
}

impl FromStr for BanCheckPolicy {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().replace('_', "-").as_str() {
			"fail-open" | "open" => Ok(BanCheckPolicy::FailOpen),
			"fail-closed" | "closed" => Ok(BanCheckPolicy::FailClosed),
			_ => Err(Error::ValidationError(format!("invalid ban check policy: {}", s))),
		}
	}
}

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub meta_adapter: Arc<dyn MetaAdapter>,

	// Settings subsystem
	pub settings: Arc<dyn SettingsProvider>,

	// Admin registration rate limiter
	pub admin_register: AdminRegisterGuard,

	// Ban list and access log
	pub bans: Arc<BanService>,
	pub access_log: Arc<dyn ResponseObserver>,
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	pub jwt_secret: Box<str>,
	/// Lifetime of issued access tokens
	pub token_expire_hours: u32,
	pub ban_check_policy: BanCheckPolicy,
	/// Admin password used when the settings document is first created
	pub default_admin_password: Box<str>,
	pub rate_limit: RateLimitConfig,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			mode: ServerMode::Standalone,
			listen: "127.0.0.1:8080".into(),
			jwt_secret: "".into(),
			token_expire_hours: 8,
			ban_check_policy: BanCheckPolicy::FailOpen,
			default_admin_password: "admin".into(),
			rate_limit: RateLimitConfig::default(),
		}
	}
}


// vim: ts=4

//! Server settings document

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::rate_limit::LockoutPolicy;

/// Runtime configuration persisted through the meta adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
	pub smtp_host: Box<str>,
	pub smtp_port: u16,
	pub smtp_user: Box<str>,
	pub smtp_pass: Box<str>,
	pub smtp_sender_name: Box<str>,
	/// bcrypt hash
	pub admin_password: Box<str>,
	pub max_queue_items: u32,
	/// Failed admin password attempts before lockout
	pub lockout_attempts: u32,
	/// Lockout window in minutes
	pub lockout_duration: u32,
	pub app_url: Box<str>,
	pub notify_admins_on_new_request: bool,
	pub updated_at: Timestamp,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			smtp_host: "smtp.gmail.com".into(),
			smtp_port: 587,
			smtp_user: "".into(),
			smtp_pass: "".into(),
			smtp_sender_name: "3D Print Queue".into(),
			admin_password: "".into(),
			max_queue_items: 5,
			lockout_attempts: 3,
			lockout_duration: 15,
			app_url: "http://localhost:8080".into(),
			notify_admins_on_new_request: true,
			updated_at: Timestamp(0),
		}
	}
}

impl ServerSettings {
	pub fn lockout_policy(&self) -> ClResult<LockoutPolicy> {
		LockoutPolicy::new(self.lockout_attempts, self.lockout_duration)
	}

	pub fn validate(&self) -> ClResult<()> {
		self.lockout_policy()?;
		if self.smtp_port == 0 {
			return Err(Error::ValidationError("smtpPort must be a valid port".into()));
		}
		Ok(())
	}

	/// Applies a partial update. Returns the new admin password (plain text) if one was given.
	///
	/// Empty `smtpPass` and `adminPassword` values leave the stored secret untouched.
	pub fn apply(&mut self, patch: SettingsPatch) -> Option<Box<str>> {
		if let Some(smtp_host) = patch.smtp_host {
			self.smtp_host = smtp_host;
		}
		if let Some(smtp_port) = patch.smtp_port {
			self.smtp_port = smtp_port;
		}
		if let Some(smtp_user) = patch.smtp_user {
			self.smtp_user = smtp_user;
		}
		if let Some(smtp_pass) = patch.smtp_pass.filter(|p| !p.is_empty()) {
			self.smtp_pass = smtp_pass;
		}
		if let Some(smtp_sender_name) = patch.smtp_sender_name {
			self.smtp_sender_name = smtp_sender_name;
		}
		if let Some(max_queue_items) = patch.max_queue_items {
			self.max_queue_items = max_queue_items;
		}
		if let Some(lockout_attempts) = patch.lockout_attempts {
			self.lockout_attempts = lockout_attempts;
		}
		if let Some(lockout_duration) = patch.lockout_duration {
			self.lockout_duration = lockout_duration;
		}
		if let Some(app_url) = patch.app_url {
			self.app_url = app_url;
		}
		if let Some(notify) = patch.notify_admins_on_new_request {
			self.notify_admins_on_new_request = notify;
		}
		patch.admin_password.filter(|p| !p.is_empty())
	}
}

/// Partial settings update
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
	pub smtp_host: Option<Box<str>>,
	pub smtp_port: Option<u16>,
	pub smtp_user: Option<Box<str>>,
	pub smtp_pass: Option<Box<str>>,
	pub smtp_sender_name: Option<Box<str>>,
	/// Plain text, hashed before it is stored
	pub admin_password: Option<Box<str>>,
	pub max_queue_items: Option<u32>,
	#[serde(alias = "maxLoginAttempts")]
	pub lockout_attempts: Option<u32>,
	pub lockout_duration: Option<u32>,
	pub app_url: Option<Box<str>>,
	pub notify_admins_on_new_request: Option<bool>,
}

/// Settings as shown to administrators, secrets replaced by presence flags
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
	pub smtp_host: Box<str>,
	pub smtp_port: u16,
	pub smtp_user: Box<str>,
	pub smtp_sender_name: Box<str>,
	pub has_smtp_pass: bool,
	pub has_admin_password: bool,
	pub max_queue_items: u32,
	pub lockout_attempts: u32,
	pub lockout_duration: u32,
	pub app_url: Box<str>,
	pub notify_admins_on_new_request: bool,
	#[serde(serialize_with = "printq_types::types::serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

impl From<&ServerSettings> for SettingsView {
	fn from(settings: &ServerSettings) -> Self {
		Self {
			smtp_host: settings.smtp_host.clone(),
			smtp_port: settings.smtp_port,
			smtp_user: settings.smtp_user.clone(),
			smtp_sender_name: settings.smtp_sender_name.clone(),
			has_smtp_pass: !settings.smtp_pass.is_empty(),
			has_admin_password: !settings.admin_password.is_empty(),
			max_queue_items: settings.max_queue_items,
			lockout_attempts: settings.lockout_attempts,
			lockout_duration: settings.lockout_duration,
			app_url: settings.app_url.clone(),
			notify_admins_on_new_request: settings.notify_admins_on_new_request,
			updated_at: settings.updated_at,
		}
	}
}


// vim: ts=4

//! Server settings types and service

pub mod service;
pub mod types;

pub use service::{SettingsProvider, SettingsService};
pub use types::{ServerSettings, SettingsPatch, SettingsView};

// vim: ts=4

//! printq is a self-hosted 3D print queue server.
//!
//! This crate assembles the application: it wires the persistence adapter
//! into the shared state, mounts the public and admin routes behind the
//! access guard and runs the HTTP server together with the periodic ban list
//! maintenance.

// Re-export shared types and adapter traits from printq-types
pub use printq_types::error;
pub use printq_types::meta_adapter;
pub use printq_types::types;

// Feature crate re-exports
pub use printq_admin as admin;
pub use printq_auth as auth;
pub use printq_core::access;
pub use printq_core::rate_limit;
pub use printq_core::settings;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder, BanCheckPolicy, ServerMode};

// vim: ts=4

//! Core infrastructure for printq.
//!
//! Holds the application state shared by the feature crates together with the
//! pieces that sit in front of every request: the IP ban gate, the access log
//! layer, client address extraction and admin authentication. The admin
//! registration rate limiter and the server settings service live here too.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod app;
pub mod extract;
pub mod middleware;
pub mod password;
pub mod prelude;
pub mod rate_limit;
pub mod settings;
pub mod token;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState, BanCheckPolicy, ServerMode};
pub use extract::{Auth, AuthCtx, OptionalAuth};

// vim: ts=4

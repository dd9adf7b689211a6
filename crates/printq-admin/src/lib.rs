//! Admin API handlers for server administration

pub mod ban;
pub mod log;
pub mod settings;

mod prelude;

// vim: ts=4

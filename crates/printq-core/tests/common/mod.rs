//! Common test utilities and helpers
//!
//! Shared by the integration tests of this crate: an in-memory meta adapter
//! and an observer that collects access log entries.

#![allow(dead_code)]

pub mod adapters;

pub use adapters::*;

// vim: ts=4

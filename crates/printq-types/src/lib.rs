//! Shared types, adapter traits, and core utilities for printq.
//!
//! This crate contains the foundational types that are shared between the
//! feature crates and the persistence adapters. Keeping them separate lets
//! adapter crates compile in parallel with the server's feature modules.

pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod types;

// vim: ts=4

//! Authentication subsystem.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;

mod prelude;

// vim: ts=4

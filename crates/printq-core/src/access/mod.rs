//! IP ban gate and access logging

pub mod ban;
pub mod log;
pub mod middleware;

pub use ban::{BanRequest, BanService};
pub use log::{AccessLogger, ResponseObserver};
pub use middleware::AccessGuardLayer;

// vim: ts=4

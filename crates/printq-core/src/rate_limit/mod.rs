//! Admin registration rate limiting
//!
//! Failed admin password attempts are counted per client address. Once an
//! address reaches the configured number of failures it is locked out until
//! the lockout window expires. The window slides on every failure.

pub mod config;
pub mod extractors;
pub mod guard;
pub mod limiter;
pub mod store;

pub use config::{LockoutPolicy, RateLimitConfig};
pub use extractors::extract_client_ip;
pub use guard::{AdminRegisterGuard, RegistrationPermit};
pub use limiter::{RateLimitDecision, RateLimiter};
pub use store::{AttemptEntry, AttemptStore, LruAttemptStore};

// vim: ts=4

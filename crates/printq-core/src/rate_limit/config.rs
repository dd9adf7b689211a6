//! Rate Limiting Configuration

use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use crate::prelude::*;

/// Bounds of the in-memory attempt cache
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
	/// Maximum number of IPs to track (memory limit)
	pub max_tracked_ips: NonZeroUsize,
	/// How long to retain entries after their last update
	pub entry_ttl: Duration,
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		// Non-zero constant
		const MAX_TRACKED_IPS: NonZeroUsize = match NonZeroUsize::new(1000) {
			Some(v) => v,
			None => unreachable!(),
		};
		Self { max_tracked_ips: MAX_TRACKED_IPS, entry_ttl: Duration::from_secs(3600) }
	}
}

/// Lockout parameters, read from the server settings on every evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
	pub max_attempts: NonZeroU32,
	pub lockout_duration_minutes: NonZeroU32,
}

impl LockoutPolicy {
	pub fn new(max_attempts: u32, lockout_duration_minutes: u32) -> ClResult<Self> {
		let max_attempts = NonZeroU32::new(max_attempts).ok_or_else(|| {
			Error::ValidationError("lockoutAttempts must be at least 1".into())
		})?;
		let lockout_duration_minutes = NonZeroU32::new(lockout_duration_minutes).ok_or_else(|| {
			Error::ValidationError("lockoutDuration must be at least 1 minute".into())
		})?;
		Ok(Self { max_attempts, lockout_duration_minutes })
	}

	pub fn lockout_seconds(&self) -> i64 {
		i64::from(self.lockout_duration_minutes.get()) * 60
	}
}

impl Default for LockoutPolicy {
	fn default() -> Self {
		// Both constants are non-zero
		const MAX_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
			Some(v) => v,
			None => unreachable!(),
		};
		const LOCKOUT_MINUTES: NonZeroU32 = match NonZeroU32::new(15) {
			Some(v) => v,
			None => unreachable!(),
		};
		Self { max_attempts: MAX_ATTEMPTS, lockout_duration_minutes: LOCKOUT_MINUTES }
	}
}


// vim: ts=4

//! Admin registration rate limiter
//!
//! Counts failed admin password attempts per client address. Every operation
//! is a short critical section on the attempt store and never suspends.

use std::sync::Arc;

use super::config::{LockoutPolicy, RateLimitConfig};
use super::store::{AttemptEntry, AttemptStore, LruAttemptStore};
use crate::prelude::*;

/// Outcome of a rate limit evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
	Allowed { remaining_attempts: u32 },
	Locked { locked_until: Timestamp },
}

impl RateLimitDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, RateLimitDecision::Allowed { .. })
	}

	pub fn remaining_attempts(&self) -> Option<u32> {
		match self {
			RateLimitDecision::Allowed { remaining_attempts } => Some(*remaining_attempts),
			RateLimitDecision::Locked { .. } => None,
		}
	}

	pub fn locked_until(&self) -> Option<Timestamp> {
		match self {
			RateLimitDecision::Allowed { .. } => None,
			RateLimitDecision::Locked { locked_until } => Some(*locked_until),
		}
	}
}

pub struct RateLimiter {
	store: Arc<dyn AttemptStore>,
}

impl RateLimiter {
	pub fn new(config: &RateLimitConfig) -> Self {
		Self::with_store(Arc::new(LruAttemptStore::new(config)))
	}

	pub fn with_store(store: Arc<dyn AttemptStore>) -> Self {
		Self { store }
	}

	pub fn check(&self, ip: &str, policy: &LockoutPolicy) -> RateLimitDecision {
		self.check_at(ip, policy, Timestamp::now())
	}

	/// Evaluates whether `ip` may attempt an admin registration at `now`.
	///
	/// An entry whose lockout already expired is dropped and the address gets
	/// its full allowance back.
	pub fn check_at(&self, ip: &str, policy: &LockoutPolicy, now: Timestamp) -> RateLimitDecision {
		let max_attempts = policy.max_attempts.get();
		let mut decision = RateLimitDecision::Allowed { remaining_attempts: max_attempts };

		self.store.modify(ip, now, &mut |slot| match *slot {
			None => {}
			Some(entry) if now >= entry.lockout_expires_at => *slot = None,
			Some(entry) if entry.failure_count >= max_attempts => {
				decision = RateLimitDecision::Locked { locked_until: entry.lockout_expires_at };
			}
			Some(entry) => {
				decision = RateLimitDecision::Allowed {
					remaining_attempts: max_attempts - entry.failure_count,
				};
			}
		});

		decision
	}

	pub fn record_failure(&self, ip: &str, policy: &LockoutPolicy) -> RateLimitDecision {
		self.record_failure_at(ip, policy, Timestamp::now())
	}

	/// Records a failed attempt and returns the state it leaves the address in.
	///
	/// The lockout window restarts at `now` on every failure. A failure after
	/// the previous window expired starts counting from one again.
	pub fn record_failure_at(
		&self,
		ip: &str,
		policy: &LockoutPolicy,
		now: Timestamp,
	) -> RateLimitDecision {
		let lockout_expires_at = now.add_seconds(policy.lockout_seconds());
		let mut failure_count = 0;

		self.store.modify(ip, now, &mut |slot| {
			failure_count = match *slot {
				Some(entry) if now < entry.lockout_expires_at => entry.failure_count.saturating_add(1),
				_ => 1,
			};
			*slot = Some(AttemptEntry { failure_count, lockout_expires_at });
		});

		let max_attempts = policy.max_attempts.get();
		if failure_count >= max_attempts {
			debug!("Admin registration locked for {} until {}", ip, lockout_expires_at);
			RateLimitDecision::Locked { locked_until: lockout_expires_at }
		} else {
			RateLimitDecision::Allowed { remaining_attempts: max_attempts - failure_count }
		}
	}

	pub fn clear(&self, ip: &str) {
		self.store.remove(ip);
	}

	/// Current counter for `ip`, if one is tracked
	pub fn attempts(&self, ip: &str) -> Option<AttemptEntry> {
		self.store.peek(ip, Timestamp::now())
	}

	pub fn tracked_addresses(&self) -> usize {
		self.store.len()
	}
}

impl Default for RateLimiter {
	fn default() -> Self {
		Self::new(&RateLimitConfig::default())
	}
}


// vim: ts=4

//! Serializes admin registration attempts per client address
//!
//! A `RegistrationPermit` is taken before the rate limit check and held until
//! the outcome is recorded, so two racing requests from the same address can
//! not both pass the check after the last allowed failure. Different
//! addresses never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

use super::config::LockoutPolicy;
use super::limiter::{RateLimitDecision, RateLimiter};

struct AddressLock {
	lock: Arc<tokio::sync::Mutex<()>>,
	/// Permits held or awaited for the address
	users: usize,
}

pub struct AdminRegisterGuard {
	limiter: RateLimiter,
	locks: Mutex<HashMap<Box<str>, AddressLock>>,
}

impl AdminRegisterGuard {
	pub fn new(limiter: RateLimiter) -> Self {
		Self { limiter, locks: Mutex::new(HashMap::new()) }
	}

	pub fn limiter(&self) -> &RateLimiter {
		&self.limiter
	}

	/// Waits for exclusive access to `ip` and evaluates its rate limit
	pub async fn evaluate(&self, ip: &str, policy: LockoutPolicy) -> RegistrationPermit<'_> {
		// Dropped with the future if the wait is cancelled
		let (user, lock) = self.enter(ip);
		let guard = lock.lock_owned().await;
		let decision = self.limiter.check(ip, &policy);

		RegistrationPermit { _guard: guard, user, policy, decision }
	}

	/// Number of addresses with an outstanding or awaited permit
	pub fn pending(&self) -> usize {
		self.locks.lock().len()
	}

	fn enter(&self, ip: &str) -> (AddressUser<'_>, Arc<tokio::sync::Mutex<()>>) {
		let mut locks = self.locks.lock();
		let entry = locks
			.entry(ip.into())
			.or_insert_with(|| AddressLock { lock: Arc::default(), users: 0 });
		entry.users += 1;
		(AddressUser { owner: self, ip: ip.into() }, entry.lock.clone())
	}

	fn leave(&self, ip: &str) {
		let mut locks = self.locks.lock();
		let idle = locks.get_mut(ip).is_some_and(|entry| {
			entry.users = entry.users.saturating_sub(1);
			entry.users == 0
		});
		if idle {
			locks.remove(ip);
		}
	}
}

/// One holder or waiter of an address lock
struct AddressUser<'a> {
	owner: &'a AdminRegisterGuard,
	ip: Box<str>,
}

impl Drop for AddressUser<'_> {
	fn drop(&mut self) {
		self.owner.leave(&self.ip);
	}
}

/// Exclusive right to attempt an admin registration from one address
pub struct RegistrationPermit<'a> {
	// Released before the address is left
	_guard: OwnedMutexGuard<()>,
	user: AddressUser<'a>,
	policy: LockoutPolicy,
	decision: RateLimitDecision,
}

impl RegistrationPermit<'_> {
	pub fn decision(&self) -> RateLimitDecision {
		self.decision
	}

	pub fn ip(&self) -> &str {
		&self.user.ip
	}

	/// Records a wrong admin password and releases the address
	pub fn record_failure(self) -> RateLimitDecision {
		self.user.owner.limiter.record_failure(&self.user.ip, &self.policy)
	}

	/// Records a successful registration and releases the address
	pub fn record_success(self) {
		self.user.owner.limiter.clear(&self.user.ip);
	}
}


// vim: ts=4

//! Attempt store
//!
//! Keeps the failed attempt counters. The default implementation is an LRU
//! cache bounded by capacity and by a time-to-live that never cuts an active
//! lockout short.

use lru::LruCache;
use parking_lot::Mutex;

use super::config::RateLimitConfig;
use crate::prelude::*;

/// Failed attempt counter for one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptEntry {
	pub failure_count: u32,
	pub lockout_expires_at: Timestamp,
}

/// Storage for attempt counters, keyed by client address
pub trait AttemptStore: Send + Sync {
	/// Runs `f` on the slot for `ip` while holding the store's lock.
	///
	/// Whatever `f` leaves in the slot is written back, `None` removes the entry.
	/// Entries whose time-to-live elapsed before `now` are presented as `None`.
	fn modify(&self, ip: &str, now: Timestamp, f: &mut dyn FnMut(&mut Option<AttemptEntry>));

	/// Reads the entry for `ip` without touching its recency
	fn peek(&self, ip: &str, now: Timestamp) -> Option<AttemptEntry>;

	fn remove(&self, ip: &str);

	/// Number of tracked addresses, including entries not yet evicted by TTL
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Debug, Clone, Copy)]
struct StoredEntry {
	entry: AttemptEntry,
	evict_after: Timestamp,
}

pub struct LruAttemptStore {
	entries: Mutex<LruCache<Box<str>, StoredEntry>>,
	ttl_secs: i64,
}

impl LruAttemptStore {
	pub fn new(config: &RateLimitConfig) -> Self {
		let ttl_secs = i64::try_from(config.entry_ttl.as_secs()).unwrap_or(i64::MAX);
		Self { entries: Mutex::new(LruCache::new(config.max_tracked_ips)), ttl_secs }
	}
}

impl Default for LruAttemptStore {
	fn default() -> Self {
		Self::new(&RateLimitConfig::default())
	}
}

impl AttemptStore for LruAttemptStore {
	fn modify(&self, ip: &str, now: Timestamp, f: &mut dyn FnMut(&mut Option<AttemptEntry>)) {
		let mut entries = self.entries.lock();

		let current = match entries.peek(ip).copied() {
			Some(stored) if now >= stored.evict_after => {
				entries.pop(ip);
				None
			}
			Some(stored) => Some(stored.entry),
			None => None,
		};

		let mut slot = current;
		f(&mut slot);

		match slot {
			Some(_) if slot == current => {
				entries.promote(ip);
			}
			Some(entry) => {
				// An entry stays until both its lockout and its TTL have run out
				let evict_after = now.add_seconds(self.ttl_secs).max(entry.lockout_expires_at);
				entries.put(ip.into(), StoredEntry { entry, evict_after });
			}
			None => {
				if current.is_some() {
					entries.pop(ip);
				}
			}
		}
	}

	fn peek(&self, ip: &str, now: Timestamp) -> Option<AttemptEntry> {
		self.entries
			.lock()
			.peek(ip)
			.filter(|stored| now < stored.evict_after)
			.map(|stored| stored.entry)
	}

	fn remove(&self, ip: &str) {
		self.entries.lock().pop(ip);
	}

	fn len(&self) -> usize {
		self.entries.lock().len()
	}
}


// vim: ts=4

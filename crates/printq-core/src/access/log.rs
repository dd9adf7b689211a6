//! Access log
//!
//! One entry is produced per request once its response is known. Persisting it
//! happens in the background and never affects the response.

use std::sync::Arc;

use printq_types::meta_adapter::{AccessLogEntry, MetaAdapter};

use crate::prelude::*;

/// Receives the access log entry of every finished request, exactly once
pub trait ResponseObserver: Send + Sync {
	/// Called on the request path, must not block
	fn on_response_finalized(&self, entry: AccessLogEntry);
}

/// Persists access log entries through the meta adapter
pub struct AccessLogger {
	meta: Arc<dyn MetaAdapter>,
}

impl AccessLogger {
	pub fn new(meta: Arc<dyn MetaAdapter>) -> Self {
		Self { meta }
	}
}

impl ResponseObserver for AccessLogger {
	fn on_response_finalized(&self, entry: AccessLogEntry) {
		let meta = self.meta.clone();
		tokio::spawn(async move {
			if let Err(err) = meta.create_access_log(&entry).await {
				warn!(ip = %entry.ip, path = %entry.path, "Failed to record access log: {}", err);
			}
		});
	}
}

// vim: ts=4

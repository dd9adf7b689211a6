//! Access guard middleware
//!
//! Tower layer wrapped around every route. It resolves the client address,
//! rejects banned addresses before dispatch and reports one access log entry
//! per request once the response is known.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, header};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use printq_types::meta_adapter::AccessLogEntry;

use super::ban::BanService;
use super::log::ResponseObserver;
use crate::app::{BanCheckPolicy, ServerMode};
use crate::extract::{Auth, ClientAddr};
use crate::prelude::*;
use crate::rate_limit::extract_client_ip;

/// Access guard middleware layer
#[derive(Clone)]
pub struct AccessGuardLayer {
	bans: Arc<BanService>,
	observer: Arc<dyn ResponseObserver>,
	mode: ServerMode,
	policy: BanCheckPolicy,
}

impl AccessGuardLayer {
	pub fn new(
		bans: Arc<BanService>,
		observer: Arc<dyn ResponseObserver>,
		mode: ServerMode,
		policy: BanCheckPolicy,
	) -> Self {
		Self { bans, observer, mode, policy }
	}

	pub fn from_app(app: &App) -> Self {
		Self::new(
			app.bans.clone(),
			app.access_log.clone(),
			app.opts.mode,
			app.opts.ban_check_policy,
		)
	}
}

impl<S> Layer<S> for AccessGuardLayer {
	type Service = AccessGuardService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AccessGuardService {
			inner,
			bans: self.bans.clone(),
			observer: self.observer.clone(),
			mode: self.mode,
			policy: self.policy,
		}
	}
}

/// Access guard middleware service
#[derive(Clone)]
pub struct AccessGuardService<S> {
	inner: S,
	bans: Arc<BanService>,
	observer: Arc<dyn ResponseObserver>,
	mode: ServerMode,
	policy: BanCheckPolicy,
}

/// Request data captured before the request is handed on
struct RequestInfo {
	ip: Box<str>,
	path: Box<str>,
	method: Box<str>,
	user_agent: Box<str>,
	started: Instant,
}

impl RequestInfo {
	fn new(req: &Request<Body>, client: ClientAddr) -> Self {
		Self {
			ip: client.key(),
			path: req.uri().path().into(),
			method: req.method().as_str().into(),
			user_agent: req
				.headers()
				.get(header::USER_AGENT)
				.and_then(|h| h.to_str().ok())
				.unwrap_or_default()
				.into(),
			started: Instant::now(),
		}
	}

	fn into_entry(self, response: &Response) -> AccessLogEntry {
		let status = response.status();
		let failed = status.as_u16() >= 400;
		let auth = response.extensions().get::<Auth>();

		AccessLogEntry {
			ip: self.ip,
			path: self.path,
			method: self.method,
			status_code: status.as_u16(),
			user_agent: self.user_agent,
			user_id: auth.map(|a| a.0.user_id.clone()),
			user_email: auth.map(|a| a.0.email.clone()),
			success: !failed,
			error_message: failed.then(|| status.canonical_reason().unwrap_or("Unknown").into()),
			duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
			timestamp: Timestamp::now(),
		}
	}
}

/// What the ban gate decided for a request
enum Gate {
	Pass,
	Reject(Response),
}

async fn check_ban(bans: &BanService, client: ClientAddr, policy: BanCheckPolicy) -> Gate {
	// Requests without a resolvable address are never banned
	let Some(ip) = client.0 else {
		return Gate::Pass;
	};

	match bans.is_banned(&ip.to_string(), Timestamp::now()).await {
		Ok(None) => Gate::Pass,
		Ok(Some(ban)) => {
			debug!(ip = %ip, reason = %ban.reason, "Rejected banned IP");
			Gate::Reject(
				Error::Banned { reason: ban.reason, expires_at: ban.expires_at }.into_response(),
			)
		}
		Err(err) => match policy {
			BanCheckPolicy::FailOpen => {
				warn!(ip = %ip, "Ban check failed, letting request through: {}", err);
				Gate::Pass
			}
			BanCheckPolicy::FailClosed => {
				warn!(ip = %ip, "Ban check failed, rejecting request: {}", err);
				Gate::Reject(
					Error::ServiceUnavailable("Service temporarily unavailable".into())
						.into_response(),
				)
			}
		},
	}
}

impl<S> Service<Request<Body>> for AccessGuardService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let bans = self.bans.clone();
		let observer = self.observer.clone();
		let policy = self.policy;
		let client = ClientAddr(extract_client_ip(&req, &self.mode));

		// The clone may not be ready, keep the instance that was polled
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);

		Box::pin(async move {
			let info = RequestInfo::new(&req, client);
			req.extensions_mut().insert(client);

			let response = match check_ban(&bans, client, policy).await {
				Gate::Pass => inner.call(req).await?,
				Gate::Reject(response) => response,
			};

			observer.on_response_finalized(info.into_entry(&response));
			Ok(response)
		})
	}
}

// vim: ts=4

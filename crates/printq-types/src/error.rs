//! Error type shared by all printq crates
//!
//! Every error is rendered as `{"error": {"code", "message", "details"?}}`
//! when it reaches the HTTP boundary.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::types::Timestamp;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	Unauthorized,
	PermissionDenied,
	Conflict(String),
	ValidationError(String),

	/// Too many failed admin registration attempts from one address
	RateLimited {
		locked_until: Timestamp,
	},
	/// Wrong admin password. `locked_until` is set when this failure tripped the lockout.
	AdminPasswordRejected {
		remaining_attempts: u32,
		locked_until: Option<Timestamp>,
	},
	/// Source address is on the ban list
	Banned {
		reason: Box<str>,
		expires_at: Option<Timestamp>,
	},

	ServiceUnavailable(String),
	DbError,
	Internal(String),

	// externals
	Io(std::io::Error),
	Json(serde_json::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Unauthorized => write!(f, "authentication required"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::RateLimited { locked_until } => write!(f, "locked out until {}", locked_until),
			Error::AdminPasswordRejected { remaining_attempts, .. } => {
				write!(f, "invalid admin password, {} attempts remaining", remaining_attempts)
			}
			Error::Banned { reason, .. } => write!(f, "address banned: {}", reason),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			Error::Json(err) => write!(f, "json error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

fn plural(n: i64) -> &'static str {
	if n == 1 { "" } else { "s" }
}

fn error_body(code: &str, message: &str, details: Option<serde_json::Value>) -> serde_json::Value {
	let mut error = serde_json::json!({
		"code": code,
		"message": message,
	});
	if let (Some(details), Some(obj)) = (details, error.as_object_mut()) {
		obj.insert("details".into(), details);
	}
	serde_json::json!({ "error": error })
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		match self {
			Error::NotFound => (
				StatusCode::NOT_FOUND,
				Json(error_body("E-NOT-FOUND", "Resource not found", None)),
			)
				.into_response(),
			Error::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				Json(error_body("E-UNAUTHORIZED", "Access token required", None)),
			)
				.into_response(),
			Error::PermissionDenied => (
				StatusCode::FORBIDDEN,
				Json(error_body("E-PERMISSION", "Permission denied", None)),
			)
				.into_response(),
			Error::Conflict(msg) => {
				(StatusCode::CONFLICT, Json(error_body("E-CONFLICT", &msg, None))).into_response()
			}
			Error::ValidationError(msg) => {
				(StatusCode::BAD_REQUEST, Json(error_body("E-VALIDATION", &msg, None)))
					.into_response()
			}
			Error::RateLimited { locked_until } => {
				let retry_secs = Timestamp::now().seconds_until(locked_until);
				let minutes = (retry_secs + 59) / 60;
				let message = format!(
					"Too many failed admin registration attempts. Please try again in {} minute{}.",
					minutes,
					plural(minutes)
				);
				let details = serde_json::json!({
					"lockedUntil": locked_until.to_iso_string(),
					"retryAfter": retry_secs,
				});
				let mut response = (
					StatusCode::TOO_MANY_REQUESTS,
					Json(error_body("E-RATE-LOCKED", &message, Some(details))),
				)
					.into_response();
				if let Ok(val) = HeaderValue::from_str(&retry_secs.to_string()) {
					response.headers_mut().insert(header::RETRY_AFTER, val);
				}
				response
			}
			Error::AdminPasswordRejected { remaining_attempts, locked_until: Some(locked_until) } => {
				let minutes = (Timestamp::now().seconds_until(locked_until) + 59) / 60;
				let message = format!(
					"Invalid admin password. You have been locked out for {} minute{} due to too many failed attempts.",
					minutes,
					plural(minutes)
				);
				let details = serde_json::json!({
					"remainingAttempts": remaining_attempts,
					"isLocked": true,
					"lockedUntil": locked_until.to_iso_string(),
				});
				(
					StatusCode::UNAUTHORIZED,
					Json(error_body("E-ADMIN-PASSWORD", &message, Some(details))),
				)
					.into_response()
			}
			Error::AdminPasswordRejected { remaining_attempts, locked_until: None } => {
				let message = format!(
					"Invalid admin password. {} attempt{} remaining before lockout.",
					remaining_attempts,
					plural(i64::from(remaining_attempts))
				);
				let details = serde_json::json!({ "remainingAttempts": remaining_attempts });
				(
					StatusCode::UNAUTHORIZED,
					Json(error_body("E-ADMIN-PASSWORD", &message, Some(details))),
				)
					.into_response()
			}
			Error::Banned { reason, expires_at } => {
				let details = serde_json::json!({
					"reason": reason,
					"expiresAt": expires_at.map(|ts| ts.to_iso_string()),
				});
				(
					StatusCode::FORBIDDEN,
					Json(error_body(
						"E-IP-BANNED",
						"Your IP address has been banned",
						Some(details),
					)),
				)
					.into_response()
			}
			Error::ServiceUnavailable(msg) => {
				(StatusCode::SERVICE_UNAVAILABLE, Json(error_body("E-UNAVAILABLE", &msg, None)))
					.into_response()
			}
			Error::DbError | Error::Internal(_) | Error::Io(_) | Error::Json(_) => {
				tracing::warn!("Internal error: {}", self);
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(error_body("E-INTERNAL", "Internal server error", None)),
				)
					.into_response()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
		assert_eq!(Error::Conflict("x".into()).into_response().status(), StatusCode::CONFLICT);
		assert_eq!(Error::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::DbError.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
		let banned = Error::Banned { reason: "spam".into(), expires_at: None };
		assert_eq!(banned.into_response().status(), StatusCode::FORBIDDEN);
	}

	#[test]
	fn test_rate_limited_sets_retry_after() {
		let err = Error::RateLimited { locked_until: Timestamp::from_now(120) };
		let response = err.into_response();

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		let retry = response
			.headers()
			.get(header::RETRY_AFTER)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.parse::<i64>().ok());
		assert!(matches!(retry, Some(secs) if (118..=120).contains(&secs)));
	}

	#[test]
	fn test_password_rejected_is_unauthorized() {
		let err = Error::AdminPasswordRejected { remaining_attempts: 2, locked_until: None };
		assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

		let err = Error::AdminPasswordRejected {
			remaining_attempts: 0,
			locked_until: Some(Timestamp::from_now(900)),
		};
		let response = err.into_response();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert!(response.headers().get(header::RETRY_AFTER).is_none());
	}

	#[test]
	fn test_plural() {
		assert_eq!(plural(1), "");
		assert_eq!(plural(2), "s");
		assert_eq!(plural(0), "s");
	}
}

// vim: ts=4

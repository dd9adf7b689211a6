//! Admin registration handler

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use printq_core::extract::{Auth, AuthCtx, ClientAddr};
use printq_core::password;
use printq_core::rate_limit::RateLimitDecision;
use printq_core::token;
use printq_types::types::ApiResponse;

use crate::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterAdminRequest {
	pub email: String,
	pub password: String,
	pub display_name: String,
	pub admin_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
	pub id: Box<str>,
	pub email: Box<str>,
	pub display_name: Box<str>,
	pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterAdminResponse {
	pub token: Box<str>,
	pub user: AdminUser,
}

/// Loose `local@domain.tld` check: no whitespace, a non-empty local part and a
/// dotted domain part
fn is_valid_email(email: &str) -> bool {
	if email.chars().any(char::is_whitespace) {
		return false;
	}
	email.match_indices('@').any(|(at, _)| {
		let domain = &email[at + 1..];
		at > 0
			&& domain
				.char_indices()
				.any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
	})
}

/// POST /api/auth/register-admin - Register an administrator with the admin password
///
/// Attempts from one client address are serialized. A wrong admin password
/// counts towards the lockout configured in the server settings, a correct
/// one resets the count before the remaining fields are validated.
pub async fn post_register_admin(
	State(app): State<App>,
	client: ClientAddr,
	Json(req): Json<RegisterAdminRequest>,
) -> ClResult<(StatusCode, Extension<Auth>, Json<ApiResponse<RegisterAdminResponse>>)> {
	let email = req.email.trim().to_lowercase();
	let display_name = req.display_name.trim();
	if email.is_empty() || req.password.is_empty() || display_name.is_empty() {
		return Err(Error::ValidationError("Required fields missing".into()));
	}

	let settings = app.settings.get().await?;
	let policy = settings.lockout_policy()?;
	let ip = client.key();

	let permit = app.admin_register.evaluate(&ip, policy).await;
	if let RateLimitDecision::Locked { locked_until } = permit.decision() {
		info!(ip = %ip, %locked_until, "Admin registration blocked, address locked out");
		return Err(Error::RateLimited { locked_until });
	}

	let matches =
		password::check_password(req.admin_password.into(), settings.admin_password.clone()).await?;
	if !matches {
		return Err(match permit.record_failure() {
			RateLimitDecision::Locked { locked_until } => {
				warn!(ip = %ip, %locked_until, "Wrong admin password, address locked out");
				Error::AdminPasswordRejected { remaining_attempts: 0, locked_until: Some(locked_until) }
			}
			RateLimitDecision::Allowed { remaining_attempts } => {
				info!(ip = %ip, remaining_attempts, "Wrong admin password");
				Error::AdminPasswordRejected { remaining_attempts, locked_until: None }
			}
		});
	}
	permit.record_success();

	// Format is validated only after the admin password
	if !is_valid_email(&email) {
		return Err(Error::ValidationError("Invalid email format".into()));
	}

	let token = token::issue_access_token(
		&app.opts.jwt_secret,
		&email,
		&email,
		true,
		app.opts.token_expire_hours,
	)?;
	info!(ip = %ip, email = %email, "Administrator registered");

	let auth = Auth(AuthCtx {
		user_id: email.as_str().into(),
		email: email.as_str().into(),
		is_admin: true,
	});
	let response = RegisterAdminResponse {
		token,
		user: AdminUser {
			id: email.as_str().into(),
			email: email.as_str().into(),
			display_name: display_name.into(),
			is_admin: true,
		},
	};

	Ok((StatusCode::CREATED, Extension(auth), Json(ApiResponse::new(response))))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_email_format() {
		assert!(is_valid_email("admin@example.com"));
		assert!(is_valid_email("a.b@mail.example.org"));
		assert!(!is_valid_email("admin@example"));
		assert!(!is_valid_email("@example.com"));
		assert!(!is_valid_email("admin@.com"));
		assert!(!is_valid_email("admin@example."));
		assert!(!is_valid_email("ad min@example.com"));
		assert!(!is_valid_email("admin"));
	}

	#[test]
	fn test_request_fields_default_to_empty() {
		let req: RegisterAdminRequest =
			serde_json::from_value(serde_json::json!({ "email": "a@b.co" })).unwrap_or_default();
		assert_eq!(req.email, "a@b.co");
		assert!(req.admin_password.is_empty());
	}
}

// vim: ts=4

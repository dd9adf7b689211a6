//! Authentication middlewares

use axum::{
	body::Body,
	extract::State,
	http::{Request, Response, header},
	middleware::Next,
};

use crate::extract::{Auth, AuthCtx};
use crate::prelude::*;
use crate::token;

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	req.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty())
}

/// Attaches the caller's identity when a valid access token is presented.
///
/// The identity is also copied into the response extensions so the access log
/// can record who made the request.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> Response<Body> {
	let auth = bearer_token(&req)
		.and_then(|token| token::decode_access_token(&app.opts.jwt_secret, token).ok())
		.map(|claims| Auth(AuthCtx::from(claims)));

	if let Some(auth) = &auth {
		req.extensions_mut().insert(auth.clone());
	}

	let mut res = next.run(req).await;
	if let Some(auth) = auth {
		res.extensions_mut().insert(auth);
	}
	res
}

/// Rejects requests without an administrator identity.
///
/// Must run after `optional_auth`.
pub async fn require_admin(req: Request<Body>, next: Next) -> ClResult<Response<Body>> {
	let Some(Auth(auth)) = req.extensions().get::<Auth>() else {
		return Err(Error::Unauthorized);
	};

	if !auth.is_admin {
		warn!("Non-admin user {} denied access to {}", auth.email, req.uri().path());
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4

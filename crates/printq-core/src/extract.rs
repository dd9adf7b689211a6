//! Custom extractors for printq-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::net::IpAddr;

use crate::prelude::*;
use crate::token::AccessClaims;

// AuthCtx //
//*********//
/// Identity of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
	pub user_id: Box<str>,
	pub email: Box<str>,
	pub is_admin: bool,
}

impl From<AccessClaims> for AuthCtx {
	fn from(claims: AccessClaims) -> Self {
		Self { user_id: claims.sub, email: claims.email, is_admin: claims.adm }
	}
}

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<Auth>().cloned().ok_or(Error::Unauthorized)
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// ClientAddr //
//************//
/// Client address as resolved by the access guard layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub Option<IpAddr>);

impl ClientAddr {
	/// Key used for logging and rate limiting, `unknown` when unresolved
	pub fn key(&self) -> Box<str> {
		self.0.map_or_else(|| "unknown".into(), |ip| ip.to_string().into())
	}
}

impl<S> FromRequestParts<S> for ClientAddr
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<ClientAddr>().copied().unwrap_or(ClientAddr(None)))
	}
}

// vim: ts=4

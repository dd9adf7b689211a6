//! Access tokens
//!
//! HS256 JWTs carrying the user id, e-mail and the admin flag.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
	pub sub: Box<str>,
	pub email: Box<str>,
	pub adm: bool,
	pub exp: i64,
}

pub fn issue_access_token(
	jwt_secret: &str,
	sub: &str,
	email: &str,
	adm: bool,
	expire_hours: u32,
) -> ClResult<Box<str>> {
	let claims = AccessClaims {
		sub: sub.into(),
		email: email.into(),
		adm,
		exp: Timestamp::now().add_hours(i64::from(expire_hours)).0,
	};

	let token = encode(
		&Header::new(Algorithm::HS256),
		&claims,
		&EncodingKey::from_secret(jwt_secret.as_bytes()),
	)
	.map_err(|err| {
		warn!("Failed to encode access token: {}", err);
		Error::Internal("failed to encode access token".into())
	})?;

	Ok(token.into())
}

pub fn decode_access_token(jwt_secret: &str, token: &str) -> ClResult<AccessClaims> {
	decode::<AccessClaims>(
		token,
		&DecodingKey::from_secret(jwt_secret.as_bytes()),
		&Validation::new(Algorithm::HS256),
	)
	.map(|data| data.claims)
	.map_err(|err| {
		debug!("Rejected access token: {}", err);
		Error::Unauthorized
	})
}


// vim: ts=4

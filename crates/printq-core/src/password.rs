//! Password hashing
//!
//! bcrypt is CPU bound, so hashing and verification run on the blocking pool.

use crate::prelude::*;

const BCRYPT_COST: u32 = 10;

fn hash_password_sync(password: &str) -> ClResult<Box<str>> {
	let hash = bcrypt::hash(password, BCRYPT_COST).map_err(|err| {
		warn!("Password hashing failed: {}", err);
		Error::Internal("password hashing failed".into())
	})?;
	Ok(hash.into())
}

pub async fn hash_password(password: Box<str>) -> ClResult<Box<str>> {
	tokio::task::spawn_blocking(move || hash_password_sync(&password))
		.await
		.map_err(|_| Error::Internal("password hashing task failed".into()))?
}

/// Checks `password` against a bcrypt hash. A malformed hash never matches.
pub async fn check_password(password: Box<str>, password_hash: Box<str>) -> ClResult<bool> {
	tokio::task::spawn_blocking(move || match bcrypt::verify(password.as_ref(), &password_hash) {
		Ok(matches) => matches,
		Err(err) => {
			warn!("Password verification failed: {}", err);
			false
		}
	})
	.await
	.map_err(|_| Error::Internal("password verification task failed".into()))
}


// vim: ts=4

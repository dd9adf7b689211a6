//! Settings documents
//!
//! Each setting is one JSON document stored under its name.

use sqlx::{Row, SqlitePool};

use printq_types::prelude::*;

use crate::inspect;

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let Some(row) = row else {
		return Ok(None);
	};
	let value: Option<String> =
		row.try_get("value").inspect_err(inspect).map_err(|_| Error::DbError)?;
	match value {
		Some(value) => Ok(Some(serde_json::from_str(&value)?)),
		None => Ok(None),
	}
}

/// Update or create a setting, `None` deletes it
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		sqlx::query("INSERT OR REPLACE INTO settings (name, value) VALUES (?, ?)")
			.bind(name)
			.bind(val.to_string())
			.execute(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
	} else {
		sqlx::query("DELETE FROM settings WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
	}

	Ok(())
}

// vim: ts=4

//! Common types used throughout printq

use serde::{Deserialize, Serialize, Serializer};
use serde_with::skip_serializing_none;
use std::fmt;

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		Self(chrono::Utc::now().timestamp())
	}

	pub fn from_now(seconds: i64) -> Self {
		Self::now().add_seconds(seconds)
	}

	pub fn add_seconds(&self, seconds: i64) -> Self {
		Self(self.0.saturating_add(seconds))
	}

	pub fn add_minutes(&self, minutes: i64) -> Self {
		self.add_seconds(minutes.saturating_mul(60))
	}

	pub fn add_hours(&self, hours: i64) -> Self {
		self.add_seconds(hours.saturating_mul(3600))
	}

	/// Seconds from `self` until `later`, zero if `later` is in the past
	pub fn seconds_until(&self, later: Timestamp) -> i64 {
		(later.0 - self.0).max(0)
	}

	pub fn to_iso_string(&self) -> String {
		chrono::DateTime::from_timestamp(self.0, 0).map_or_else(
			|| self.0.to_string(),
			|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
		)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_iso_string())
	}
}

/// Serialize a timestamp as an ISO 8601 string (for API responses)
pub fn serialize_timestamp_iso<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&ts.to_iso_string())
}

pub fn serialize_timestamp_iso_opt<S>(
	ts: &Option<Timestamp>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match ts {
		Some(ts) => serializer.serialize_str(&ts.to_iso_string()),
		None => serializer.serialize_none(),
	}
}

// ApiResponse //
//*************//
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: u32,
	pub limit: u32,
	pub total: u64,
	pub pages: u64,
}

impl Pagination {
	pub fn new(page: u32, limit: u32, total: u64) -> Self {
		let pages = if limit == 0 { 0 } else { total.div_ceil(u64::from(limit)) };
		Self { page, limit, total, pages }
	}
}

/// Standard envelope for successful API responses
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub pagination: Option<Pagination>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub time: Timestamp,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, pagination: None, time: Timestamp::now() }
	}

	pub fn with_pagination(data: T, page: u32, limit: u32, total: u64) -> Self {
		Self { data, pagination: Some(Pagination::new(page, limit, total)), time: Timestamp::now() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timestamp_arithmetic() {
		let ts = Timestamp(1_000);
		assert_eq!(ts.add_seconds(5), Timestamp(1_005));
		assert_eq!(ts.add_minutes(15), Timestamp(1_900));
		assert_eq!(ts.add_hours(1), Timestamp(4_600));
		assert_eq!(ts.seconds_until(Timestamp(1_060)), 60);
		assert_eq!(ts.seconds_until(Timestamp(10)), 0);
	}

	#[test]
	fn test_timestamp_iso() {
		assert_eq!(Timestamp(0).to_iso_string(), "1970-01-01T00:00:00Z");
	}

	#[test]
	fn test_pagination_pages() {
		assert_eq!(Pagination::new(1, 50, 0).pages, 0);
		assert_eq!(Pagination::new(1, 50, 50).pages, 1);
		assert_eq!(Pagination::new(1, 50, 51).pages, 2);
	}
}

// vim: ts=4

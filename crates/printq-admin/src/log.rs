//! Admin access log handlers

use axum::{
	Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use printq_types::meta_adapter::{AccessLog, AccessStats, ListAccessLogOptions};
use printq_types::types::ApiResponse;

use crate::prelude::*;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;
const STATS_WINDOW_HOURS: i64 = 24;
const STATS_TOP_PATHS: u32 = 10;

/// Query parameters for listing access logs
#[derive(Debug, Default, Deserialize)]
pub struct ListAccessLogsQuery {
	pub page: Option<u32>,
	pub limit: Option<u32>,
	pub ip: Option<String>,
	pub success: Option<bool>,
}

impl ListAccessLogsQuery {
	/// One based page and clamped page size
	fn page_and_limit(&self) -> (u32, u32) {
		let page = self.page.unwrap_or(1).max(1);
		let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
		(page, limit)
	}
}

/// GET /api/admin/access-logs - List access log entries, newest first
pub async fn list_access_logs(
	State(app): State<App>,
	Query(query): Query<ListAccessLogsQuery>,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<AccessLog>>>)> {
	let (page, limit) = query.page_and_limit();
	let opts = ListAccessLogOptions {
		ip: query.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()).map(Into::into),
		success: query.success,
		offset: (page - 1).saturating_mul(limit),
		limit,
	};
	debug!(page, limit, ip = ?opts.ip, success = ?opts.success, "Listing access logs");

	let (logs, total) = app.meta_adapter.list_access_logs(&opts).await?;
	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(logs, page, limit, total))))
}

/// GET /api/admin/access-stats - Request statistics of the last 24 hours
pub async fn get_access_stats(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<ApiResponse<AccessStats>>)> {
	let since = Timestamp::now().add_hours(-STATS_WINDOW_HOURS);
	let stats = app.meta_adapter.read_access_stats(since, STATS_TOP_PATHS).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(stats))))
}


// vim: ts=4

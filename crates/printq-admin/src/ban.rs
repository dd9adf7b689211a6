//! Admin IP ban handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use printq_core::access::BanRequest;
use printq_core::extract::Auth;
use printq_types::meta_adapter::BannedIp;
use printq_types::types::ApiResponse;

use crate::prelude::*;

/// Ban record with its current state
#[derive(Debug, Clone, Serialize)]
pub struct BannedIpView {
	#[serde(flatten)]
	pub ban: BannedIp,
	pub active: bool,
}

impl BannedIpView {
	fn new(ban: BannedIp, now: Timestamp) -> Self {
		let active = ban.is_active(now);
		Self { ban, active }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BanIpRequest {
	pub ip: String,
	pub reason: String,
	/// Hours, absent or zero for a permanent ban
	pub duration: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UnbanIpRequest {
	pub ip: String,
}

#[derive(Debug, Serialize)]
pub struct UnbanIpResponse {
	pub ip: Box<str>,
	pub message: Box<str>,
}

/// GET /api/admin/banned-ips - List bans, newest first
pub async fn list_banned_ips(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<BannedIpView>>>)> {
	let now = Timestamp::now();
	let bans = app.bans.list().await?;
	let views = bans.into_iter().map(|ban| BannedIpView::new(ban, now)).collect();

	Ok((StatusCode::OK, Json(ApiResponse::new(views))))
}

/// POST /api/admin/ban-ip - Ban an address
pub async fn post_ban_ip(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<BanIpRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<BannedIpView>>)> {
	if req.ip.trim().is_empty() || req.reason.trim().is_empty() {
		return Err(Error::ValidationError("IP and reason are required".into()));
	}

	let now = Timestamp::now();
	let ban = app
		.bans
		.ban(
			BanRequest {
				ip: req.ip.into(),
				reason: req.reason.into(),
				banned_by: auth.email,
				duration_hours: req.duration,
			},
			now,
		)
		.await?;

	Ok((StatusCode::CREATED, Json(ApiResponse::new(BannedIpView::new(ban, now)))))
}

/// POST /api/admin/unban-ip - Lift a ban
pub async fn post_unban_ip(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<UnbanIpRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<UnbanIpResponse>>)> {
	if req.ip.trim().is_empty() {
		return Err(Error::ValidationError("IP is required".into()));
	}

	app.bans.unban(&req.ip).await?;
	info!(ip = %req.ip, by = %auth.email, "Ban lifted");

	let response =
		UnbanIpResponse { ip: req.ip.trim().into(), message: "IP unbanned successfully".into() };
	Ok((StatusCode::OK, Json(ApiResponse::new(response))))
}

// vim: ts=4

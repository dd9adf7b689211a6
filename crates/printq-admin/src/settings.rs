//! Admin server settings handlers

use axum::{Json, extract::State, http::StatusCode};

use printq_core::extract::Auth;
use printq_core::settings::{SettingsPatch, SettingsView};
use printq_types::types::ApiResponse;

use crate::prelude::*;

/// GET /api/admin/settings - Current server settings without secrets
pub async fn get_settings(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<ApiResponse<SettingsView>>)> {
	let settings = app.settings.get().await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(SettingsView::from(&*settings)))))
}

/// PUT /api/admin/settings - Partial settings update
pub async fn put_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(patch): Json<SettingsPatch>,
) -> ClResult<(StatusCode, Json<ApiResponse<SettingsView>>)> {
	let settings = app.settings.update(patch).await?;
	info!(by = %auth.email, "Server settings updated");

	Ok((StatusCode::OK, Json(ApiResponse::new(SettingsView::from(&*settings)))))
}

// vim: ts=4

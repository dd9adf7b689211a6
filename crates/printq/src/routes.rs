//! HTTP route table

use axum::{
	Json, Router, middleware,
	routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::VERSION;
use crate::prelude::*;
use crate::{admin, auth};
use printq_core::access::AccessGuardLayer;
use printq_core::middleware::{optional_auth, require_admin};

#[derive(Debug, Serialize)]
struct Health {
	status: &'static str,
	version: &'static str,
}

async fn get_health() -> Json<Health> {
	Json(Health { status: "ok", version: VERSION })
}

fn init_admin() -> Router<App> {
	Router::new()
		.route("/api/admin/banned-ips", get(admin::ban::list_banned_ips))
		.route("/api/admin/ban-ip", post(admin::ban::post_ban_ip))
		.route("/api/admin/unban-ip", post(admin::ban::post_unban_ip))
		.route("/api/admin/access-logs", get(admin::log::list_access_logs))
		.route("/api/admin/access-stats", get(admin::log::get_access_stats))
		.route(
			"/api/admin/settings",
			get(admin::settings::get_settings).put(admin::settings::put_settings),
		)
		.route_layer(middleware::from_fn(require_admin))
}

fn init_public() -> Router<App> {
	Router::new()
		.route("/api/health", get(get_health))
		.route("/api/auth/register-admin", post(auth::handler::post_register_admin))
}

/// Builds the router. Every request, including unmatched ones, passes the
/// access guard (ban check and access log) and the optional authentication.
pub fn init(app: App) -> Router {
	Router::new()
		.merge(init_public())
		.merge(init_admin())
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth))
		.layer(AccessGuardLayer::from_app(&app))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4

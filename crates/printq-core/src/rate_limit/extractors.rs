//! Client address extraction
//!
//! Resolves the address a request originates from. Rate limiting, the ban
//! gate and the access log all key on the value returned here.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

use crate::app::ServerMode;

/// Extract client IP from request based on ServerMode
///
/// - Standalone mode: Use peer IP directly from ConnectInfo
/// - Proxy mode: Check forwarding headers first
pub fn extract_client_ip<B>(req: &Request<B>, mode: &ServerMode) -> Option<IpAddr> {
	let peer = || req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());

	match mode {
		ServerMode::Standalone => peer(),
		ServerMode::Proxy => extract_from_xff(req)
			.or_else(|| extract_from_x_real_ip(req))
			.or_else(|| extract_from_forwarded(req))
			.or_else(peer),
	}
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| {
			// "client, proxy1, proxy2": the leftmost entry is the original client
			s.split(',').next().map(str::trim).and_then(|ip| ip.parse().ok())
		})
}

/// Extract IP from X-Real-IP header
fn extract_from_x_real_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from Forwarded header (RFC 7239)
fn extract_from_forwarded<B>(req: &Request<B>) -> Option<IpAddr> {
	let header = req.headers().get("forwarded").and_then(|h| h.to_str().ok())?;

	// "for=192.0.2.60;proto=http;by=203.0.113.43" or "for=\"[2001:db8::1]:4711\""
	header
		.split(',')
		.next()?
		.split(';')
		.map(str::trim)
		.find_map(|part| {
			let (key, value) = part.split_once('=')?;
			if !key.trim().eq_ignore_ascii_case("for") {
				return None;
			}
			parse_forwarded_node(value.trim().trim_matches('"'))
		})
}

fn parse_forwarded_node(node: &str) -> Option<IpAddr> {
	if let Some(rest) = node.strip_prefix('[') {
		// Bracketed IPv6, optionally followed by a port
		return rest.split_once(']').and_then(|(addr, _)| addr.parse().ok());
	}
	node.parse().ok().or_else(|| node.parse::<SocketAddr>().ok().map(|sa| sa.ip()))
}


// vim: ts=4

//! IP ban list

use std::net::IpAddr;
use std::sync::Arc;

use printq_types::meta_adapter::{BannedIp, MetaAdapter};

use crate::prelude::*;

/// Parameters of a new ban
#[derive(Debug, Clone)]
pub struct BanRequest {
	pub ip: Box<str>,
	pub reason: Box<str>,
	/// E-mail of the administrator issuing the ban
	pub banned_by: Box<str>,
	/// `None` or zero bans permanently
	pub duration_hours: Option<u32>,
}

/// Normalizes an address so it compares equal to what the ban gate sees
fn parse_ip(ip: &str) -> ClResult<Box<str>> {
	let ip = ip.trim();
	if ip.is_empty() {
		return Err(Error::ValidationError("IP address required".into()));
	}
	ip.parse::<IpAddr>()
		.map(|addr| addr.to_string().into())
		.map_err(|_| Error::ValidationError(format!("invalid IP address: {}", ip)))
}

pub struct BanService {
	meta: Arc<dyn MetaAdapter>,
}

impl BanService {
	pub fn new(meta: Arc<dyn MetaAdapter>) -> Self {
		Self { meta }
	}

	/// Returns the ban matching `ip` if it is in effect at `now`
	pub async fn is_banned(&self, ip: &str, now: Timestamp) -> ClResult<Option<BannedIp>> {
		Ok(self.meta.read_banned_ip(ip).await?.filter(|ban| ban.is_active(now)))
	}

	pub async fn ban(&self, req: BanRequest, now: Timestamp) -> ClResult<BannedIp> {
		let ip = parse_ip(&req.ip)?;
		let reason = req.reason.trim();
		if reason.is_empty() {
			return Err(Error::ValidationError("IP and reason are required".into()));
		}

		if let Some(existing) = self.meta.read_banned_ip(&ip).await? {
			if existing.is_active(now) {
				return Err(Error::Conflict("IP is already banned".into()));
			}
			// Expired record, replace it. A concurrent purge may have removed it already.
			match self.meta.delete_banned_ip(&ip).await {
				Ok(()) | Err(Error::NotFound) => {}
				Err(err) => return Err(err),
			}
		}

		let ban = BannedIp {
			ip,
			reason: reason.into(),
			banned_by: req.banned_by,
			banned_at: now,
			expires_at: req
				.duration_hours
				.filter(|hours| *hours > 0)
				.map(|hours| now.add_hours(i64::from(hours))),
		};
		self.meta.create_banned_ip(&ban).await?;

		info!(ip = %ban.ip, by = %ban.banned_by, expires_at = ?ban.expires_at, "IP banned");
		Ok(ban)
	}

	pub async fn unban(&self, ip: &str) -> ClResult<()> {
		let ip = parse_ip(ip)?;
		self.meta.delete_banned_ip(&ip).await?;
		info!(ip = %ip, "IP unbanned");
		Ok(())
	}

	/// All bans, newest first, including expired ones not yet purged
	pub async fn list(&self) -> ClResult<Vec<BannedIp>> {
		self.meta.list_banned_ips().await
	}

	pub async fn purge_expired(&self, now: Timestamp) -> ClResult<u64> {
		let removed = self.meta.delete_expired_banned_ips(now).await?;
		if removed > 0 {
			info!("Purged {} expired IP bans", removed);
		}
		Ok(removed)
	}
}


// vim: ts=4

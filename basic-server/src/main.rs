use std::{env, path, sync::Arc};

use printq::prelude::*;
use printq::{AppBuilder, BanCheckPolicy, ServerMode};
use printq_meta_adapter_sqlite::MetaAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub mode: ServerMode,
	pub db_dir: path::PathBuf,
	pub jwt_secret: String,
	pub admin_password: String,
	pub ban_check_policy: BanCheckPolicy,
}

impl Config {
	fn from_env() -> ClResult<Self> {
		Ok(Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			mode: env::var("MODE").map_or(Ok(ServerMode::Standalone), |mode| mode.parse())?,
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
			admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
			ban_check_policy: env::var("BAN_CHECK_POLICY")
				.map_or(Ok(BanCheckPolicy::FailOpen), |policy| policy.parse())?,
		})
	}
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let config = Config::from_env()?;

	let meta_adapter = Arc::new(MetaAdapterSqlite::new(config.db_dir.join("meta.db")).await?);

	let mut builder = AppBuilder::new();
	builder
		.mode(config.mode)
		.listen(config.listen)
		.jwt_secret(config.jwt_secret)
		.default_admin_password(config.admin_password)
		.ban_check_policy(config.ban_check_policy)
		.meta_adapter(meta_adapter);
	builder.run().await
}

// vim: ts=4

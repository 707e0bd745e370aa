use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use xwlb_edge::{AppConfig, EdgeApplicationServer, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // guards are kept alive to flush logs and keep the sentry client connected
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    info!(
        "logger and env prepped ({}), starting edge server...",
        Logger::environment_name(config.cargo_env)
    );

    EdgeApplicationServer::serve(config)
        .await
        .context("edge server failed to start")?;

    Ok(())
}

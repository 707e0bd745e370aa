pub mod api;
pub mod dtos;
pub mod error;
pub mod services;
pub mod utils;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Extension, Router, ServiceExt, extract::Request};
use tokio::signal;
use tower::{Layer, ServiceBuilder};
use tower_http::{normalize_path::NormalizePathLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    server::{
        api::{
            proxy_controller::ProxyController, static_controller::StaticController,
            video_info_controller::VideoInfoController,
        },
        services::edge_services::EdgeServices,
        utils::playlist_utils::RELAY_PATH,
    },
};

pub const VIDEO_INFO_PATH: &str = "/api/video-info";

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// the two api routes, everything else gets the player page
pub fn create_router(services: EdgeServices) -> Router {
    Router::new()
        .nest(VIDEO_INFO_PATH, VideoInfoController::app())
        .nest(RELAY_PATH, ProxyController::app())
        .fallback(StaticController::index)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}

pub struct EdgeApplicationServer;

impl EdgeApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        let services =
            EdgeServices::new(config.clone()).context("failed to start edge services")?;

        // trailing slashes are trimmed before routing so `/api/proxy/?url=` still relays
        let app = NormalizePathLayer::trim_trailing_slash().layer(create_router(services));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("failed to bind edge listener")?;

        info!("edge server v{} listening on {}", get_app_version(), addr);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("edge server crashed")?;

        info!("edge server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install ctrl+c handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

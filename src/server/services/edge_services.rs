use std::sync::Arc;

use tracing::info;

use crate::{
    config::AppConfig,
    server::{
        error::AppResult,
        services::video_info_services::{DynVideoInfoService, VideoInfoService},
    },
};

/// everything a handler needs, cloned into each request through an `Extension`.
/// nothing in here is mutable, the http client only owns its own connection pool
#[derive(Clone)]
pub struct EdgeServices {
    pub video_info: DynVideoInfoService,
    pub http: reqwest::Client,
}

impl EdgeServices {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        info!("starting edge services...");

        // one client for the relay and the pipeline. no timeout, a hung upstream hangs the
        // request until the browser gives up
        let http = reqwest::Client::new();

        let video_info = Arc::new(VideoInfoService::new(
            http.clone(),
            &config.site_origin,
            &config.video_info_api,
        )?) as DynVideoInfoService;

        info!(
            "video info pipeline ready (site origin {}, api {})",
            config.site_origin, config.video_info_api
        );

        Ok(Self::with_video_info(video_info, http))
    }

    /// lets tests swap the pipeline for a mock
    pub fn with_video_info(video_info: DynVideoInfoService, http: reqwest::Client) -> Self {
        Self { video_info, http }
    }
}

use axum::{
    Extension, Json, Router,
    extract::{Query, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::server::{
    dtos::video_info_dto::VideoInfoQuery, error::AppResult,
    services::edge_services::EdgeServices, utils::header_utils::cors_headers,
};

pub struct VideoInfoController;

impl VideoInfoController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::video_info_get))
    }

    /// a missing date goes down the same path as a malformed one and comes back as a 400
    async fn video_info_get(
        Extension(services): Extension<EdgeServices>,
        query: Result<Query<VideoInfoQuery>, QueryRejection>,
    ) -> AppResult<Response> {
        let date = query
            .ok()
            .and_then(|Query(params)| params.date)
            .unwrap_or_default();

        let media = services.video_info.resolve(&date).await?;

        Ok((StatusCode::OK, cors_headers(), Json(media)).into_response())
    }
}

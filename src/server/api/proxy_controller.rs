// the relay. one upstream fetch per request, playlists are rewritten so the player keeps coming
// back here, everything else is streamed through untouched
use axum::{
    Extension, Router,
    body::Body,
    extract::{Query, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error};
use url::Url;

use crate::server::{
    error::{AppResult, Error, PlainTextError},
    services::edge_services::EdgeServices,
    utils::{
        allowlist_utils::is_allowed_host,
        header_utils::{
            PLAYLIST_CONTENT_TYPE, RELAY_CACHE_CONTROL, apply_relay_headers, cors_headers,
        },
        playlist_utils::rewrite_playlist,
    },
};

pub struct ProxyController;

impl ProxyController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::proxy_get))
    }

    async fn proxy_get(
        Extension(services): Extension<EdgeServices>,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Response, PlainTextError> {
        let params = query.map(|Query(params)| params).unwrap_or_default();
        let target = Self::parse_target(Self::url_param(&params))?;
        debug!("Proxying: {}", target);

        let upstream = Self::fetch_upstream(&services.http, &target).await?;
        Ok(Self::relay_response(&target, upstream).await?)
    }

    /// first `url` wins when the parameter is repeated
    pub fn url_param(params: &[(String, String)]) -> Option<&str> {
        params
            .iter()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.as_str())
    }

    /// `http://` is upgraded rather than refused, nothing else about the url is touched
    pub fn parse_target(raw_url: Option<&str>) -> AppResult<Url> {
        let raw_url = raw_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::BadRequest("Missing url param".to_string()))?;

        let normalized = match raw_url.strip_prefix("http://") {
            Some(rest) => format!("https://{}", rest),
            None => raw_url.to_string(),
        };

        let target = Url::parse(&normalized).map_err(|e| {
            debug!("Rejecting unparseable target {}: {}", raw_url, e);
            Error::BadRequest("Invalid URL".to_string())
        })?;

        let host = target.host_str().unwrap_or("");
        if !is_allowed_host(host) {
            return Err(Error::Forbidden(format!("Domain not allowed: {}", host)));
        }

        Ok(target)
    }

    pub async fn fetch_upstream(
        http: &reqwest::Client,
        target: &Url,
    ) -> AppResult<reqwest::Response> {
        apply_relay_headers(http.get(target.clone()))
            .send()
            .await
            .map_err(|e| {
                error!("Request failed: {}", e);
                Error::InternalServerErrorWithContext(format!("Request failed: {}", e))
            })
    }

    /// playlist by extension or by mime, whichever shows up first
    pub fn is_playlist(target: &Url, content_type: &str) -> bool {
        target.path().ends_with(".m3u8") || content_type.to_ascii_lowercase().contains("mpegurl")
    }

    /// turn an upstream response into what the browser gets back
    pub async fn relay_response(target: &Url, upstream: reqwest::Response) -> AppResult<Response> {
        let status = upstream.status();
        if !status.is_success() {
            error!("Response from target not successful: {} ({})", status, target);
            return Err(Error::Upstream(status));
        }

        let content_type: Option<HeaderValue> = upstream.headers().get(header::CONTENT_TYPE).cloned();
        let content_type_str = content_type
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let mut response_headers: HeaderMap = cors_headers();
        response_headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(RELAY_CACHE_CONTROL),
        );

        if Self::is_playlist(target, content_type_str) {
            debug!("Processing as M3U8 playlist");
            let text = upstream.text().await.map_err(|e| {
                error!("Failed to read playlist: {}", e);
                Error::InternalServerErrorWithContext(format!("Failed to read playlist: {}", e))
            })?;

            let processed_body = rewrite_playlist(&text, target);
            debug!(
                "Rewrote playlist from {} to {} bytes",
                text.len(),
                processed_body.len()
            );

            response_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(PLAYLIST_CONTENT_TYPE),
            );
            return Ok((StatusCode::OK, response_headers, processed_body).into_response());
        }

        // segments and anything else binary, never buffered and never rewritten
        if let Some(content_type) = content_type {
            response_headers.insert(header::CONTENT_TYPE, content_type);
        }

        Ok((
            StatusCode::OK,
            response_headers,
            Body::from_stream(upstream.bytes_stream()),
        )
            .into_response())
    }
}

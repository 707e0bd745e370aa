use axum::http::{HeaderMap, header};

// the upstream only checks that requests look like they came from its own player page, a bare
// desktop chrome string is enough
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const PLAYER_REFERER: &str = "https://tv.cctv.com/";
pub const PLAYER_ORIGIN: &str = "https://tv.cctv.com";

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const RELAY_CACHE_CONTROL: &str = "public, max-age=3600";

/// headers for anything fetched through the relay (playlists and segments)
pub fn apply_relay_headers(request_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request_builder
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(header::REFERER, PLAYER_REFERER)
        .header(header::ORIGIN, PLAYER_ORIGIN)
}

/// headers for the html pages scraped by the pipeline, no provenance needed there
pub fn apply_scrape_headers(request_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request_builder.header(header::USER_AGENT, BROWSER_USER_AGENT)
}

pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        "*".parse().expect("Static header value should parse"),
    );
    headers
}

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xwlb_edge::{
    AppConfig,
    server::{
        api::proxy_controller::ProxyController,
        create_router,
        error::{Error, PlainTextError},
        services::edge_services::EdgeServices,
    },
};

fn app() -> axum::Router {
    let config = Arc::new(AppConfig::default());
    create_router(EdgeServices::new(config).expect("default config is valid"))
}

async fn get(uri: &str) -> Response {
    app()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn fetch_and_relay(server: &MockServer, target_path: &str) -> Response {
    let target = Url::parse(&format!("{}{}", server.uri(), target_path)).unwrap();
    let upstream = ProxyController::fetch_upstream(&reqwest::Client::new(), &target)
        .await
        .unwrap();
    ProxyController::relay_response(&target, upstream)
        .await
        .unwrap()
}

#[tokio::test]
async fn reject_a_missing_url() {
    let response = get("/api/proxy").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_bytes(response).await, b"Missing url param");
}

#[tokio::test]
async fn reject_an_invalid_url() {
    let response = get("/api/proxy?url=not%20a%20url").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_bytes(response).await, b"Invalid URL");
}

#[tokio::test]
async fn forbid_hosts_outside_the_allowlist() {
    let response = get("/api/proxy?url=https%3A%2F%2Fevil.com%2Fx").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("evil.com"), "{body}");
}

#[tokio::test]
async fn use_the_first_of_repeated_url_params() {
    let response =
        get("/api/proxy?url=https%3A%2F%2Fevil.com%2Fx&url=https%3A%2F%2Fhls.cntv.cn%2Fa.m3u8").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "Domain not allowed: evil.com");
}

#[tokio::test]
async fn rewrite_playlists_detected_by_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live/index"))
        .and(header_eq("referer", "https://tv.cctv.com/"))
        .and(header_eq("origin", "https://tv.cctv.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "#EXTM3U\n#EXT-X-TARGETDURATION:10\n\n#EXTINF:10.0,\nseg-1.ts\n#EXTINF:10.0,\n/abs/seg-2.ts\n#EXT-X-ENDLIST\n",
                "application/x-mpegURL",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = fetch_and_relay(&server, "/live/index").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.apple.mpegurl"
    );
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=3600"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    let references: Vec<&str> = body
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    assert_eq!(references.len(), 2);
    assert!(references.iter().all(|l| l.starts_with("/api/proxy?url=")));

    let first = urlencoding::decode(references[0].trim_start_matches("/api/proxy?url=")).unwrap();
    assert_eq!(first, format!("{}/live/seg-1.ts", server.uri()));
    let second = urlencoding::decode(references[1].trim_start_matches("/api/proxy?url=")).unwrap();
    assert_eq!(second, format!("{}/abs/seg-2.ts", server.uri()));

    // directives untouched
    assert!(body.starts_with("#EXTM3U\n#EXT-X-TARGETDURATION:10\n\n#EXTINF:10.0,\n"));
    assert!(body.ends_with("#EXT-X-ENDLIST\n"));
}

#[tokio::test]
async fn rewrite_playlists_detected_by_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live/main.m3u8"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1200000\n1200.m3u8\n"),
        )
        .mount(&server)
        .await;

    let response = fetch_and_relay(&server, "/live/main.m3u8").await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.apple.mpegurl"
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        body.lines().last().unwrap(),
        format!(
            "/api/proxy?url={}",
            urlencoding::encode(&format!("{}/live/1200.m3u8", server.uri()))
        )
    );
}

#[tokio::test]
async fn pass_segments_through_byte_for_byte() {
    let segment: Vec<u8> = vec![0x47, 0x40, 0x00, 0x10, 0x00, 0xff, 0xfe, 0x0a, 0x23, 0x0a];

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live/seg-1.ts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp2t")
                .set_body_bytes(segment.clone()),
        )
        .mount(&server)
        .await;

    let response = fetch_and_relay(&server, "/live/seg-1.ts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp2t");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=3600"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_bytes(response).await, segment);
}

#[tokio::test]
async fn pass_upstream_failures_through_with_their_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live/gone.ts"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&server)
        .await;

    let target = Url::parse(&format!("{}/live/gone.ts", server.uri())).unwrap();
    let upstream = ProxyController::fetch_upstream(&reqwest::Client::new(), &target)
        .await
        .unwrap();

    match ProxyController::relay_response(&target, upstream).await {
        Err(err @ Error::Upstream(_)) => {
            assert_eq!(err.status_code(), StatusCode::GONE);
            assert_eq!(err.to_string(), "Upstream returned 410");
        }
        other => panic!("unexpected {:?}", other.map(|r| r.status())),
    }
}

#[tokio::test]
async fn report_transport_failures_as_plain_text_500() {
    // nothing listens on the discard port
    let target = Url::parse("http://127.0.0.1:9/x").unwrap();
    let err = match ProxyController::fetch_upstream(&reqwest::Client::new(), &target).await {
        Err(err) => err,
        Ok(response) => panic!("unexpected upstream {}", response.status()),
    };

    match &err {
        Error::InternalServerErrorWithContext(msg) => {
            assert!(msg.starts_with("Request failed"), "{msg}")
        }
        other => panic!("unexpected {:?}", other),
    }

    let response = PlainTextError::from(err).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.starts_with("Request failed"), "{body}");
}

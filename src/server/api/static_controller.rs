use axum::response::Html;

// the player page, baked into the binary so the edge has nothing on disk to serve
const INDEX_HTML: &str = include_str!("../static/index.html");

pub struct StaticController;

impl StaticController {
    /// every path that isn't an api route lands here, `Html` sets `text/html; charset=utf-8`
    pub async fn index() -> Html<&'static str> {
        Html(INDEX_HTML)
    }
}

// the date -> stream pipeline. every hop waits on the previous one and the first failure ends
// the request, nothing here retries or caches
use async_trait::async_trait;
use mockall::automock;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::server::{
    dtos::video_info_dto::{BroadcastDate, ResolvedMedia, VideoInfoApiResponse},
    error::{AppResult, Error},
    utils::header_utils::apply_scrape_headers,
};

pub type DynVideoInfoService = Arc<dyn VideoInfoServiceTrait + Send + Sync>;

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var\s+guid\s*=\s*"([a-f0-9]+)""#).expect("Static regex should compile")
});

#[automock]
#[async_trait]
pub trait VideoInfoServiceTrait {
    /// day index -> full broadcast page -> guid -> metadata api
    async fn resolve(&self, date: &str) -> AppResult<ResolvedMedia>;
}

#[derive(Clone)]
pub struct VideoInfoService {
    http_client: reqwest::Client,
    site_origin: String,
    video_info_api: String,
    video_link_pattern: Regex,
}

impl VideoInfoService {
    pub fn new(
        http_client: reqwest::Client,
        site_origin: &str,
        video_info_api: &str,
    ) -> AppResult<Self> {
        let site_origin = site_origin.trim_end_matches('/').to_string();

        // the complete-broadcast pages are the only `VIDE...` links on the day index, the clips of
        // each story live under a different prefix
        let video_link_pattern = Regex::new(&format!(
            r#"href="({}/[0-9]{{4}}/[0-9]{{2}}/[0-9]{{2}}/VIDE[^"]+\.shtml)""#,
            regex::escape(&site_origin)
        ))
        .map_err(|e| {
            error!("failed to build video link pattern: {}", e);
            Error::InternalServerErrorWithContext(format!("invalid site origin: {}", e))
        })?;

        Ok(Self {
            http_client,
            site_origin,
            video_info_api: video_info_api.to_string(),
            video_link_pattern,
        })
    }

    pub fn day_index_url(&self, date: &BroadcastDate) -> String {
        format!("{}/lm/xwlb/day/{}.shtml", self.site_origin, date.as_str())
    }

    /// first match in document order wins, that's the canonical full-length upload
    pub fn find_video_page_url(&self, day_html: &str) -> Option<String> {
        self.video_link_pattern
            .captures(day_html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_guid(video_html: &str) -> Option<String> {
        GUID_PATTERN
            .captures(video_html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    async fn fetch_day_index(&self, date: &BroadcastDate) -> AppResult<String> {
        let day_url = self.day_index_url(date);
        debug!("fetching day index: {}", day_url);

        let response = apply_scrape_headers(self.http_client.get(&day_url))
            .send()
            .await
            .map_err(|e| Self::transport_error("day index", e))?;

        // days without a broadcast come back as a plain error page, that's not our failure
        if !response.status().is_success() {
            info!(
                "day index for {} returned {}, treating as no data",
                date,
                response.status()
            );
            return Err(Error::NotFound(format!("no data for date: {}", date)));
        }

        response
            .text()
            .await
            .map_err(|e| Self::transport_error("day index", e))
    }

    async fn fetch_video_page(&self, video_page_url: &str) -> AppResult<String> {
        debug!("fetching video page: {}", video_page_url);

        apply_scrape_headers(self.http_client.get(video_page_url))
            .send()
            .await
            .map_err(|e| Self::transport_error("video page", e))?
            .text()
            .await
            .map_err(|e| Self::transport_error("video page", e))
    }

    async fn fetch_video_info(&self, guid: &str) -> AppResult<VideoInfoApiResponse> {
        debug!("fetching video info for guid {}", guid);

        let response = self
            .http_client
            .get(&self.video_info_api)
            .query(&[("pid", guid)])
            .send()
            .await
            .map_err(|e| Self::transport_error("video info api", e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error("video info api", e))?;

        serde_json::from_slice(&body).map_err(|e| {
            error!("failed to parse video info response: {}", e);
            Error::InternalServerErrorWithContext(format!("failed to fetch video info: {}", e))
        })
    }

    fn transport_error(hop: &str, e: reqwest::Error) -> Error {
        error!("{} request failed: {}", hop, e);
        Error::InternalServerErrorWithContext(format!("failed to fetch video info: {}", e))
    }
}

#[async_trait]
impl VideoInfoServiceTrait for VideoInfoService {
    async fn resolve(&self, date: &str) -> AppResult<ResolvedMedia> {
        // nothing goes out over the network for a malformed date
        let date = BroadcastDate::parse(date)?;
        info!("resolving broadcast for {}", date);

        let day_html = self.fetch_day_index(&date).await?;

        let video_page_url = self.find_video_page_url(&day_html).ok_or_else(|| {
            info!("no full broadcast link on the day index for {}", date);
            Error::NotFound("no video found for this date".to_string())
        })?;

        let video_html = self.fetch_video_page(&video_page_url).await?;

        // unlike the two hops above this means the page layout moved, not an empty day
        let guid = Self::extract_guid(&video_html).ok_or_else(|| {
            error!("no guid assignment found on {}", video_page_url);
            Error::InternalServerErrorWithContext("cannot parse video info".to_string())
        })?;

        let info = self.fetch_video_info(&guid).await?;
        let media = info.into_resolved(guid, video_page_url);

        info!("resolved {} to guid {}", date, media.guid);
        Ok(media)
    }
}

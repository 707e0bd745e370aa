use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::server::error::{AppResult, Error};

// ascii only, `\d` would also take other scripts' digits
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("Static regex should compile"));

#[derive(Debug, Deserialize)]
pub struct VideoInfoQuery {
    pub date: Option<String>,
}

/// `YYYYMMDD`, the only key the pipeline takes. only the shape is checked, an impossible day
/// like 20241399 is left for the upstream to 404 on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastDate(String);

impl BroadcastDate {
    pub fn parse(raw: &str) -> AppResult<Self> {
        if DATE_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::BadRequest(
                "date must be provided as YYYYMMDD".to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BroadcastDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// what `/api/video-info` hands to the page, one per successful resolution and never cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    pub guid: String,
    pub hls_url: String,
    pub title: String,
    pub thumbnail: String,
    pub video_page_url: String,
}

/// the parts of `getHttpVideoInfo.do` we read. everything is optional upstream, a missing field
/// just ends up as an empty string
#[derive(Debug, Default, Deserialize)]
pub struct VideoInfoApiResponse {
    #[serde(default)]
    pub hls_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video: Option<VideoInfoApiVideo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoInfoApiVideo {
    #[serde(default)]
    pub chapters: Option<Vec<VideoInfoApiChapter>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoInfoApiChapter {
    #[serde(default)]
    pub image: Option<String>,
}

impl VideoInfoApiResponse {
    pub fn thumbnail(&self) -> Option<&str> {
        self.video
            .as_ref()?
            .chapters
            .as_ref()?
            .first()?
            .image
            .as_deref()
    }

    pub fn into_resolved(self, guid: String, video_page_url: String) -> ResolvedMedia {
        let thumbnail = self.thumbnail().unwrap_or_default().to_string();
        ResolvedMedia {
            guid,
            hls_url: self.hls_url.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            thumbnail,
            video_page_url,
        }
    }
}

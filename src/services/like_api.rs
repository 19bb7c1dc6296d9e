use crate::config::Config;
use crate::error::LikeApiError;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Flattened result of one like request. Missing upstream fields carry a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeResult {
    pub nickname: String,
    pub likes_before: String,
    pub likes_after: String,
    pub remains: String,
    pub status: String,
}

/// Upstream body. Every field is optional and may hold any JSON type.
#[derive(Debug, Default, Deserialize)]
struct LikeResponse {
    #[serde(rename = "PlayerNickname", default)]
    nickname: Option<Value>,
    #[serde(rename = "LikesbeforeCommand", default)]
    likes_before: Option<Value>,
    #[serde(rename = "LikesafterCommand", default)]
    likes_after: Option<Value>,
    #[serde(default)]
    remains: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
}

impl From<LikeResponse> for LikeResult {
    fn from(raw: LikeResponse) -> Self {
        Self {
            nickname: field_or(raw.nickname, UNKNOWN),
            likes_before: field_or(raw.likes_before, NOT_AVAILABLE),
            likes_after: field_or(raw.likes_after, NOT_AVAILABLE),
            remains: field_or(raw.remains, NOT_AVAILABLE),
            status: field_or(raw.status, NOT_AVAILABLE),
        }
    }
}

/// Render a scalar for display; anything else counts as malformed.
fn field_or(value: Option<Value>, sentinel: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => sentinel.to_string(),
    }
}

/// Client for the like API. Shares the process-wide `reqwest::Client`.
#[derive(Clone)]
pub struct LikeApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LikeApiClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self::with_base_url(http, &config.like_api_url, &config.like_api_key)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn fetch_likes(&self, server: &str, uid: &str) -> Result<LikeResult, LikeApiError> {
        let url = format!("{}/like", self.base_url);
        debug!("Requesting likes for uid {} on server {}", uid, server);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("uid", uid),
                ("server_name", server),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(LikeApiError::Status(status.as_u16()));
        }

        let body: LikeResponse = response.json().await?;
        Ok(body.into())
    }
}

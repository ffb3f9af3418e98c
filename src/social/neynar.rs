use super::{FriendPage, SocialError, SocialGraph, SocialResult};
use crate::config::SocialConfig;
use crate::models::{Friend, RawPost};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Wire format of `GET /v2/farcaster/following`
#[derive(Debug, Deserialize)]
struct FollowingResponse {
    #[serde(default)]
    users: Vec<FollowEntry>,
    #[serde(default)]
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct FollowEntry {
    user: UserDto,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    fid: u64,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    pfp_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextCursor {
    #[serde(default)]
    cursor: Option<String>,
}

/// Wire format of `GET /v2/farcaster/feed/user/casts`
#[derive(Debug, Deserialize)]
struct CastsResponse {
    #[serde(default)]
    casts: Vec<CastDto>,
}

#[derive(Debug, Deserialize)]
struct CastDto {
    hash: String,
    #[serde(default)]
    text: String,
    timestamp: DateTime<Utc>,
}

impl From<UserDto> for Friend {
    fn from(user: UserDto) -> Self {
        let display_name = user
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| user.username.clone());

        Friend {
            id: user.fid,
            username: user.username,
            display_name,
            avatar_url: user.pfp_url.unwrap_or_default(),
        }
    }
}

impl From<CastDto> for RawPost {
    fn from(cast: CastDto) -> Self {
        RawPost {
            id: cast.hash,
            text: cast.text,
            timestamp: cast.timestamp,
        }
    }
}

impl From<reqwest::Error> for SocialError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SocialError::Timeout
        } else if err.is_decode() {
            SocialError::Decode(err.to_string())
        } else {
            SocialError::Network(err.to_string())
        }
    }
}

/// Neynar REST client for the Farcaster social graph
#[derive(Clone)]
pub struct NeynarClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl NeynarClient {
    /// Create a new client, failing fast when the API key is missing
    pub fn new(config: &SocialConfig) -> SocialResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(SocialError::Config("Neynar API key is not set".to_string()));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SocialError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> SocialResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(SocialError::Config(format!(
                    "Neynar rejected the API key (HTTP {})",
                    status.as_u16()
                )));
            }
            return Err(SocialError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SocialError::Decode(e.to_string()))
    }
}

impl SocialGraph for NeynarClient {
    async fn list_friends(
        &self,
        owner_id: u64,
        cursor: Option<&str>,
        limit: usize,
    ) -> SocialResult<FriendPage> {
        let mut query = vec![("fid", owner_id.to_string()), ("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response: FollowingResponse = self.get_json("/v2/farcaster/following", &query).await?;

        let next_cursor = response
            .next
            .and_then(|next| next.cursor)
            .filter(|cursor| !cursor.is_empty());

        Ok(FriendPage {
            friends: response
                .users
                .into_iter()
                .map(|entry| Friend::from(entry.user))
                .collect(),
            next_cursor,
        })
    }

    async fn list_posts(&self, friend_id: u64, limit: usize) -> SocialResult<Vec<RawPost>> {
        let query = [
            ("fid", friend_id.to_string()),
            ("limit", limit.to_string()),
            ("include_replies", "false".to_string()),
        ];

        let response: CastsResponse = self
            .get_json("/v2/farcaster/feed/user/casts", &query)
            .await?;

        Ok(response.casts.into_iter().map(RawPost::from).collect())
    }
}

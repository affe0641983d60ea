//! Twitter-data provider client.
//!
//! Fetches public profile and timeline data for a handle from the
//! third-party Twitter-data API. Persona ingestion is the only caller.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::ApiError;

/// Per-request timeout for the provider
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// How many timeline entries we ask the provider for
const TIMELINE_FETCH_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct TwitterProfile {
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cover_picture_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub external_id: String,
    pub content: String,
    pub posted_at: Option<String>,
}

/// Seam over the Twitter-data collaborator so ingestion is testable
/// without the live provider.
#[async_trait]
pub trait TwitterData: Send + Sync {
    /// Fails with `NotFound` when the provider reports no such user
    async fn fetch_profile(&self, handle: &str) -> Result<TwitterProfile, ApiError>;

    /// Returns the newest timeline entries; empty when the account has none
    async fn fetch_timeline(&self, handle: &str) -> Result<Vec<TimelineEntry>, ApiError>;
}

pub struct TwitterApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TwitterApiClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key.as_deref().ok_or_else(|| {
            ApiError::ExternalService("Twitter data API key not configured".to_string())
        })
    }
}

// -- Provider response shapes --

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<UserData>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(rename = "userName")]
    user_name: String,
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "profilePicture")]
    profile_picture: Option<String>,
    #[serde(rename = "coverPicture")]
    cover_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    tweets: Vec<TimelineTweet>,
}

#[derive(Debug, Deserialize)]
struct TimelineTweet {
    id: String,
    text: String,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
}

#[async_trait]
impl TwitterData for TwitterApiClient {
    async fn fetch_profile(&self, handle: &str) -> Result<TwitterProfile, ApiError> {
        let api_key = self.api_key()?.to_string();
        let url = format!("{}/twitter/user/info", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", api_key)
            .query(&[("userName", handle)])
            .send()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Twitter data request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Twitter user not found: {}", handle)));
        }
        if !response.status().is_success() {
            return Err(ApiError::ExternalService(format!(
                "Twitter data provider returned {}",
                response.status()
            )));
        }

        let body: UserResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Invalid Twitter data response: {}", e)))?;

        let data = body.data.ok_or_else(|| {
            log::info!(
                "Twitter data provider has no user '{}' ({})",
                handle,
                body.msg.as_deref().unwrap_or("no message")
            );
            ApiError::NotFound(format!("Twitter user not found: {}", handle))
        })?;

        Ok(TwitterProfile {
            handle: data.user_name,
            display_name: data.name.unwrap_or_else(|| handle.to_string()),
            bio: data.description.filter(|s| !s.is_empty()),
            profile_picture_url: data.profile_picture,
            cover_picture_url: data.cover_picture,
        })
    }

    async fn fetch_timeline(&self, handle: &str) -> Result<Vec<TimelineEntry>, ApiError> {
        let api_key = self.api_key()?.to_string();
        let url = format!("{}/twitter/user/last_tweets", self.base_url);
        let limit = TIMELINE_FETCH_LIMIT.to_string();

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", api_key)
            .query(&[("userName", handle), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Twitter timeline request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::ExternalService(format!(
                "Twitter timeline provider returned {}",
                response.status()
            )));
        }

        let body: TimelineResponse = response.json().await.map_err(|e| {
            ApiError::ExternalService(format!("Invalid Twitter timeline response: {}", e))
        })?;

        Ok(body
            .tweets
            .into_iter()
            .map(|t| TimelineEntry {
                external_id: t.id,
                content: t.text,
                posted_at: t.created_at,
            })
            .collect())
    }
}

//! API client for the Rick and Morty REST API.
//!
//! This module provides the `ApiClient` struct for fetching character
//! pages, single characters, episode metadata, and character portraits.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Character, CharacterPage, Episode};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the public Rick and Morty API
const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the Rick and Morty API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new API client against a custom base URL (config override, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Data Fetching Methods =====

    /// Fetch one page of the character list
    pub async fn fetch_characters(&self, page: u32) -> Result<CharacterPage> {
        let url = format!("{}/character?page={}", self.base_url, page);
        debug!(page, "Fetching character page");
        self.get(&url).await
    }

    /// Fetch a single character by id
    pub async fn fetch_character(&self, id: i64) -> Result<Character> {
        let url = format!("{}/character/{}", self.base_url, id);
        debug!(id, "Fetching character");
        self.get(&url).await
    }

    /// Fetch episode metadata. The API hands full episode URLs back inside
    /// character records, so the URL is used as-is rather than rebuilt.
    pub async fn fetch_episode(&self, episode_url: &str) -> Result<Episode> {
        debug!(url = episode_url, "Fetching episode");
        self.get(episode_url).await
    }

    /// Fetch a character portrait as raw bytes
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>> {
        debug!(url = image_url, "Fetching character image");
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", image_url))?;

        let response = Self::check_response(response).await?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read image body from {}", image_url))?;
        Ok(bytes.to_vec())
    }
}

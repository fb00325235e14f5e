//! Browser state for the character list.
//!
//! This module contains the `Browser` struct that owns the API client,
//! the append-only episode-name cache, the viewed-character store, and
//! the observable list/error state the CLI renders from.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Character, PageInfo, ViewedCharacter};
use crate::store::ViewedStore;
use crate::utils;

// ============================================================================
// Constants
// ============================================================================

/// Display value for an episode whose name could not be resolved
pub const EPISODE_NAME_PLACEHOLDER: &str = "???";

/// Maximum concurrent episode lookups when prefetching a list page.
/// Keeps the burst against the public API small.
const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Character browser state.
///
/// The episode-name cache is keyed by the full episode URL and is
/// monotonically append-only for the lifetime of the browser: entries are
/// never evicted or replaced.
pub struct Browser {
    client: ApiClient,
    store: ViewedStore,
    episode_names: HashMap<String, String>,
    characters: Vec<Character>,
    page_info: Option<PageInfo>,
    last_error: Option<String>,
}

impl Browser {
    pub fn new(client: ApiClient, store: ViewedStore) -> Self {
        Self {
            client,
            store,
            episode_names: HashMap::new(),
            characters: Vec::new(),
            page_info: None,
            last_error: None,
        }
    }

    /// Characters from the most recent successful page load
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Pagination info from the most recent successful page load
    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    /// Error message from the most recent failed operation
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load one page of the character list. Returns true on success; on
    /// failure the list is left untouched and `last_error` carries a
    /// non-empty message.
    pub async fn load_characters(&mut self, page: u32) -> bool {
        match self.client.fetch_characters(page).await {
            Ok(fetched) if fetched.results.is_empty() => {
                self.last_error = Some("No characters found".to_string());
                false
            }
            Ok(fetched) => {
                info!(page, count = fetched.results.len(), "Loaded character page");
                self.characters = fetched.results;
                self.page_info = fetched.info;
                self.last_error = None;
                true
            }
            Err(e) => {
                let message = match e.downcast_ref::<ApiError>() {
                    Some(api_err) => format!("Failed to fetch characters: {}", api_err),
                    None => e.to_string(),
                };
                warn!(page, error = %message, "Character page load failed");
                self.last_error = Some(message);
                false
            }
        }
    }

    /// Fetch a single character by id, without touching the list state
    pub async fn fetch_character(&self, id: i64) -> Result<Character> {
        self.client.fetch_character(id).await
    }

    /// Resolve an episode's display name through the cache.
    ///
    /// Cache hit returns the stored name without a network call. A miss
    /// performs exactly one request: an HTTP response caches whatever name
    /// it resolved (the placeholder for non-success statuses or a nameless
    /// record), while a transport failure returns the placeholder without
    /// caching it so a later lookup may retry.
    pub async fn episode_name(&mut self, episode_url: &str) -> String {
        if let Some(name) = self.episode_names.get(episode_url) {
            return name.clone();
        }

        match self.client.fetch_episode(episode_url).await {
            Ok(episode) => {
                let name = episode
                    .name
                    .unwrap_or_else(|| EPISODE_NAME_PLACEHOLDER.to_string());
                self.episode_names
                    .insert(episode_url.to_string(), name.clone());
                name
            }
            Err(e) if e.downcast_ref::<ApiError>().is_some() => {
                debug!(url = episode_url, error = %e, "Episode request unsuccessful");
                self.episode_names.insert(
                    episode_url.to_string(),
                    EPISODE_NAME_PLACEHOLDER.to_string(),
                );
                EPISODE_NAME_PLACEHOLDER.to_string()
            }
            Err(e) => {
                debug!(url = episode_url, error = %e, "Episode request failed");
                EPISODE_NAME_PLACEHOLDER.to_string()
            }
        }
    }

    /// Display name of the character's premiere episode. Characters with no
    /// episodes yield the placeholder.
    pub async fn first_seen(&mut self, character: &Character) -> String {
        match character.first_episode_url() {
            Some(url) => {
                let url = url.to_string();
                self.episode_name(&url).await
            }
            None => EPISODE_NAME_PLACEHOLDER.to_string(),
        }
    }

    /// Warm the episode-name cache for the current page's premiere
    /// episodes, with a small bound on concurrency. Duplicate premiere
    /// URLs across the page resolve to a single request.
    pub async fn prefetch_first_seen(&mut self) {
        let mut seen = HashSet::new();
        let missing: Vec<String> = self
            .characters
            .iter()
            .filter_map(|c| c.first_episode_url())
            .filter(|url| !self.episode_names.contains_key(*url))
            .filter(|url| seen.insert(url.to_string()))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            return;
        }
        debug!(count = missing.len(), "Prefetching premiere episode names");

        let client = self.client.clone();
        let results: Vec<(String, Result<crate::models::Episode>)> =
            stream::iter(missing.into_iter().map(|url| {
                let client = client.clone();
                async move {
                    let result = client.fetch_episode(&url).await;
                    (url, result)
                }
            }))
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await;

        for (url, result) in results {
            match result {
                Ok(episode) => {
                    let name = episode
                        .name
                        .unwrap_or_else(|| EPISODE_NAME_PLACEHOLDER.to_string());
                    self.episode_names.insert(url, name);
                }
                Err(e) if e.downcast_ref::<ApiError>().is_some() => {
                    self.episode_names
                        .insert(url, EPISODE_NAME_PLACEHOLDER.to_string());
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Prefetch episode request failed");
                }
            }
        }
    }

    /// Persist a denormalized snapshot of an opened character: premiere
    /// episode name resolved through the cache, portrait fetched and
    /// base64-encoded. A failed portrait fetch degrades to a snapshot-less
    /// record rather than failing the view action.
    pub async fn mark_viewed(&mut self, character: &Character) -> Result<()> {
        let first_episode_name = self.first_seen(character).await;

        let image_base64 = match &character.image {
            Some(url) => match self.client.fetch_image(url).await {
                Ok(bytes) => Some(utils::encode_image_base64(&bytes)),
                Err(e) => {
                    warn!(character_id = character.id, error = %e, "Failed to snapshot character image");
                    None
                }
            },
            None => None,
        };

        let record = ViewedCharacter::from_character(character, first_episode_name, image_base64);
        self.store.insert(&record).await?;
        info!(character_id = character.id, "Saved viewed character");
        Ok(())
    }

    /// All persisted viewed-character snapshots, most recent first
    pub async fn viewed(&self) -> Result<Vec<ViewedCharacter>> {
        self.store.all().await
    }
}

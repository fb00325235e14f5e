use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

use toondex::api::ApiClient;
use toondex::browser::{Browser, EPISODE_NAME_PLACEHOLDER};
use toondex::store::ViewedStore;
use toondex::utils::encode_image_base64;

const IMAGE_BYTES: [u8; 4] = [137, 80, 78, 71];

struct ServerState {
    base_url: String,
    episode_hits: AtomicUsize,
}

fn character_json(base: &str, id: u32, name: &str, status: &str, episode_ids: &[u32]) -> serde_json::Value {
    let episodes: Vec<String> = episode_ids
        .iter()
        .map(|e| format!("{}/episode/{}", base, e))
        .collect();
    json!({
        "id": id,
        "name": name,
        "status": status,
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": {"name": "Earth (C-137)", "url": ""},
        "location": {"name": "Citadel of Ricks", "url": ""},
        "image": format!("{}/avatar/{}.jpeg", base, id),
        "episode": episodes,
        "url": format!("{}/character/{}", base, id),
        "created": "2017-11-04T18:48:46.250Z"
    })
}

async fn characters_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match params.get("page").map(String::as_str) {
        // Page 2: a successful but empty page
        Some("2") => Json(json!({
            "info": {"count": 3, "pages": 1, "next": null, "prev": null},
            "results": []
        }))
        .into_response(),
        // Page 3: server failure
        Some("3") => (StatusCode::INTERNAL_SERVER_ERROR, "squanched").into_response(),
        _ => {
            let base = &state.base_url;
            Json(json!({
                "info": {"count": 3, "pages": 1, "next": null, "prev": null},
                "results": [
                    character_json(base, 1, "Rick Sanchez", "Alive", &[1, 2]),
                    character_json(base, 2, "Morty Smith", "Alive", &[1]),
                    character_json(base, 3, "Summer Smith", "Alive", &[2]),
                ]
            }))
            .into_response()
        }
    }
}

async fn character_handler(State(state): State<Arc<ServerState>>, Path(id): Path<u32>) -> Response {
    match id {
        1 => Json(character_json(&state.base_url, 1, "Rick Sanchez", "Alive", &[1, 2])).into_response(),
        _ => (StatusCode::NOT_FOUND, "nope").into_response(),
    }
}

async fn episode_handler(State(state): State<Arc<ServerState>>, Path(id): Path<u32>) -> Response {
    state.episode_hits.fetch_add(1, Ordering::SeqCst);
    match id {
        1 => Json(json!({"id": 1, "name": "Pilot", "episode": "S01E01"})).into_response(),
        2 => Json(json!({"id": 2, "name": "Lawnmower Dog", "episode": "S01E02"})).into_response(),
        // Episode record without a name
        9 => Json(json!({"id": 9})).into_response(),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => (StatusCode::NOT_FOUND, "nope").into_response(),
    }
}

async fn avatar_handler() -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], IMAGE_BYTES.to_vec()).into_response()
}

fn app(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/character", get(characters_handler))
        .route("/character/{id}", get(character_handler))
        .route("/episode/{id}", get(episode_handler))
        .route("/avatar/{id}", get(avatar_handler))
        .with_state(state)
}

async fn start_server() -> (String, Arc<ServerState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let state = Arc::new(ServerState {
        base_url: base_url.clone(),
        episode_hits: AtomicUsize::new(0),
    });
    let router = app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (base_url, state)
}

async fn new_browser(base_url: &str) -> (Browser, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = ViewedStore::open(&dir.path().join("viewed.db")).await.unwrap();
    let client = ApiClient::with_base_url(base_url).unwrap();
    (Browser::new(client, store), dir)
}

#[tokio::test]
async fn test_episode_cache_hit_skips_network() {
    let (base, state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;
    let url = format!("{}/episode/1", base);

    assert_eq!(browser.episode_name(&url).await, "Pilot");
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 1);

    // Second lookup is served from the cache
    assert_eq!(browser.episode_name(&url).await, "Pilot");
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_episode_cache_miss_single_request_per_url() {
    let (base, state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    assert_eq!(browser.episode_name(&format!("{}/episode/1", base)).await, "Pilot");
    assert_eq!(
        browser.episode_name(&format!("{}/episode/2", base)).await,
        "Lawnmower Dog"
    );
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unsuccessful_episode_fetch_caches_placeholder() {
    let (base, state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;
    let url = format!("{}/episode/500", base);

    assert_eq!(browser.episode_name(&url).await, EPISODE_NAME_PLACEHOLDER);
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 1);

    // The placeholder is cached like any resolved name
    assert_eq!(browser.episode_name(&url).await, EPISODE_NAME_PLACEHOLDER);
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_nameless_episode_yields_placeholder() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    let name = browser.episode_name(&format!("{}/episode/9", base)).await;
    assert_eq!(name, EPISODE_NAME_PLACEHOLDER);
}

#[tokio::test]
async fn test_transport_failure_does_not_cache_placeholder() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    // Reserve a port, then drop the listener so connections are refused
    let parked = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = parked.local_addr().unwrap();
    drop(parked);
    let url = format!("http://{}/episode/1", addr);

    assert_eq!(browser.episode_name(&url).await, EPISODE_NAME_PLACEHOLDER);

    // Bring a server up on the same port: the lookup retries and succeeds
    let listener = TcpListener::bind(addr).await.unwrap();
    let state = Arc::new(ServerState {
        base_url: format!("http://{}", addr),
        episode_hits: AtomicUsize::new(0),
    });
    let router = app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    assert_eq!(browser.episode_name(&url).await, "Pilot");
}

#[tokio::test]
async fn test_load_characters_success() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    assert!(browser.load_characters(1).await);
    assert_eq!(browser.characters().len(), 3);
    assert!(browser.last_error().is_none());
    assert_eq!(browser.page_info().map(|i| i.count), Some(3));
}

#[tokio::test]
async fn test_load_characters_server_error_surfaces_message() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    assert!(!browser.load_characters(3).await);
    let message = browser.last_error().unwrap();
    assert!(message.starts_with("Failed to fetch characters:"));
    assert!(!message.is_empty());
}

#[tokio::test]
async fn test_load_characters_empty_page_leaves_list_untouched() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    assert!(browser.load_characters(1).await);
    assert!(!browser.load_characters(2).await);
    assert_eq!(browser.last_error(), Some("No characters found"));
    assert_eq!(browser.characters().len(), 3);
}

#[tokio::test]
async fn test_load_characters_transport_failure_surfaces_message() {
    let parked = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = parked.local_addr().unwrap();
    drop(parked);

    let (mut browser, _dir) = new_browser(&format!("http://{}", addr)).await;
    assert!(!browser.load_characters(1).await);
    assert!(!browser.last_error().unwrap().is_empty());
}

#[tokio::test]
async fn test_prefetch_deduplicates_shared_premieres() {
    let (base, state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    assert!(browser.load_characters(1).await);
    // Rick and Morty share episode 1, Summer premieres in episode 2
    browser.prefetch_first_seen().await;
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 2);

    let characters = browser.characters().to_vec();
    assert_eq!(browser.first_seen(&characters[0]).await, "Pilot");
    assert_eq!(browser.first_seen(&characters[1]).await, "Pilot");
    assert_eq!(browser.first_seen(&characters[2]).await, "Lawnmower Dog");
    // All served from the cache, no further requests
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_first_seen_without_episodes_yields_placeholder() {
    let (base, state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    let character: toondex::models::Character =
        serde_json::from_value(character_json(&base, 4, "Butter Robot", "Alive", &[])).unwrap();
    assert_eq!(browser.first_seen(&character).await, EPISODE_NAME_PLACEHOLDER);
    assert_eq!(state.episode_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mark_viewed_persists_snapshot() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    let character = browser.fetch_character(1).await.unwrap();
    browser.mark_viewed(&character).await.unwrap();

    let viewed = browser.viewed().await.unwrap();
    assert_eq!(viewed.len(), 1);
    let record = &viewed[0];
    assert_eq!(record.character_id, 1);
    assert_eq!(record.name, "Rick Sanchez");
    assert_eq!(record.status, "Alive");
    assert_eq!(record.location, "Citadel of Ricks");
    assert_eq!(record.first_episode_name, "Pilot");
    assert_eq!(record.image_base64.as_deref(), Some(encode_image_base64(&IMAGE_BYTES).as_str()));

    // Re-viewing refreshes the row instead of duplicating it
    browser.mark_viewed(&character).await.unwrap();
    assert_eq!(browser.viewed().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_viewed_survives_image_fetch_failure() {
    let (base, _state) = start_server().await;
    let (mut browser, _dir) = new_browser(&base).await;

    let mut character = browser.fetch_character(1).await.unwrap();
    // Point the portrait at a refused port
    let parked = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = parked.local_addr().unwrap();
    drop(parked);
    character.image = Some(format!("http://{}/avatar/1.jpeg", addr));

    browser.mark_viewed(&character).await.unwrap();

    let viewed = browser.viewed().await.unwrap();
    assert_eq!(viewed.len(), 1);
    assert!(viewed[0].image_base64.is_none());
    assert_eq!(viewed[0].first_episode_name, "Pilot");
}

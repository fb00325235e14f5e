//! Toondex - a CLI character browser for the Rick and Morty API.
//!
//! Lists characters page by page, resolves each character's premiere
//! episode name through an in-memory cache, and keeps a local shelf of
//! every character opened with `view`.

use std::io;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use toondex::api::ApiClient;
use toondex::browser::Browser;
use toondex::config::Config;
use toondex::store::ViewedStore;
use toondex::utils::truncate_string;

/// Database file name under the data directory
const DB_FILE: &str = "viewed.db";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: toondex <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list [page]   List one page of characters");
    eprintln!("  view <id>     Show a character and save it to the viewed shelf");
    eprintln!("  viewed        List locally saved characters");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Toondex starting");

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("list") => {
            let page = match args.get(2) {
                Some(raw) => Some(raw.parse().map_err(|_| anyhow::anyhow!("Invalid page: {}", raw))?),
                None => None,
            };
            run_list(page).await
        }
        Some("view") => {
            let raw = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("view requires a character id"))?;
            let id = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid character id: {}", raw))?;
            run_view(id).await
        }
        Some("viewed") => run_viewed().await,
        Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
    }
}

/// Build the browser from config: API client (with optional base-URL
/// override) plus the local viewed-character store.
async fn build_browser() -> Result<(Config, Browser)> {
    let config = Config::load()?;

    let client = match config.api_base_url {
        Some(ref url) => ApiClient::with_base_url(url)?,
        None => ApiClient::new()?,
    };

    let db_path = config.data_dir()?.join(DB_FILE);
    let store = ViewedStore::open(&db_path).await?;

    Ok((config, Browser::new(client, store)))
}

async fn run_list(page: Option<u32>) -> Result<()> {
    let (config, mut browser) = build_browser().await?;
    let page = page.or(config.default_page).unwrap_or(1);

    if !browser.load_characters(page).await {
        bail!("{}", browser.last_error().unwrap_or("Unknown error"));
    }
    browser.prefetch_first_seen().await;

    println!(
        "{:>5}  {:<24} {:<9} {:<14} {:<26} {}",
        "ID", "NAME", "STATUS", "SPECIES", "LOCATION", "FIRST SEEN"
    );

    let characters = browser.characters().to_vec();
    for character in &characters {
        let first_seen = browser.first_seen(character).await;
        println!(
            "{:>5}  {:<24} {} {:<7} {:<14} {:<26} {}",
            character.id,
            truncate_string(&character.name, 24),
            character.status_kind().glyph(),
            character.status_kind().display_name(),
            truncate_string(character.species.as_deref().unwrap_or("Unknown"), 14),
            truncate_string(character.location_name(), 26),
            first_seen,
        );
    }

    if let Some(info) = browser.page_info() {
        println!();
        println!("page {} of {} ({} characters total)", page, info.pages, info.count);
    }
    Ok(())
}

async fn run_view(id: i64) -> Result<()> {
    let (_config, mut browser) = build_browser().await?;

    let character = browser.fetch_character(id).await?;
    let first_seen = browser.first_seen(&character).await;

    println!("{} (#{})", character.name, character.id);
    println!("  Status:     {}", character.status_kind());
    println!(
        "  Species:    {}",
        character.species.as_deref().unwrap_or("Unknown")
    );
    println!(
        "  Gender:     {}",
        character.gender.as_deref().unwrap_or("Unknown")
    );
    println!("  Origin:     {}", character.origin_name());
    println!("  Location:   {}", character.location_name());
    println!("  First seen: {}", first_seen);

    browser.mark_viewed(&character).await?;
    println!();
    println!("Saved to viewed shelf.");
    Ok(())
}

async fn run_viewed() -> Result<()> {
    let (_config, browser) = build_browser().await?;

    let viewed = browser.viewed().await?;
    if viewed.is_empty() {
        println!("No viewed characters yet. Open one with `toondex view <id>`.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<24} {:<9} {:<26} {:<9} {}",
        "ID", "NAME", "STATUS", "FIRST SEEN", "PORTRAIT", "VIEWED"
    );
    for record in &viewed {
        println!(
            "{:>5}  {:<24} {:<9} {:<26} {:<9} {}",
            record.character_id,
            truncate_string(&record.name, 24),
            record.status,
            truncate_string(&record.first_episode_name, 26),
            if record.image_base64.is_some() { "yes" } else { "-" },
            record.viewed_at.format("%b %d, %Y %H:%M"),
        );
    }
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::ViewedCharacter;

/// Connection pool upper bound. The store serves a single CLI process,
/// a handful of connections is plenty.
const MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS viewed_characters (
    character_id        INTEGER PRIMARY KEY,
    name                TEXT NOT NULL,
    status              TEXT NOT NULL,
    species             TEXT NOT NULL,
    gender              TEXT NOT NULL,
    location            TEXT NOT NULL,
    origin              TEXT NOT NULL,
    first_episode_name  TEXT NOT NULL,
    image_base64        TEXT,
    viewed_at           TEXT NOT NULL
)";

/// Embedded store for viewed-character snapshots.
/// Clone is cheap - the sqlx pool is internally reference counted.
#[derive(Clone)]
pub struct ViewedStore {
    pool: SqlitePool,
}

impl ViewedStore {
    /// Open the database at the given path, creating the file and schema
    /// when missing.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open viewed-character database {}", path.display()))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create viewed_characters table")?;

        Ok(Self { pool })
    }

    /// Insert a snapshot, replacing any previous row for the same
    /// character so re-viewing refreshes the snapshot and timestamp.
    pub async fn insert(&self, record: &ViewedCharacter) -> Result<()> {
        debug!(character_id = record.character_id, "Persisting viewed character");

        sqlx::query(
            "INSERT OR REPLACE INTO viewed_characters
                (character_id, name, status, species, gender, location, origin,
                 first_episode_name, image_base64, viewed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.character_id)
        .bind(&record.name)
        .bind(&record.status)
        .bind(&record.species)
        .bind(&record.gender)
        .bind(&record.location)
        .bind(&record.origin)
        .bind(&record.first_episode_name)
        .bind(&record.image_base64)
        .bind(record.viewed_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert viewed character")?;

        Ok(())
    }

    /// All persisted snapshots, most recently viewed first
    pub async fn all(&self) -> Result<Vec<ViewedCharacter>> {
        let rows = sqlx::query_as::<_, ViewedCharacter>(
            "SELECT character_id, name, status, species, gender, location, origin,
                    first_episode_name, image_base64, viewed_at
             FROM viewed_characters
             ORDER BY viewed_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load viewed characters")?;

        Ok(rows)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Character;

/// Locally persisted snapshot of a character the user has opened.
/// Denormalized on purpose: the viewed list renders without the network.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ViewedCharacter {
    pub character_id: i64,
    pub name: String,
    pub status: String,
    pub species: String,
    pub gender: String,
    pub location: String,
    pub origin: String,
    pub first_episode_name: String,
    /// Base64-encoded portrait bytes, absent when the image fetch failed
    pub image_base64: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

impl ViewedCharacter {
    /// Build a snapshot from a remote character record. Missing source
    /// fields denormalize to "Unknown".
    pub fn from_character(
        character: &Character,
        first_episode_name: String,
        image_base64: Option<String>,
    ) -> Self {
        Self {
            character_id: character.id,
            name: character.name.clone(),
            status: character.status.clone().unwrap_or_else(|| "Unknown".to_string()),
            species: character.species.clone().unwrap_or_else(|| "Unknown".to_string()),
            gender: character.gender.clone().unwrap_or_else(|| "Unknown".to_string()),
            location: character.location_name().to_string(),
            origin: character.origin_name().to_string(),
            first_episode_name,
            image_base64,
            viewed_at: Utc::now(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Character status for classification and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterStatus {
    Alive,
    Dead,
    Unknown,
}

impl CharacterStatus {
    /// Parse the free-form API status string ("Alive"/"Dead"/anything else)
    pub fn from_str(s: Option<&str>) -> Self {
        match s {
            Some(status) => match status.to_lowercase().as_str() {
                "alive" => CharacterStatus::Alive,
                "dead" => CharacterStatus::Dead,
                _ => CharacterStatus::Unknown,
            },
            None => CharacterStatus::Unknown,
        }
    }

    /// Get the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "Alive",
            CharacterStatus::Dead => "Dead",
            CharacterStatus::Unknown => "Unknown",
        }
    }

    /// Single-character marker for list rendering.
    pub fn glyph(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "+",
            CharacterStatus::Dead => "x",
            CharacterStatus::Unknown => "?",
        }
    }
}

impl std::fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Named reference to an origin or last-known location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// A character record as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
    pub species: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<LocationRef>,
    pub location: Option<LocationRef>,
    pub image: Option<String>,
    /// URLs of the episodes this character appears in, premiere first
    #[serde(default)]
    pub episode: Vec<String>,
}

impl Character {
    pub fn status_kind(&self) -> CharacterStatus {
        CharacterStatus::from_str(self.status.as_deref())
    }

    pub fn location_name(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn origin_name(&self) -> &str {
        self.origin
            .as_ref()
            .and_then(|o| o.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// URL of the character's premiere episode, if any
    pub fn first_episode_url(&self) -> Option<&str> {
        self.episode.first().map(String::as_str)
    }
}

/// Pagination block returned alongside every character page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: i64,
    pub pages: i64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One page of the paginated character list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: Option<PageInfo>,
    #[serde(default)]
    pub results: Vec<Character>,
}

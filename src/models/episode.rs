use serde::{Deserialize, Serialize};

/// Episode metadata fetched lazily per character. The API returns more
/// fields; only the ones the browser renders are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub name: Option<String>,
    /// Episode code such as "S01E01"
    pub episode: Option<String>,
}

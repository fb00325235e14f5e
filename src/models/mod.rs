//! Data models for Rick and Morty API entities.
//!
//! This module contains the data structures used by the browser:
//!
//! - `Character`, `CharacterStatus`, `LocationRef`: remote character records
//! - `CharacterPage`, `PageInfo`: one page of the paginated character list
//! - `Episode`: episode metadata fetched lazily per character
//! - `ViewedCharacter`: locally persisted snapshot of an opened character

pub mod character;
pub mod episode;
pub mod viewed;

pub use character::{Character, CharacterPage, CharacterStatus, LocationRef, PageInfo};
pub use episode::Episode;
pub use viewed::ViewedCharacter;

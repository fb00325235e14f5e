//! Toondex - a character browser for the Rick and Morty API.
//!
//! The library core provides the API client, domain models, episode-name
//! cache, and the local viewed-character store. The `toondex` binary is a
//! thin CLI over [`browser::Browser`].

pub mod api;
pub mod browser;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

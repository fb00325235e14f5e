//! REST API client module for the Rick and Morty API.
//!
//! This module provides the `ApiClient` for fetching character pages,
//! single characters, episode metadata, and character portraits.
//!
//! The API is public and requires no authentication.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

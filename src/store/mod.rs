//! Local persistence module for viewed characters.
//!
//! This module provides the `ViewedStore`, a small embedded SQLite
//! database holding one denormalized row per character the user has
//! opened. The viewed list renders entirely from this table, offline.

pub mod viewed;

pub use viewed::ViewedStore;

//! Utility functions for string formatting and image snapshot encoding.

pub mod format;
pub mod image;

// Re-export commonly used functions at module level
pub use format::{format_optional, truncate_string};
pub use image::encode_image_base64;

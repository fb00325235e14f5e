use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw portrait bytes as base64 for storage in the viewed table
pub fn encode_image_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

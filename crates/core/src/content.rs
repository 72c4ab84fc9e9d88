//! Upload content validation and byte formatting.

use crate::error::{Error, Result};

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Leading byte signatures per content type. SVG is text and has no stable
/// signature, so it is exempt from the prefix check.
const MAGIC_NUMBERS: [(&str, &[u8]); 4] = [
    ("image/jpeg", &[0xff, 0xd8, 0xff]),
    ("image/png", &[0x89, 0x50, 0x4e, 0x47]),
    ("image/gif", &[0x47, 0x49, 0x46, 0x38]),
    ("image/webp", &[0x52, 0x49, 0x46, 0x46]),
];

/// Validate an upload's declared type, size, and leading bytes, in that order.
pub fn validate_upload(content_type: &str, data: &[u8], max_size: u64) -> Result<()> {
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(Error::UnsupportedFileType);
    }

    if data.len() as u64 > max_size {
        return Err(Error::FileTooLarge);
    }

    if let Some((_, magic)) = MAGIC_NUMBERS.iter().find(|(ct, _)| *ct == content_type) {
        if data.len() < magic.len() || &data[..magic.len()] != *magic {
            return Err(Error::ContentMismatch);
        }
    }

    Ok(())
}

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count, 1024-based, always rendered with two
/// decimals ("1.50 KB"). Zero is special-cased and values past TB stay in
/// TB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.2} {}", BYTE_UNITS[unit])
}

//! Upload validation and image decoding

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::DesignError;

/// MIME types accepted for artwork uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Lowercase the MIME type and drop any parameters (`; charset=...`)
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Reject uploads whose MIME type is not in the allow-list
pub fn validate_upload(mime: &str) -> Result<(), DesignError> {
    let normalized = normalize_mime(mime);
    if ALLOWED_MIME_TYPES.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(DesignError::InvalidUpload {
            mime: mime.to_string(),
        })
    }
}

/// Guess a MIME type from a file extension
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and bytes
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("only base64 data URIs are supported"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .with_context(|| "invalid base64 payload in data URI")?;
    Ok((mime.to_string(), bytes))
}

/// Decode encoded image bytes into a premultiplied pixmap
pub fn decode_pixmap(bytes: &[u8]) -> Result<Pixmap> {
    let image = image::load_from_memory(bytes)
        .with_context(|| "failed to decode image")?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("image has no pixels ({}x{})", width, height))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

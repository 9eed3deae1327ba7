//! Image assets: artwork uploads and garment mockups
//!
//! This module provides:
//! - Upload MIME validation and decoding into premultiplied pixmaps
//! - Asynchronous decoding with stale-result rejection
//! - Mockup path resolution from garment color keys

pub mod loader;
pub mod upload;

use std::path::{Path, PathBuf};

pub use loader::{AssetKind, AssetLoader, AssetSource, Decoded};
pub use upload::{ALLOWED_MIME_TYPES, decode_pixmap, mime_from_path, parse_data_uri, validate_upload};

/// Mockup image for a garment color: `<assets_dir>/<key>.png`
pub fn mockup_path(assets_dir: &Path, key: &str) -> PathBuf {
    assets_dir.join(format!("{key}.png"))
}

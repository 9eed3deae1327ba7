//! Errors surfaced at the session boundary
//!
//! Every variant is recoverable: the session reports it as a notice and
//! keeps running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("unsupported file type '{mime}': please choose a PNG or JPEG image")]
    InvalidUpload { mime: String },

    #[error("could not decode image: {0:#}")]
    Decode(anyhow::Error),

    #[error("unknown garment color '{0}'")]
    UnknownGarment(String),

    #[error("an export is already in progress")]
    ExportBusy,

    #[error("PDF export failed: {0:#}")]
    Export(anyhow::Error),
}

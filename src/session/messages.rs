//! Message types for the design session
//!
//! This module contains:
//! - EditMsg enum with nested sub-enums for organized message handling
//! - Notice enum for user-visible status messages

use serde::{Deserialize, Serialize};

use crate::config::HexColor;
use crate::domain::{PointerEvent, Viewport};

// ============================================================================
// Overlay edits
// ============================================================================

/// Zoom step applied to the image overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Text overlay edits
#[derive(Debug, Clone, PartialEq)]
pub enum TextMsg {
    SetTitle(String),
    SetSubtitle(String),
    SetFont(String),
    SetColor(HexColor),
    /// Clamped to the configured title size range
    SetTitleSize(f32),
    /// Clamped to the configured subtitle size range
    SetSubtitleSize(f32),
}

// ============================================================================
// Top-level message
// ============================================================================

/// Everything the session reacts to
#[derive(Debug, Clone)]
pub enum EditMsg {
    /// Mouse or touch input in client coordinates
    Pointer(PointerEvent),
    /// Artwork file chosen by the user
    Upload { mime: String, bytes: Vec<u8> },
    /// Remove the image overlay
    ClearImage,
    /// Scale the image overlay about its center
    Zoom(ZoomDirection),
    Text(TextMsg),
    /// Reset title and subtitle to empty
    ClearText,
    /// Switch the garment color by swatch key
    SetGarment(String),
    /// Display rectangle of the surface changed (resize, scroll)
    SetViewport(Viewport),
    /// Write the current surface to a PDF
    Export,
}

// ============================================================================
// Notices
// ============================================================================

/// User-visible status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Info(message) | Notice::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

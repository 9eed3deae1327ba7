//! Scene rendering module
//!
//! This module contains:
//! - Layout math shared between drawing and hit testing
//! - Font loading and text measurement
//! - tiny-skia drawing of the garment, artwork and decorations
//! - usvg/resvg text rasterization
//! - The frame renderer tying them together

pub mod font;
pub mod geometry;
pub mod image;
pub mod scene;
pub mod text;

pub use font::FontBook;
pub use geometry::{TextFace, TextLayout, TextMeasure, layout_text};
pub use scene::{Backdrop, SceneRenderer};

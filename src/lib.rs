//! Garment mockup editor core
//!
//! Places an uploaded image and a title/subtitle text block on a t-shirt
//! mockup, lets pointer gestures move and rotate them inside a placement
//! zone, and exports the rendered surface as a printable PDF.

pub mod assets;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod gesture;
pub mod render;
pub mod script;
pub mod session;

pub use config::EditorConfig;
pub use error::DesignError;
pub use session::{DesignSession, EditMsg, Notice};

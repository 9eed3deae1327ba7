//! Pure domain types with minimal dependencies
//!
//! This module contains the geometry, pointer input, overlay and selection
//! types shared by the gesture controller, the renderer and the session.

pub mod geometry;
pub mod overlay;
pub mod pointer;
pub mod scene;
pub mod selection;

pub use geometry::*;
pub use overlay::*;
pub use pointer::*;
pub use scene::*;
pub use selection::*;

//! The editable scene: both overlays, the selection and the placement zone

use super::geometry::Rect;
use super::overlay::{ImageOverlay, TextOverlay};
use super::selection::Selection;

/// Everything the renderer needs besides the garment backdrop
///
/// Updates replace the whole value; nothing holds a reference into a scene
/// across an edit.
#[derive(Clone, Debug)]
pub struct Scene {
    pub zone: Rect,
    pub image: Option<ImageOverlay>,
    pub text: TextOverlay,
    pub selection: Selection,
}

impl Scene {
    pub fn new(zone: Rect, text: TextOverlay) -> Self {
        Self {
            zone,
            image: None,
            text,
            selection: Selection::None,
        }
    }

    /// True when neither an image nor any text is placed
    pub fn is_blank(&self) -> bool {
        self.image.is_none() && self.text.is_empty()
    }

    pub fn with_selection(&self, selection: Selection) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }

    pub fn with_image(&self, image: Option<ImageOverlay>) -> Self {
        Self {
            image,
            ..self.clone()
        }
    }

    pub fn with_text(&self, text: TextOverlay) -> Self {
        Self {
            text,
            ..self.clone()
        }
    }
}

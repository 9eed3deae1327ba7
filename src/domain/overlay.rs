//! Placeable overlays: the uploaded artwork and the title/subtitle text
//!
//! Overlays are values. Gestures and edits produce a new overlay instead of
//! mutating one in place.

use std::fmt;
use std::sync::Arc;

use tiny_skia::Pixmap;

use super::geometry::{Point, Rect, RotatedRect, Size};
use crate::config::HexColor;

/// Decoded artwork, premultiplied RGBA ready for compositing
pub struct Artwork {
    pixmap: Pixmap,
}

impl Artwork {
    pub fn new(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Width divided by height of the source pixels
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Uploaded image placed on the garment
#[derive(Clone, Debug)]
pub struct ImageOverlay {
    pub artwork: Arc<Artwork>,
    /// Top-left in surface coordinates
    pub position: Point,
    pub size: Size,
    /// Radians about the overlay center
    pub rotation: f32,
    /// Size chosen when the artwork was first placed
    pub original_size: Size,
}

impl ImageOverlay {
    /// Fit the artwork so its longer side equals `max_dimension`, centered in `zone`
    pub fn place(artwork: Arc<Artwork>, zone: &Rect, max_dimension: f32) -> Self {
        let aspect = artwork.aspect_ratio();
        let size = if aspect > 1.0 {
            Size::new(max_dimension, max_dimension / aspect)
        } else {
            Size::new(max_dimension * aspect, max_dimension)
        };
        let position = Rect::from_center(zone.center(), size).top_left();
        Self {
            artwork,
            position,
            size,
            rotation: 0.0,
            original_size: size,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn rotated_bounds(&self) -> RotatedRect {
        RotatedRect::new(self.bounds(), self.rotation)
    }

    pub fn moved_to(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    pub fn rotated_to(&self, rotation: f32) -> Self {
        Self {
            rotation,
            ..self.clone()
        }
    }

    /// Resize about the current center
    pub fn resized(&self, size: Size) -> Self {
        let position = Rect::from_center(self.center(), size).top_left();
        Self {
            position,
            size,
            ..self.clone()
        }
    }
}

/// Where a text overlay sits
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Anchor {
    /// Center of the placement zone
    #[default]
    Centered,
    /// Explicit anchor set by dragging
    Fixed(Point),
}

impl Anchor {
    /// Concrete anchor point for rendering and hit testing
    pub fn resolve(&self, zone: &Rect) -> Point {
        match self {
            Anchor::Centered => zone.center(),
            Anchor::Fixed(point) => *point,
        }
    }
}

/// Title and subtitle text drawn over the garment
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub title: String,
    pub subtitle: String,
    pub font_family: String,
    pub color: HexColor,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub anchor: Anchor,
}

impl TextOverlay {
    /// Empty text with the given style
    pub fn empty(font_family: &str, color: HexColor, title_size: f32, subtitle_size: f32) -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            font_family: font_family.to_string(),
            color,
            title_size,
            subtitle_size,
            anchor: Anchor::Centered,
        }
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.subtitle.is_empty()
    }

    pub fn anchored_at(&self, point: Point) -> Self {
        Self {
            anchor: Anchor::Fixed(point),
            ..self.clone()
        }
    }
}

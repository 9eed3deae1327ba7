//! Pointer input (mouse and touch) and mapping from client space to the surface

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size};

/// Phase of a pointer interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// Modifier keys held during the event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
}

/// Source of a pointer event, positions in client (CSS pixel) coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", rename_all = "snake_case")]
pub enum PointerInput {
    Mouse {
        client: Point,
    },
    Touch {
        /// Touch points still on the screen
        #[serde(default)]
        touches: Vec<Point>,
        /// Touch points that changed in this event
        #[serde(default)]
        changed: Vec<Point>,
    },
}

/// A single mouse or touch event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub input: PointerInput,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn mouse(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            input: PointerInput::Mouse {
                client: Point::new(x, y),
            },
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.modifiers.shift = shift;
        self
    }

    /// Client position of the event
    ///
    /// Touch input uses the first active touch, falling back to the last
    /// changed touch (the finger that was lifted on release).
    pub fn client_position(&self) -> Option<Point> {
        match &self.input {
            PointerInput::Mouse { client } => Some(*client),
            PointerInput::Touch { touches, changed } => {
                touches.first().or_else(|| changed.last()).copied()
            }
        }
    }
}

/// Placement of the drawing surface on screen
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Displayed bounds of the surface in client coordinates
    pub display: Rect,
    /// Backing resolution of the surface
    pub backing: Size,
}

impl Viewport {
    /// Viewport where the surface is shown at its backing resolution
    pub fn identity(backing: Size) -> Self {
        Self {
            display: Rect::new(0.0, 0.0, backing.width, backing.height),
            backing,
        }
    }

    /// Map a pointer event to surface coordinates
    ///
    /// Returns `None` when the event carries no position or the surface is
    /// not laid out (zero displayed size).
    pub fn to_surface(&self, event: &PointerEvent) -> Option<Point> {
        let client = event.client_position()?;
        self.client_to_surface(client)
    }

    pub fn client_to_surface(&self, client: Point) -> Option<Point> {
        if self.display.width <= 0.0 || self.display.height <= 0.0 {
            return None;
        }
        let scale_x = self.backing.width / self.display.width;
        let scale_y = self.backing.height / self.display.height;
        Some(Point::new(
            (client.x - self.display.x) * scale_x,
            (client.y - self.display.y) * scale_y,
        ))
    }
}

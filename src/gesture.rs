//! Pointer gesture state machine
//!
//! Turns press/move/release sequences into drag and rotate edits on the
//! scene. Every method takes the current scene and returns a replacement
//! scene when something changed.

use crate::domain::{
    Modifiers, Point, Scene, Selection, Target, clamp_to_zone, point_in_rotated_rect,
};
use crate::render::{TextMeasure, layout_text};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        target: Target,
        /// Surface point where the press landed
        press: Point,
        /// Image top-left or text anchor at press time
        origin: Point,
    },
    Rotating {
        press: Point,
        start_rotation: f32,
    },
}

/// Topmost overlay under `at`; text is checked first since it draws on top
pub fn hit_test(scene: &Scene, at: Point, measure: &dyn TextMeasure) -> Option<Target> {
    if let Some(layout) = layout_text(&scene.text, &scene.zone, measure)
        && layout.bounds.contains_point(at)
    {
        return Some(Target::Text);
    }
    if let Some(image) = &scene.image
        && point_in_rotated_rect(at, &image.rotated_bounds())
    {
        return Some(Target::Image);
    }
    None
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Start a gesture on whatever is under the pointer
    ///
    /// Shift-press on the image rotates instead of dragging. A press on
    /// empty space clears the selection.
    pub fn press(
        &mut self,
        scene: &Scene,
        at: Point,
        modifiers: Modifiers,
        measure: &dyn TextMeasure,
    ) -> Option<Scene> {
        self.state = GestureState::Idle;
        let target = hit_test(scene, at, measure);

        match (target, &scene.image) {
            (Some(Target::Text), _) => {
                self.state = GestureState::Dragging {
                    target: Target::Text,
                    press: at,
                    origin: scene.text.anchor.resolve(&scene.zone),
                };
            }
            (Some(Target::Image), Some(image)) if modifiers.shift => {
                self.state = GestureState::Rotating {
                    press: at,
                    start_rotation: image.rotation,
                };
            }
            (Some(Target::Image), Some(image)) => {
                self.state = GestureState::Dragging {
                    target: Target::Image,
                    press: at,
                    origin: image.position,
                };
            }
            _ => {}
        }
        log::trace!("Gesture press at {:?}: {:?}", at, self.state);

        let selection = target.map(Selection::from).unwrap_or_default();
        (scene.selection != selection).then(|| scene.with_selection(selection))
    }

    /// Continue the active gesture
    ///
    /// Ignored when idle or when the target overlay has been removed.
    pub fn motion(&mut self, scene: &Scene, at: Point) -> Option<Scene> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging {
                target: Target::Image,
                press,
                origin,
            } => {
                let image = scene.image.as_ref()?;
                let (dx, dy) = press.delta_to(at);
                let position = clamp_to_zone(origin.offset(dx, dy), &scene.zone, Some(image.size));
                (position != image.position).then(|| scene.with_image(Some(image.moved_to(position))))
            }
            GestureState::Dragging {
                target: Target::Text,
                press,
                origin,
            } => {
                if scene.text.is_empty() {
                    return None;
                }
                let (dx, dy) = press.delta_to(at);
                // only the anchor is kept inside the zone, wide text may overhang
                let anchor = clamp_to_zone(origin.offset(dx, dy), &scene.zone, None);
                (anchor != scene.text.anchor.resolve(&scene.zone))
                    .then(|| scene.with_text(scene.text.anchored_at(anchor)))
            }
            GestureState::Rotating {
                press,
                start_rotation,
            } => {
                let image = scene.image.as_ref()?;
                let center = image.center();
                let rotation = start_rotation + center.angle_to(at) - center.angle_to(press);
                (rotation != image.rotation).then(|| scene.with_image(Some(image.rotated_to(rotation))))
            }
        }
    }

    /// End the active gesture; the selection is kept
    pub fn release(&mut self) {
        if self.is_active() {
            log::trace!("Gesture released: {:?}", self.state);
        }
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HexColor;
    use crate::domain::{Anchor, Artwork, ImageOverlay, Rect, TextOverlay};
    use crate::render::geometry::tests::HalfEm;
    use std::f32::consts::{PI, TAU};
    use std::sync::Arc;
    use tiny_skia::Pixmap;

    fn zone() -> Rect {
        Rect::new(212.0, 212.0, 600.0, 600.0)
    }

    fn image_scene() -> Scene {
        let artwork = Arc::new(Artwork::new(Pixmap::new(300, 100).unwrap()));
        let image = ImageOverlay::place(artwork, &zone(), 300.0);
        Scene::new(zone(), TextOverlay::empty("Arial", HexColor::BLACK, 32.0, 24.0))
            .with_image(Some(image))
    }

    fn text_scene(title: &str) -> Scene {
        let text = TextOverlay {
            title: title.to_string(),
            ..TextOverlay::empty("Arial", HexColor::BLACK, 32.0, 24.0)
        };
        Scene::new(zone(), text)
    }

    fn shift() -> Modifiers {
        Modifiers { shift: true }
    }

    #[test]
    fn test_press_selects_image() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        let center = scene.image.as_ref().unwrap().center();
        let next = gestures.press(&scene, center, Modifiers::default(), &HalfEm).unwrap();
        assert_eq!(next.selection, Selection::Image);
        assert!(matches!(
            gestures.state(),
            GestureState::Dragging {
                target: Target::Image,
                ..
            }
        ));
    }

    #[test]
    fn test_press_on_empty_space_clears_selection() {
        let mut gestures = GestureController::new();
        let scene = image_scene().with_selection(Selection::Image);
        let next = gestures
            .press(&scene, Point::new(220.0, 220.0), Modifiers::default(), &HalfEm)
            .unwrap();
        assert_eq!(next.selection, Selection::None);
        assert!(!gestures.is_active());

        // already unselected: nothing to replace
        assert!(gestures.press(&next, Point::new(220.0, 220.0), Modifiers::default(), &HalfEm).is_none());
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        let start = scene.image.as_ref().unwrap().position;
        let center = scene.image.as_ref().unwrap().center();

        let scene = gestures.press(&scene, center, Modifiers::default(), &HalfEm).unwrap();
        let scene = gestures.motion(&scene, center.offset(50.0, 0.0)).unwrap();
        let image = scene.image.as_ref().unwrap();
        assert_eq!(image.position.x, start.x + 50.0);
        assert_eq!(image.position.y, start.y);

        // back to the press point restores the original position
        let scene = gestures.motion(&scene, center).unwrap();
        assert_eq!(scene.image.as_ref().unwrap().position, start);
        gestures.release();
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_drag_is_clamped_to_zone() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        let center = scene.image.as_ref().unwrap().center();
        let scene = gestures.press(&scene, center, Modifiers::default(), &HalfEm).unwrap();

        let scene = gestures.motion(&scene, center.offset(2000.0, 2000.0)).unwrap();
        let image = scene.image.as_ref().unwrap();
        assert_eq!(image.position.x, 812.0 - 300.0);
        assert_eq!(image.position.y, 812.0 - 100.0);

        let scene = gestures.motion(&scene, center.offset(-2000.0, -2000.0)).unwrap();
        assert_eq!(scene.image.as_ref().unwrap().position, Point::new(212.0, 212.0));
    }

    #[test]
    fn test_shift_press_rotates() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        let image = scene.image.clone().unwrap();
        let center = image.center();
        let press = center.offset(100.0, 0.0);

        let scene = gestures.press(&scene, press, shift(), &HalfEm).unwrap();
        assert!(matches!(gestures.state(), GestureState::Rotating { .. }));

        // quarter turn clockwise in screen coordinates
        let scene = gestures.motion(&scene, center.offset(0.0, 100.0)).unwrap();
        let rotated = scene.image.as_ref().unwrap();
        assert!((rotated.rotation - PI / 2.0).abs() < 1e-4);
        assert_eq!(rotated.position, image.position);

        // returning to the press angle restores the rotation modulo a full turn
        let scene = gestures.motion(&scene, center.offset(100.0, 0.0)).unwrap_or(scene);
        let back = scene.image.as_ref().unwrap().rotation.rem_euclid(TAU);
        assert!(back < 1e-4 || (TAU - back) < 1e-4);
    }

    #[test]
    fn test_text_drag_clamps_anchor() {
        let mut gestures = GestureController::new();
        let scene = text_scene("HELLO");
        let center = zone().center();

        let scene = gestures.press(&scene, center, Modifiers::default(), &HalfEm).unwrap();
        assert_eq!(scene.selection, Selection::Text);

        let scene = gestures.motion(&scene, center.offset(-30.0, 10.0)).unwrap();
        assert_eq!(scene.text.anchor, Anchor::Fixed(Point::new(482.0, 522.0)));

        let scene = gestures.motion(&scene, Point::new(5000.0, -5000.0)).unwrap();
        assert_eq!(scene.text.anchor, Anchor::Fixed(Point::new(812.0, 212.0)));
    }

    #[test]
    fn test_text_wins_over_image() {
        let mut gestures = GestureController::new();
        let scene = image_scene().with_text(text_scene("TOP").text);
        let center = zone().center();
        let next = gestures.press(&scene, center, shift(), &HalfEm).unwrap();
        assert_eq!(next.selection, Selection::Text);
        assert!(matches!(
            gestures.state(),
            GestureState::Dragging {
                target: Target::Text,
                ..
            }
        ));
    }

    #[test]
    fn test_motion_ignored_without_gesture() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        assert!(gestures.motion(&scene, Point::new(400.0, 400.0)).is_none());
        gestures.release();
        assert!(gestures.motion(&scene, Point::new(400.0, 400.0)).is_none());
    }

    #[test]
    fn test_motion_ignored_after_target_removed() {
        let mut gestures = GestureController::new();
        let scene = image_scene();
        let center = scene.image.as_ref().unwrap().center();
        let scene = gestures.press(&scene, center, Modifiers::default(), &HalfEm).unwrap();

        let cleared = scene.with_image(None).with_selection(Selection::None);
        assert!(gestures.motion(&cleared, center.offset(10.0, 10.0)).is_none());
    }
}

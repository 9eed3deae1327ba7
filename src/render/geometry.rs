//! Shared layout calculations for overlays
//!
//! This module contains constants and math shared between drawing and hit
//! testing, so that what the user sees is exactly what they can grab.

use crate::domain::{Point, Rect, Size, TextOverlay};

/// Selection decoration constants
pub mod selection {
    use crate::config::HexColor;

    /// Dash pattern (on, off) for selection frames
    pub const DASH: [f32; 2] = [8.0, 4.0];
    /// Radius of the corner handles
    pub const HANDLE_RADIUS: f32 = 6.0;
    /// Gap between the image and its frame
    pub const IMAGE_PADDING: f32 = 8.0;
    pub const IMAGE_STROKE: f32 = 3.0;
    pub const IMAGE_COLOR: HexColor = HexColor::rgb(0x3B, 0x82, 0xF6);
    /// Gap between the text block and its frame
    pub const TEXT_PADDING: f32 = 10.0;
    pub const TEXT_STROKE: f32 = 2.0;
    pub const TEXT_COLOR: HexColor = HexColor::rgb(0x10, 0xB9, 0x81);
}

/// Empty-zone placeholder constants
pub mod placeholder {
    use crate::config::HexColor;

    pub const DASH: [f32; 2] = [15.0, 10.0];
    pub const STROKE: f32 = 2.0;
    /// rgba(59, 130, 246, 0.3)
    pub const STROKE_COLOR: HexColor = HexColor::rgba(59, 130, 246, 77);
    /// rgba(59, 130, 246, 0.6)
    pub const LABEL_COLOR: HexColor = HexColor::rgba(59, 130, 246, 153);
    pub const LABEL_SIZE: f32 = 18.0;
    pub const LABEL_FAMILY: &str = "Arial";
}

/// Text block spacing
pub mod text {
    /// Vertical gap between title and subtitle
    pub const LINE_GAP: f32 = 20.0;
    /// How far the title is raised when a subtitle follows
    pub const TITLE_LIFT: f32 = 20.0;
}

/// Drop shadow parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Opacity of the black shadow (0.0-1.0)
    pub opacity: f32,
    /// Canvas-style blur radius; the gaussian sigma is half of it
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Shadow {
    pub const IMAGE: Shadow = Shadow {
        opacity: 0.2,
        blur: 8.0,
        offset_x: 3.0,
        offset_y: 3.0,
    };

    pub const TEXT: Shadow = Shadow {
        opacity: 0.3,
        blur: 4.0,
        offset_x: 2.0,
        offset_y: 2.0,
    };

    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }

    /// Room needed around an element for its shadow
    pub fn extent(&self) -> f32 {
        self.sigma() * 3.0 + self.offset_x.abs().max(self.offset_y.abs()) + 2.0
    }
}

/// Typeface variant used for a text line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFace {
    Regular,
    Bold,
    Italic,
}

/// Horizontal text measurement
pub trait TextMeasure {
    /// Advance width of `text` in surface pixels
    fn text_width(&self, text: &str, family: &str, size: f32, face: TextFace) -> f32;
}

/// One laid out line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Horizontal center and vertical middle of the line
    pub center: Point,
    pub size: f32,
    pub face: TextFace,
    pub width: f32,
}

/// Resolved position of a text overlay
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub anchor: Point,
    pub title: Option<TextLine>,
    pub subtitle: Option<TextLine>,
    /// Selection frame and hit area
    pub bounds: Rect,
}

impl TextLayout {
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.title.iter().chain(self.subtitle.iter())
    }
}

/// Lay out the text overlay inside `zone`
///
/// Returns `None` when both title and subtitle are empty.
pub fn layout_text(text: &TextOverlay, zone: &Rect, measure: &dyn TextMeasure) -> Option<TextLayout> {
    if text.is_empty() {
        return None;
    }

    let anchor = text.anchor.resolve(zone);
    let has_title = !text.title.is_empty();
    let has_subtitle = !text.subtitle.is_empty();

    let mut y = anchor.y;
    if has_title && has_subtitle {
        y -= text::TITLE_LIFT;
    }

    let mut title = None;
    if has_title {
        title = Some(TextLine {
            text: text.title.clone(),
            center: Point::new(anchor.x, y),
            size: text.title_size,
            face: TextFace::Bold,
            width: measure.text_width(&text.title, &text.font_family, text.title_size, TextFace::Bold),
        });
        y += text.title_size + text::LINE_GAP;
    }

    let subtitle = has_subtitle.then(|| TextLine {
        text: text.subtitle.clone(),
        center: Point::new(anchor.x, y),
        size: text.subtitle_size,
        face: TextFace::Italic,
        width: measure.text_width(
            &text.subtitle,
            &text.font_family,
            text.subtitle_size,
            TextFace::Italic,
        ),
    });

    let width = title
        .iter()
        .chain(subtitle.iter())
        .map(|line| line.width)
        .fold(0.0, f32::max);
    let mut height = 0.0;
    if has_title {
        height += text.title_size;
    }
    if has_subtitle {
        height += text.subtitle_size + text::LINE_GAP;
    }
    let bounds = Rect::from_center(anchor, Size::new(width, height)).outset(selection::TEXT_PADDING);

    Some(TextLayout {
        anchor,
        title,
        subtitle,
        bounds,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::HexColor;
    use crate::domain::Anchor;

    /// Every glyph is half the font size wide
    pub(crate) struct HalfEm;

    impl TextMeasure for HalfEm {
        fn text_width(&self, text: &str, _family: &str, size: f32, _face: TextFace) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }
    }

    fn zone() -> Rect {
        Rect::new(212.0, 212.0, 600.0, 600.0)
    }

    fn overlay(title: &str, subtitle: &str) -> TextOverlay {
        TextOverlay {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            ..TextOverlay::empty("Arial", HexColor::BLACK, 32.0, 24.0)
        }
    }

    #[test]
    fn test_empty_text_has_no_layout() {
        assert!(layout_text(&overlay("", ""), &zone(), &HalfEm).is_none());
    }

    #[test]
    fn test_title_only_centered_on_anchor() {
        let layout = layout_text(&overlay("HELLO", ""), &zone(), &HalfEm).unwrap();
        let title = layout.title.unwrap();
        assert_eq!(title.center, Point::new(512.0, 512.0));
        assert_eq!(title.width, 80.0);
        assert!(layout.subtitle.is_none());
        assert_eq!(layout.bounds, Rect::new(462.0, 486.0, 100.0, 52.0));
    }

    #[test]
    fn test_title_and_subtitle_spacing() {
        let layout = layout_text(&overlay("HI", "there"), &zone(), &HalfEm).unwrap();
        let title = layout.title.as_ref().unwrap();
        let subtitle = layout.subtitle.as_ref().unwrap();
        assert_eq!(title.center.y, 492.0);
        assert_eq!(subtitle.center.y, 492.0 + 32.0 + 20.0);
        assert_eq!(layout.bounds.width, 60.0 + 20.0);
        assert_eq!(layout.bounds.height, 32.0 + 24.0 + 20.0 + 20.0);
    }

    #[test]
    fn test_fixed_anchor_moves_block() {
        let text = overlay("A", "").anchored_at(Point::new(300.0, 700.0));
        let layout = layout_text(&text, &zone(), &HalfEm).unwrap();
        assert_eq!(layout.anchor, Point::new(300.0, 700.0));
        assert!(matches!(text.anchor, Anchor::Fixed(_)));
        assert!(layout.bounds.contains_point(Point::new(300.0, 700.0)));
    }
}

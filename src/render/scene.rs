//! Full-frame scene renderer
//!
//! Every call clears the surface and redraws the whole scene, so the output
//! depends only on the scene, the backdrop and the fonts.

use tiny_skia::Pixmap;

use super::font::FontBook;
use super::geometry::{
    Shadow, TextFace, TextLayout, TextLine, layout_text, placeholder, selection,
};
use super::image::{self as draw, Layer};
use super::text::{self, TextPaint};
use crate::config::HexColor;
use crate::domain::{ImageOverlay, Rect, RotatedRect, Scene, Selection};

/// Garment drawn behind the overlays
#[derive(Clone, Copy)]
pub struct Backdrop<'a> {
    /// Decoded mockup, `None` while loading or when the asset is missing
    pub mockup: Option<&'a Pixmap>,
    /// Flat swatch color used when the mockup is missing
    pub fill: HexColor,
}

pub struct SceneRenderer {
    fonts: FontBook,
    placeholder_label: String,
    fallback_body: Rect,
}

impl SceneRenderer {
    pub fn new(fonts: FontBook, placeholder_label: &str, fallback_body: Rect) -> Self {
        Self {
            fonts,
            placeholder_label: placeholder_label.to_string(),
            fallback_body,
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Draw the whole frame
    ///
    /// Order: garment, placeholder (empty scene only), image, text.
    pub fn render(&self, scene: &Scene, backdrop: &Backdrop<'_>, surface: &mut Pixmap) {
        draw::draw_background(surface, backdrop.mockup, backdrop.fill, &self.fallback_body);

        if scene.is_blank() {
            self.draw_placeholder(surface, &scene.zone);
        }

        if let Some(overlay) = &scene.image {
            self.draw_image(surface, overlay, scene.selection == Selection::Image);
        }

        if let Some(layout) = layout_text(&scene.text, &scene.zone, &self.fonts) {
            let paint = TextPaint {
                family: &scene.text.font_family,
                color: scene.text.color,
            };
            self.draw_text(surface, &layout, &paint, scene.selection == Selection::Text);
        }
    }

    fn draw_placeholder(&self, surface: &mut Pixmap, zone: &Rect) {
        draw::draw_placeholder_frame(surface, zone);
        if self.placeholder_label.is_empty() {
            return;
        }
        let label = TextLine {
            text: self.placeholder_label.clone(),
            center: zone.center(),
            size: placeholder::LABEL_SIZE,
            face: TextFace::Regular,
            width: 0.0,
        };
        let paint = TextPaint {
            family: placeholder::LABEL_FAMILY,
            color: placeholder::LABEL_COLOR,
        };
        let size = (surface.width(), surface.height());
        if let Err(err) = text::render_lines(&self.fonts, &[&label], &paint, size, surface, (0, 0)) {
            log::warn!("Failed to draw placeholder label: {:?}", err);
        }
    }

    fn draw_image(&self, surface: &mut Pixmap, overlay: &ImageOverlay, selected: bool) {
        let size = (surface.width(), surface.height());
        let frame = overlay.rotated_bounds();

        if let Some(mut layer) = Layer::covering(&frame.bounding_box(), Shadow::IMAGE.extent(), size) {
            draw::draw_artwork(&mut layer, overlay);
            draw::composite_with_shadow(surface, &layer, &Shadow::IMAGE);
        }

        if selected {
            draw::draw_selection_frame(
                surface,
                &frame,
                selection::IMAGE_PADDING,
                selection::IMAGE_STROKE,
                selection::DASH,
                selection::IMAGE_COLOR,
            );
            draw::draw_handles(
                surface,
                &frame.corners(),
                selection::HANDLE_RADIUS,
                selection::IMAGE_COLOR,
            );
        }
    }

    fn draw_text(&self, surface: &mut Pixmap, layout: &TextLayout, paint: &TextPaint<'_>, selected: bool) {
        let size = (surface.width(), surface.height());
        let lines: Vec<&TextLine> = layout.lines().collect();
        // glyph ink can overhang the measured advance (italics, accents)
        let overhang = lines.iter().map(|line| line.size).fold(0.0, f32::max) * 0.5;

        if let Some(mut layer) =
            Layer::covering(&layout.bounds, Shadow::TEXT.extent() + overhang, size)
        {
            let origin = layer.origin;
            match text::render_lines(&self.fonts, &lines, paint, size, &mut layer.pixmap, origin) {
                Ok(()) => draw::composite_with_shadow(surface, &layer, &Shadow::TEXT),
                Err(err) => log::warn!("Failed to draw text overlay: {:?}", err),
            }
        }

        if selected {
            let frame = RotatedRect::new(layout.bounds, 0.0);
            draw::draw_selection_frame(
                surface,
                &frame,
                0.0,
                selection::TEXT_STROKE,
                selection::DASH,
                selection::TEXT_COLOR,
            );
            draw::draw_handles(
                surface,
                &layout.bounds.corners(),
                selection::HANDLE_RADIUS,
                selection::TEXT_COLOR,
            );
        }
    }
}

//! Surface drawing with tiny-skia
//!
//! These functions draw the garment, the artwork and the selection
//! decorations onto the fixed-size surface pixmap.

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pattern, Pixmap, PixmapPaint,
    SpreadMode, Stroke, StrokeDash, Transform,
};

use super::geometry::{Shadow, placeholder};
use crate::config::HexColor;
use crate::domain::{ImageOverlay, Point, Rect, RotatedRect};

fn solid_paint(color: HexColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn dashed_stroke(width: f32, dash: [f32; 2]) -> Stroke {
    Stroke {
        width,
        dash: StrokeDash::new(dash.to_vec(), 0.0),
        ..Default::default()
    }
}

fn rect_path(rect: &Rect) -> Option<tiny_skia::Path> {
    let rect = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)?;
    Some(PathBuilder::from_rect(rect))
}

/// Clear the surface and draw the garment
///
/// The mockup is stretched over the whole surface. Without one, the garment
/// body area is filled with the flat swatch color.
pub fn draw_background(surface: &mut Pixmap, mockup: Option<&Pixmap>, fill: HexColor, body: &Rect) {
    surface.fill(Color::WHITE);

    match mockup {
        Some(mockup) => {
            let sx = surface.width() as f32 / mockup.width() as f32;
            let sy = surface.height() as f32 / mockup.height() as f32;
            let Some(rect) =
                tiny_skia::Rect::from_xywh(0.0, 0.0, surface.width() as f32, surface.height() as f32)
            else {
                return;
            };
            let paint = Paint {
                shader: Pattern::new(
                    mockup.as_ref(),
                    SpreadMode::Pad,
                    FilterQuality::Bicubic,
                    1.0,
                    Transform::from_scale(sx, sy),
                ),
                anti_alias: false,
                ..Default::default()
            };
            surface.fill_rect(rect, &paint, Transform::identity(), None);
        }
        None => {
            if let Some(rect) = tiny_skia::Rect::from_xywh(body.x, body.y, body.width, body.height) {
                surface.fill_rect(rect, &solid_paint(fill), Transform::identity(), None);
            }
        }
    }
}

/// Dashed outline of the empty placement zone
pub fn draw_placeholder_frame(surface: &mut Pixmap, zone: &Rect) {
    let Some(path) = rect_path(zone) else {
        return;
    };
    let paint = solid_paint(placeholder::STROKE_COLOR);
    let stroke = dashed_stroke(placeholder::STROKE, placeholder::DASH);
    surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Offscreen pixmap covering part of the surface
pub struct Layer {
    pub pixmap: Pixmap,
    /// Top-left of the layer in surface pixels
    pub origin: (i32, i32),
}

impl Layer {
    /// Layer covering `bounds` grown by `margin`, cropped to the surface
    pub fn covering(bounds: &Rect, margin: f32, surface: (u32, u32)) -> Option<Self> {
        let left = ((bounds.x - margin).floor() as i64).max(0);
        let top = ((bounds.y - margin).floor() as i64).max(0);
        let right = ((bounds.right() + margin).ceil() as i64).min(surface.0 as i64);
        let bottom = ((bounds.bottom() + margin).ceil() as i64).min(surface.1 as i64);
        if right <= left || bottom <= top {
            return None;
        }
        let pixmap = Pixmap::new((right - left) as u32, (bottom - top) as u32)?;
        Some(Self {
            pixmap,
            origin: (left as i32, top as i32),
        })
    }

    /// Transform from surface coordinates into this layer
    pub fn transform(&self) -> Transform {
        Transform::from_translate(-self.origin.0 as f32, -self.origin.1 as f32)
    }
}

/// Draw the artwork into `layer`: centered on the overlay, rotated, scaled
/// to the overlay size
pub fn draw_artwork(layer: &mut Layer, overlay: &ImageOverlay) {
    let art = overlay.artwork.pixmap();
    let (iw, ih) = (art.width() as f32, art.height() as f32);
    let Some(rect) = tiny_skia::Rect::from_xywh(-iw / 2.0, -ih / 2.0, iw, ih) else {
        return;
    };
    let center = overlay.center();
    let transform = layer
        .transform()
        .pre_translate(center.x, center.y)
        .pre_concat(Transform::from_rotate(overlay.rotation.to_degrees()))
        .pre_scale(overlay.size.width / iw, overlay.size.height / ih);
    let paint = Paint {
        shader: Pattern::new(
            art.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bicubic,
            1.0,
            Transform::from_translate(-iw / 2.0, -ih / 2.0),
        ),
        anti_alias: true,
        ..Default::default()
    };
    layer.pixmap.fill_rect(rect, &paint, transform, None);
}

/// Blurred black silhouette of `layer` with the shadow opacity applied
fn shadow_of(layer: &Pixmap, shadow: &Shadow) -> Option<Pixmap> {
    let mut silhouette = RgbaImage::new(layer.width(), layer.height());
    for (src, dst) in layer.pixels().iter().zip(silhouette.pixels_mut()) {
        let alpha = (src.alpha() as f32 * shadow.opacity).round() as u8;
        // premultiplied black: color channels stay zero
        dst.0 = [0, 0, 0, alpha];
    }
    let blurred = image::imageops::blur(&silhouette, shadow.sigma());
    let size = IntSize::from_wh(blurred.width(), blurred.height())?;
    Pixmap::from_vec(blurred.into_raw(), size)
}

/// Composite a layer onto the surface with a drop shadow underneath
pub fn composite_with_shadow(surface: &mut Pixmap, layer: &Layer, shadow: &Shadow) {
    let paint = PixmapPaint::default();
    if let Some(shadow_pixmap) = shadow_of(&layer.pixmap, shadow) {
        surface.draw_pixmap(
            layer.origin.0 + shadow.offset_x.round() as i32,
            layer.origin.1 + shadow.offset_y.round() as i32,
            shadow_pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }
    surface.draw_pixmap(
        layer.origin.0,
        layer.origin.1,
        layer.pixmap.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
}

/// Dashed frame around `frame` (rotated with it), padded by `padding`
pub fn draw_selection_frame(
    surface: &mut Pixmap,
    frame: &RotatedRect,
    padding: f32,
    stroke_width: f32,
    dash: [f32; 2],
    color: HexColor,
) {
    let r = frame.rect;
    let local = Rect::new(
        -r.width / 2.0 - padding,
        -r.height / 2.0 - padding,
        r.width + padding * 2.0,
        r.height + padding * 2.0,
    );
    let Some(path) = rect_path(&local) else {
        return;
    };
    let center = r.center();
    let transform = Transform::from_translate(center.x, center.y)
        .pre_concat(Transform::from_rotate(frame.rotation.to_degrees()));
    let paint = solid_paint(color);
    let stroke = dashed_stroke(stroke_width, dash);
    surface.stroke_path(&path, &paint, &stroke, transform, None);
}

/// Filled circular handles
pub fn draw_handles(surface: &mut Pixmap, corners: &[Point], radius: f32, color: HexColor) {
    let paint = solid_paint(color);
    for corner in corners {
        if let Some(path) = PathBuilder::from_circle(corner.x, corner.y, radius) {
            surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Artwork, Size};
    use std::sync::Arc;

    fn red_artwork(w: u32, h: u32) -> Arc<Artwork> {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(Color::from_rgba8(255, 0, 0, 255));
        Arc::new(Artwork::new(pixmap))
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_fallback_fill_when_mockup_missing() {
        let mut surface = Pixmap::new(100, 100).unwrap();
        let body = Rect::new(20.0, 20.0, 60.0, 60.0);
        draw_background(&mut surface, None, HexColor::rgb(0x1E, 0x40, 0xAF), &body);
        assert_eq!(pixel(&surface, 50, 50), [0x1E, 0x40, 0xAF, 255]);
        assert_eq!(pixel(&surface, 5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_mockup_stretched_over_surface() {
        let mut mockup = Pixmap::new(10, 10).unwrap();
        mockup.fill(Color::from_rgba8(0, 128, 0, 255));
        let mut surface = Pixmap::new(100, 100).unwrap();
        draw_background(&mut surface, Some(&mockup), HexColor::WHITE, &Rect::default());
        for (x, y) in [(1, 1), (50, 50), (98, 98)] {
            let [r, g, b, a] = pixel(&surface, x, y);
            assert!(r <= 2 && b <= 2 && g.abs_diff(128) <= 2 && a == 255);
        }
    }

    #[test]
    fn test_layer_cropped_to_surface() {
        let layer = Layer::covering(&Rect::new(-10.0, 90.0, 50.0, 50.0), 5.0, (100, 100)).unwrap();
        assert_eq!(layer.origin, (0, 85));
        assert_eq!(layer.pixmap.width(), 45);
        assert_eq!(layer.pixmap.height(), 15);
        assert!(Layer::covering(&Rect::new(200.0, 200.0, 5.0, 5.0), 1.0, (100, 100)).is_none());
    }

    #[test]
    fn test_artwork_drawn_with_shadow() {
        let overlay = ImageOverlay {
            artwork: red_artwork(4, 4),
            position: Point::new(40.0, 40.0),
            size: Size::new(20.0, 20.0),
            rotation: 0.0,
            original_size: Size::new(20.0, 20.0),
        };
        let mut surface = Pixmap::new(100, 100).unwrap();
        surface.fill(Color::WHITE);
        let mut layer =
            Layer::covering(&overlay.bounds(), Shadow::IMAGE.extent(), (100, 100)).unwrap();
        draw_artwork(&mut layer, &overlay);
        composite_with_shadow(&mut surface, &layer, &Shadow::IMAGE);

        let [r, g, b, _] = pixel(&surface, 50, 50);
        assert!(r >= 250 && g <= 5 && b <= 5);
        // shadow darkens just beyond the bottom-right edge
        let [r, g, b, _] = pixel(&surface, 61, 61);
        assert!(r < 255 && r == g && g == b);
        // far corner untouched
        assert_eq!(pixel(&surface, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_handles_filled() {
        let mut surface = Pixmap::new(50, 50).unwrap();
        draw_handles(&mut surface, &[Point::new(25.0, 25.0)], 6.0, HexColor::rgb(0x3B, 0x82, 0xF6));
        assert_eq!(pixel(&surface, 25, 25), [0x3B, 0x82, 0xF6, 255]);
        assert_eq!(pixel(&surface, 0, 0)[3], 0);
    }
}

//! Text rasterization through usvg/resvg
//!
//! Lines are emitted as a small SVG document in surface coordinates and
//! rendered onto a layer pixmap, offset by the layer origin.

use anyhow::{Context, Result};
use tiny_skia::{Pixmap, Transform};
use usvg::{Options, Tree};

use super::font::FontBook;
use super::geometry::{TextFace, TextLine};
use crate::config::HexColor;

/// Style shared by every line of a text block
pub struct TextPaint<'a> {
    pub family: &'a str,
    pub color: HexColor,
}

/// Build the SVG document for `lines`
pub fn build_text_svg(lines: &[&TextLine], paint: &TextPaint<'_>, width: u32, height: u32) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    let family = format!("'{}', sans-serif", paint.family);
    for line in lines {
        let (weight, style) = match line.face {
            TextFace::Regular => ("normal", "normal"),
            TextFace::Bold => ("bold", "normal"),
            TextFace::Italic => ("normal", "italic"),
        };
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="{weight}" font-style="{style}" text-anchor="middle" dominant-baseline="central" fill="{fill}" fill-opacity="{opacity}">{text}</text>"#,
            x = line.center.x,
            y = line.center.y,
            family = escape_xml(&family),
            size = line.size,
            weight = weight,
            style = style,
            fill = paint.color.to_css_rgb(),
            opacity = paint.color.opacity(),
            text = escape_xml(&line.text),
        ));
    }
    svg.push_str("</svg>");
    svg
}

/// Rasterize `lines` onto `layer`, whose top-left sits at `origin` on the surface
pub fn render_lines(
    fonts: &FontBook,
    lines: &[&TextLine],
    paint: &TextPaint<'_>,
    surface_size: (u32, u32),
    layer: &mut Pixmap,
    origin: (i32, i32),
) -> Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    let svg = build_text_svg(lines, paint, surface_size.0, surface_size.1);
    let options = Options {
        fontdb: fonts.database(),
        ..Options::default()
    };
    let tree = Tree::from_str(&svg, &options).with_context(|| "failed to parse text SVG")?;
    let transform = Transform::from_translate(-origin.0 as f32, -origin.1 as f32);
    resvg::render(&tree, transform, &mut layer.as_mut());
    Ok(())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

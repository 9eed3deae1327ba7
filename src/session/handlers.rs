//! Edit message handlers
//!
//! Handles EditMsg for every overlay, garment and export operation.

use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::assets::{self, AssetKind, AssetSource, Decoded, validate_upload};
use crate::domain::{
    Artwork, ImageOverlay, PointerEvent, PointerPhase, Selection, Size, TextOverlay, clamp_to_zone,
};
use crate::error::DesignError;
use crate::session::DesignSession;
use crate::session::messages::{EditMsg, Notice, TextMsg, ZoomDirection};
use crate::session::state::MockupState;

/// Handle an EditMsg, modifying session state
///
/// Errors leave the scene untouched; the caller turns them into notices.
pub fn handle_edit_msg(session: &mut DesignSession, msg: EditMsg) -> Result<(), DesignError> {
    match msg {
        EditMsg::Pointer(event) => handle_pointer(session, event),
        EditMsg::Upload { mime, bytes } => handle_upload(session, &mime, bytes)?,
        EditMsg::ClearImage => clear_image(session),
        EditMsg::Zoom(direction) => handle_zoom(session, direction),
        EditMsg::Text(msg) => handle_text(session, msg),
        EditMsg::ClearText => clear_text(session),
        EditMsg::SetGarment(key) => set_garment(session, &key)?,
        EditMsg::SetViewport(viewport) => session.viewport = viewport,
        EditMsg::Export => {
            session.exporter.begin(&session.surface)?;
            session.notices.push(Notice::info("Generating PDF..."));
        }
    }
    Ok(())
}

// ============================================================================
// Pointer handlers
// ============================================================================

fn handle_pointer(session: &mut DesignSession, event: PointerEvent) {
    if let PointerPhase::Release = event.phase {
        session.gestures.release();
        return;
    }
    let Some(at) = session.viewport.to_surface(&event) else {
        log::trace!("Ignoring pointer event without a usable position: {:?}", event);
        return;
    };
    let next = match event.phase {
        PointerPhase::Press => {
            session
                .gestures
                .press(&session.scene, at, event.modifiers, session.renderer.fonts())
        }
        PointerPhase::Move => session.gestures.motion(&session.scene, at),
        PointerPhase::Release => None,
    };
    if let Some(scene) = next {
        session.replace_scene(scene);
    }
}

// ============================================================================
// Image handlers
// ============================================================================

fn handle_upload(session: &mut DesignSession, mime: &str, bytes: Vec<u8>) -> Result<(), DesignError> {
    validate_upload(mime)?;
    log::info!("Decoding uploaded {} ({} bytes)", mime, bytes.len());
    session
        .loader
        .request(AssetKind::Artwork, AssetSource::Bytes(bytes), mime);
    Ok(())
}

/// Place freshly decoded artwork, replacing any previous image
pub(crate) fn place_artwork(session: &mut DesignSession, pixmap: Pixmap) {
    let artwork = Arc::new(Artwork::new(pixmap));
    let overlay = ImageOverlay::place(artwork, &session.scene.zone, session.config.overlay.max_dimension);
    log::debug!("Placed artwork at {:?} size {:?}", overlay.position, overlay.size);
    // a gesture in flight holds the old image's press origin
    session.gestures.release();
    let scene = session
        .scene
        .with_image(Some(overlay))
        .with_selection(Selection::Image);
    session.replace_scene(scene);
    session.notices.push(Notice::info("Image added to the design"));
}

fn clear_image(session: &mut DesignSession) {
    if session.scene.image.is_none() {
        return;
    }
    session.gestures.release();
    let mut scene = session.scene.with_image(None);
    if scene.selection == Selection::Image {
        scene.selection = Selection::None;
    }
    session.replace_scene(scene);
}

/// Scale `size` by `factor`, preserving aspect
///
/// Zooming in stops when the longer side reaches `max`; zooming out stops
/// when the shorter side reaches `min`. A step never moves the size in the
/// opposite direction.
pub(crate) fn zoomed_size(size: Size, factor: f32, min: f32, max: f32) -> Size {
    let longer = size.width.max(size.height);
    let shorter = size.width.min(size.height);
    let scale = if factor >= 1.0 {
        factor.min(max / longer).max(1.0)
    } else {
        factor.max(min / shorter).min(1.0)
    };
    Size::new(size.width * scale, size.height * scale)
}

fn handle_zoom(session: &mut DesignSession, direction: ZoomDirection) {
    let Some(image) = &session.scene.image else {
        return;
    };
    let limits = &session.config.overlay;
    let zone = &session.scene.zone;
    let factor = match direction {
        ZoomDirection::In => limits.zoom_in_factor,
        ZoomDirection::Out => limits.zoom_out_factor,
    };
    let max = limits.zoom_max.min(zone.width).min(zone.height);
    let size = zoomed_size(image.size, factor, limits.zoom_min, max);
    if size == image.size {
        return;
    }
    let resized = image.resized(size);
    let position = clamp_to_zone(resized.position, zone, Some(size));
    let scene = session.scene.with_image(Some(resized.moved_to(position)));
    session.replace_scene(scene);
}

// ============================================================================
// Text handlers
// ============================================================================

fn clamp_size(value: f32, (min, max): (f32, f32)) -> f32 {
    value.min(max).max(min)
}

fn handle_text(session: &mut DesignSession, msg: TextMsg) {
    let limits = &session.config.text;
    let current = session.scene.text.clone();
    let text = match msg {
        TextMsg::SetTitle(title) => TextOverlay { title, ..current.clone() },
        TextMsg::SetSubtitle(subtitle) => TextOverlay {
            subtitle,
            ..current.clone()
        },
        TextMsg::SetFont(font_family) => TextOverlay {
            font_family,
            ..current.clone()
        },
        TextMsg::SetColor(color) => TextOverlay { color, ..current.clone() },
        TextMsg::SetTitleSize(size) => TextOverlay {
            title_size: clamp_size(size, limits.title_size_range),
            ..current.clone()
        },
        TextMsg::SetSubtitleSize(size) => TextOverlay {
            subtitle_size: clamp_size(size, limits.subtitle_size_range),
            ..current.clone()
        },
    };
    if text == current {
        return;
    }
    let mut scene = session.scene.with_text(text);
    if scene.text.is_empty() && scene.selection == Selection::Text {
        scene.selection = Selection::None;
    }
    session.replace_scene(scene);
}

fn default_text(session: &DesignSession) -> TextOverlay {
    let defaults = &session.config.text;
    TextOverlay::empty(
        &defaults.font_family,
        defaults.color,
        defaults.title_size,
        defaults.subtitle_size,
    )
}

fn clear_text(session: &mut DesignSession) {
    let mut scene = session.scene.with_text(default_text(session));
    if scene.selection == Selection::Text {
        scene.selection = Selection::None;
    }
    session.replace_scene(scene);
}

// ============================================================================
// Garment handlers
// ============================================================================

fn set_garment(session: &mut DesignSession, key: &str) -> Result<(), DesignError> {
    let swatch = session
        .config
        .garment(key)
        .ok_or_else(|| DesignError::UnknownGarment(key.to_string()))?
        .clone();
    request_mockup(session, MockupState::pending(&swatch));
    Ok(())
}

/// Show the swatch fill and start loading the mockup image
pub(crate) fn request_mockup(session: &mut DesignSession, mockup: MockupState) {
    let path = assets::mockup_path(&session.config.assets_dir, &mockup.key);
    log::debug!("Loading garment mockup {}", path.display());
    session
        .loader
        .request(AssetKind::Mockup, AssetSource::File(path), &mockup.key);
    session.mockup = mockup;
    session.dirty = true;
}

// ============================================================================
// Decode results
// ============================================================================

pub(crate) fn apply_decoded(session: &mut DesignSession, decoded: Decoded) {
    match (decoded.kind, decoded.result) {
        (AssetKind::Artwork, Ok(pixmap)) => place_artwork(session, pixmap),
        (AssetKind::Artwork, Err(err)) => {
            let err = DesignError::Decode(err);
            log::warn!("{}", err);
            session.notices.push(Notice::error(err.to_string()));
        }
        (AssetKind::Mockup, result) => {
            if decoded.label != session.mockup.key {
                log::debug!("Ignoring mockup for '{}'", decoded.label);
                return;
            }
            match result {
                Ok(pixmap) => session.mockup.loaded(pixmap),
                Err(err) => {
                    log::warn!("Garment mockup '{}' unavailable, using flat fill: {:?}", decoded.label, err);
                    session.mockup.failed();
                }
            }
            session.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_in_caps_longer_side() {
        let mut size = Size::new(300.0, 100.0);
        for _ in 0..10 {
            size = zoomed_size(size, 1.2, 30.0, 600.0);
        }
        assert!((size.width - 600.0).abs() < 1e-3);
        assert!((size.height - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_out_stops_at_shorter_side_floor() {
        let mut size = Size::new(300.0, 100.0);
        for _ in 0..20 {
            size = zoomed_size(size, 0.8, 30.0, 600.0);
        }
        assert!((size.height - 30.0).abs() < 1e-3);
        assert!((size.width - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_never_reverses_direction() {
        // already thinner than the floor: zooming out must not grow it
        let thin = Size::new(300.0, 10.0);
        assert_eq!(zoomed_size(thin, 0.8, 30.0, 600.0), thin);

        // already longer than the cap: zooming in must not shrink it
        let wide = Size::new(700.0, 100.0);
        assert_eq!(zoomed_size(wide, 1.2, 30.0, 600.0), wide);

        let grown = zoomed_size(thin, 1.2, 30.0, 600.0);
        assert!((grown.width - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_preserves_aspect() {
        let size = zoomed_size(Size::new(200.0, 150.0), 1.2, 30.0, 600.0);
        assert!((size.width / size.height - 200.0 / 150.0).abs() < 1e-4);
        assert!((size.width - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(100.0, (20.0, 80.0)), 80.0);
        assert_eq!(clamp_size(5.0, (16.0, 60.0)), 16.0);
        assert_eq!(clamp_size(42.0, (20.0, 80.0)), 42.0);
    }
}

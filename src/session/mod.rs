//! Design session
//!
//! Owns the scene, the drawing surface and the background workers, and
//! redraws the surface after every state change.

pub mod handlers;
pub mod messages;
pub mod state;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tiny_skia::Pixmap;

use crate::assets::AssetLoader;
use crate::config::EditorConfig;
use crate::domain::{Scene, TextOverlay, Viewport};
use crate::error::DesignError;
use crate::export::{BackendHandle, Exporter};
use crate::gesture::GestureController;
use crate::render::{Backdrop, FontBook, SceneRenderer};

pub use messages::{EditMsg, Notice, TextMsg, ZoomDirection};
pub use state::{ExportStatus, MockupState};

pub struct DesignSession {
    pub(crate) config: EditorConfig,
    pub(crate) scene: Scene,
    pub(crate) gestures: GestureController,
    pub(crate) viewport: Viewport,
    pub(crate) mockup: MockupState,
    pub(crate) loader: AssetLoader,
    pub(crate) exporter: Exporter,
    pub(crate) export_status: ExportStatus,
    pub(crate) renderer: SceneRenderer,
    pub(crate) surface: Pixmap,
    pub(crate) dirty: bool,
    pub(crate) notices: Vec<Notice>,
}

impl DesignSession {
    /// Session with system fonts and the printpdf backend
    pub fn new(config: EditorConfig) -> Result<Self> {
        let fonts = FontBook::load(&config.text.font_files);
        Self::with_parts(config, fonts, BackendHandle::printpdf())
    }

    pub fn with_parts(config: EditorConfig, fonts: FontBook, backend: BackendHandle) -> Result<Self> {
        config.validate().with_context(|| "invalid editor configuration")?;
        let (width, height) = config.surface_pixels();
        let surface =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot allocate {}x{} surface", width, height))?;
        let swatch = config
            .garment(&config.default_garment)
            .cloned()
            .ok_or_else(|| anyhow!("default garment '{}' is not in the palette", config.default_garment))?;

        let renderer = SceneRenderer::new(fonts, &config.text.placeholder_label, config.fallback_body);
        let exporter = Exporter::new(backend, config.export.clone());
        let scene = Scene::new(
            config.zone,
            TextOverlay::empty(
                &config.text.font_family,
                config.text.color,
                config.text.title_size,
                config.text.subtitle_size,
            ),
        );

        let mut session = Self {
            viewport: Viewport::identity(config.surface),
            config,
            scene,
            gestures: GestureController::new(),
            mockup: MockupState::pending(&swatch),
            loader: AssetLoader::new(),
            exporter,
            export_status: ExportStatus::default(),
            renderer,
            surface,
            dirty: true,
            notices: Vec::new(),
        };
        handlers::request_mockup(&mut session, MockupState::pending(&swatch));
        session.redraw_if_dirty();
        Ok(session)
    }

    /// Apply one edit and redraw
    ///
    /// Errors are also queued as notices; the session stays usable.
    pub fn handle(&mut self, msg: EditMsg) -> Result<(), DesignError> {
        log::trace!("Handling {:?}", msg_name(&msg));
        let result = handlers::handle_edit_msg(self, msg);
        if let Err(err) = &result {
            log::warn!("{}", err);
            self.notices.push(Notice::error(err.to_string()));
        }
        self.redraw_if_dirty();
        result
    }

    /// Apply finished background work without blocking
    pub fn pump(&mut self) {
        for decoded in self.loader.poll() {
            handlers::apply_decoded(self, decoded);
        }
        if let Some(outcome) = self.exporter.poll() {
            self.export_finished(outcome);
        }
        self.redraw_if_dirty();
    }

    /// Block until pending decodes and exports finish or `timeout` elapses
    pub fn settle(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        for decoded in self.loader.wait(timeout) {
            handlers::apply_decoded(self, decoded);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Some(outcome) = self.exporter.wait(remaining) {
            self.export_finished(outcome);
        }
        self.redraw_if_dirty();
    }

    pub fn is_idle(&self) -> bool {
        self.loader.is_idle() && !self.exporter.is_busy()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mockup(&self) -> &MockupState {
        &self.mockup
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    /// The rendered frame, always current
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Drain queued notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.dirty = true;
    }

    fn export_finished(&mut self, outcome: Result<PathBuf>) {
        match outcome {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.notices
                    .push(Notice::info(format!("Your PDF mockup \"{}\" has been saved", name)));
                self.export_status.exports_written += 1;
                self.export_status.last_saved = Some(path);
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(DesignError::Export(err).to_string()));
            }
        }
    }

    fn redraw_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        let backdrop = Backdrop {
            mockup: self.mockup.image.as_deref(),
            fill: self.mockup.fill,
        };
        self.renderer.render(&self.scene, &backdrop, &mut self.surface);
        self.dirty = false;
    }
}

fn msg_name(msg: &EditMsg) -> &'static str {
    match msg {
        EditMsg::Pointer(_) => "pointer",
        EditMsg::Upload { .. } => "upload",
        EditMsg::ClearImage => "clear_image",
        EditMsg::Zoom(_) => "zoom",
        EditMsg::Text(_) => "text",
        EditMsg::ClearText => "clear_text",
        EditMsg::SetGarment(_) => "set_garment",
        EditMsg::SetViewport(_) => "set_viewport",
        EditMsg::Export => "export",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::upload::tests::encoded_image;
    use crate::domain::{Anchor, PointerEvent, PointerPhase, Selection, Size};
    use crate::export::{DocumentBackend, DocumentMeta, PageLayout, Placement};
    use image::ImageFormat;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(20);

    fn config(dir: &std::path::Path) -> EditorConfig {
        let mut config = EditorConfig::default();
        config.assets_dir = dir.join("tshirts");
        config.export.output_dir = Some(dir.join("out"));
        config
    }

    fn session(dir: &std::path::Path) -> DesignSession {
        DesignSession::with_parts(config(dir), FontBook::empty(), BackendHandle::printpdf()).unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encoded_image(width, height, [220, 40, 40, 255], ImageFormat::Png)
    }

    fn upload(session: &mut DesignSession, width: u32, height: u32) {
        session
            .handle(EditMsg::Upload {
                mime: "image/png".to_string(),
                bytes: png(width, height),
            })
            .unwrap();
        session.settle(WAIT);
    }

    #[test]
    fn test_upload_fits_longer_side() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 300, 100);

        let image = session.scene().image.as_ref().unwrap();
        assert_eq!(image.size.width, 300.0);
        assert_eq!(image.size.height, 100.0);
        assert_eq!(image.rotation, 0.0);
        assert_eq!(image.center(), session.scene().zone.center());
        assert_eq!(session.scene().selection, Selection::Image);

        let notices = session.take_notices();
        assert!(notices.iter().any(|n| !n.is_error()));
    }

    #[test]
    fn test_portrait_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 100, 400);
        let image = session.scene().image.as_ref().unwrap();
        assert_eq!(image.size.height, 300.0);
        assert_eq!(image.size.width, 75.0);
    }

    #[test]
    fn test_invalid_mime_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let before = session.surface().clone();

        let result = session.handle(EditMsg::Upload {
            mime: "image/gif".to_string(),
            bytes: png(10, 10),
        });
        assert!(matches!(result, Err(DesignError::InvalidUpload { .. })));
        session.settle(WAIT);

        assert!(session.scene().image.is_none());
        assert!(session.surface().data() == before.data());
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());
    }

    #[test]
    fn test_undecodable_upload_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session
            .handle(EditMsg::Upload {
                mime: "image/jpeg".to_string(),
                bytes: b"not really a jpeg".to_vec(),
            })
            .unwrap();
        session.settle(WAIT);
        assert!(session.scene().image.is_none());
        assert!(session.take_notices().iter().any(Notice::is_error));
    }

    #[test]
    fn test_clear_text_removes_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.settle(WAIT);
        let blank = session.surface().clone();

        session
            .handle(EditMsg::Text(TextMsg::SetTitle("HELLO".to_string())))
            .unwrap();
        // drag the title so the anchor is pinned
        let center = session.scene().zone.center();
        for (phase, point) in [
            (PointerPhase::Press, center),
            (PointerPhase::Move, center.offset(40.0, 25.0)),
            (PointerPhase::Release, center.offset(40.0, 25.0)),
        ] {
            session
                .handle(EditMsg::Pointer(PointerEvent::mouse(phase, point.x, point.y)))
                .unwrap();
        }
        assert!(matches!(session.scene().text.anchor, Anchor::Fixed(_)));

        session.handle(EditMsg::ClearText).unwrap();
        let text = &session.scene().text;
        assert!(text.title.is_empty());
        assert!(text.subtitle.is_empty());
        assert_eq!(text.anchor, Anchor::Centered);
        assert_eq!(session.scene().selection, Selection::None);
        assert!(session.surface().data() == blank.data());
    }

    #[test]
    fn test_drag_image_by_fifty() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 300, 100);
        let start = session.scene().image.as_ref().unwrap().position;
        let center = session.scene().image.as_ref().unwrap().center();

        let press = PointerEvent::mouse(PointerPhase::Press, center.x, center.y);
        let motion = PointerEvent::mouse(PointerPhase::Move, center.x + 50.0, center.y);
        let release = PointerEvent::mouse(PointerPhase::Release, center.x + 50.0, center.y);
        for event in [press, motion, release] {
            session.handle(EditMsg::Pointer(event)).unwrap();
        }

        let moved = session.scene().image.as_ref().unwrap().position;
        assert_eq!(moved.x, start.x + 50.0);
        assert_eq!(moved.y, start.y);
    }

    #[test]
    fn test_upload_during_drag_ends_gesture() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 300, 100);
        let center = session.scene().image.as_ref().unwrap().center();

        let press = PointerEvent::mouse(PointerPhase::Press, center.x, center.y);
        session.handle(EditMsg::Pointer(press)).unwrap();
        assert!(session.gestures.is_active());

        upload(&mut session, 100, 400);
        assert!(!session.gestures.is_active());
        let placed = session.scene().image.as_ref().unwrap().position;

        let motion = PointerEvent::mouse(PointerPhase::Move, center.x + 50.0, center.y);
        session.handle(EditMsg::Pointer(motion)).unwrap();
        assert_eq!(session.scene().image.as_ref().unwrap().position, placed);
    }

    #[test]
    fn test_pointer_through_scaled_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 300, 100);
        let start = session.scene().image.as_ref().unwrap().position;

        // surface shown at half size, offset by (100, 50)
        let viewport = Viewport {
            display: crate::domain::Rect::new(100.0, 50.0, 512.0, 512.0),
            backing: crate::domain::Size::new(1024.0, 1024.0),
        };
        session.handle(EditMsg::SetViewport(viewport)).unwrap();
        for event in [
            PointerEvent::mouse(PointerPhase::Press, 356.0, 306.0),
            PointerEvent::mouse(PointerPhase::Move, 366.0, 306.0),
            PointerEvent::mouse(PointerPhase::Release, 366.0, 306.0),
        ] {
            session.handle(EditMsg::Pointer(event)).unwrap();
        }
        let moved = session.scene().image.as_ref().unwrap().position;
        assert_eq!(moved.x, start.x + 20.0);
        assert_eq!(moved.y, start.y);
    }

    #[test]
    fn test_shift_drag_rotates() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 300, 100);
        let center = session.scene().image.as_ref().unwrap().center();

        let press = PointerEvent::mouse(PointerPhase::Press, center.x + 100.0, center.y).with_shift(true);
        let motion = PointerEvent::mouse(PointerPhase::Move, center.x, center.y + 100.0);
        session.handle(EditMsg::Pointer(press)).unwrap();
        session.handle(EditMsg::Pointer(motion)).unwrap();
        let rotation = session.scene().image.as_ref().unwrap().rotation;
        assert!((rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        // zoom without an image is a no-op
        session.handle(EditMsg::Zoom(ZoomDirection::In)).unwrap();
        assert!(session.scene().image.is_none());

        upload(&mut session, 300, 100);
        for _ in 0..10 {
            session.handle(EditMsg::Zoom(ZoomDirection::In)).unwrap();
        }
        let image = session.scene().image.as_ref().unwrap();
        assert!((image.size.width - 600.0).abs() < 1e-3);
        let zone = session.scene().zone;
        assert!(image.position.x >= zone.x && image.position.x + image.size.width <= zone.right() + 1e-3);

        for _ in 0..20 {
            session.handle(EditMsg::Zoom(ZoomDirection::Out)).unwrap();
        }
        let image = session.scene().image.as_ref().unwrap();
        assert!((image.size.height - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_out_keeps_thin_image_inside_zone() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 3000, 100);
        let placed = session.scene().image.as_ref().unwrap().clone();
        assert_eq!(placed.size, Size::new(300.0, 10.0));

        session.handle(EditMsg::Zoom(ZoomDirection::Out)).unwrap();
        let image = session.scene().image.as_ref().unwrap();
        assert_eq!(image.size, placed.size);
        assert_eq!(image.position, placed.position);

        for _ in 0..20 {
            session.handle(EditMsg::Zoom(ZoomDirection::In)).unwrap();
        }
        let zone = session.scene().zone;
        let image = session.scene().image.as_ref().unwrap();
        assert!(image.size.width <= zone.width + 1e-3);
        assert!(image.position.x >= zone.x);
        assert!(image.position.x + image.size.width <= zone.right() + 1e-3);
        assert!(image.position.y + image.size.height <= zone.bottom() + 1e-3);
    }

    #[test]
    fn test_text_sizes_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.handle(EditMsg::Text(TextMsg::SetTitleSize(500.0))).unwrap();
        session.handle(EditMsg::Text(TextMsg::SetSubtitleSize(1.0))).unwrap();
        assert_eq!(session.scene().text.title_size, 80.0);
        assert_eq!(session.scene().text.subtitle_size, 16.0);
    }

    #[test]
    fn test_clear_image_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        upload(&mut session, 50, 50);
        let center = session.scene().image.as_ref().unwrap().center();
        let press = PointerEvent::mouse(PointerPhase::Press, center.x, center.y);
        session.handle(EditMsg::Pointer(press)).unwrap();
        session.handle(EditMsg::ClearImage).unwrap();
        assert!(session.scene().image.is_none());
        assert!(!session.gestures.is_active());
        assert_eq!(session.scene().selection, Selection::None);
    }

    #[test]
    fn test_missing_mockup_uses_fill() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.handle(EditMsg::SetGarment("navy".to_string())).unwrap();
        session.settle(WAIT);

        assert!(session.mockup().image.is_none());
        assert!(!session.mockup().loading);
        // no notice for a missing mockup
        assert!(session.take_notices().is_empty());
        let body = session.surface().pixel(300, 900).unwrap();
        assert_eq!((body.red(), body.green(), body.blue()), (0x1E, 0x40, 0xAF));
    }

    #[test]
    fn test_mockup_loaded_from_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("tshirts");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(
            assets.join("red.png"),
            encoded_image(4, 4, [220, 38, 38, 255], ImageFormat::Png),
        )
        .unwrap();

        let mut session = session(dir.path());
        session.handle(EditMsg::SetGarment("red".to_string())).unwrap();
        session.settle(WAIT);
        assert!(session.mockup().image.is_some());
        // the mockup is stretched over the whole surface
        let corner = session.surface().pixel(5, 5).unwrap();
        assert!(corner.red().abs_diff(220) <= 2);
        assert!(corner.green().abs_diff(38) <= 2);
        assert!(corner.blue().abs_diff(38) <= 2);
    }

    #[test]
    fn test_unknown_garment_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let result = session.handle(EditMsg::SetGarment("plaid".to_string()));
        assert!(matches!(result, Err(DesignError::UnknownGarment(_))));
        assert_eq!(session.mockup().key, "white");
    }

    struct SlowBackend {
        gate: crossbeam_channel::Receiver<()>,
    }

    impl DocumentBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        fn compose(&self, _png: &[u8], _page: &PageLayout, _placement: &Placement, _meta: &DocumentMeta) -> Result<Vec<u8>> {
            self.gate.recv_timeout(WAIT)?;
            Ok(b"%PDF-1.3 slow".to_vec())
        }
    }

    #[test]
    fn test_export_while_pending_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (open, gate) = crossbeam_channel::unbounded();
        let backend = Arc::new(SlowBackend { gate });
        let handle = BackendHandle::lazy(move || {
            let backend: Arc<dyn DocumentBackend> = backend.clone();
            Ok(backend)
        });
        let mut session = DesignSession::with_parts(config(dir.path()), FontBook::empty(), handle).unwrap();

        session.handle(EditMsg::Export).unwrap();
        assert!(session.is_exporting());
        assert!(matches!(session.handle(EditMsg::Export), Err(DesignError::ExportBusy)));

        open.send(()).unwrap();
        session.settle(WAIT);
        assert!(!session.is_exporting());
        assert_eq!(session.export_status().exports_written, 1);
        let saved = session.export_status().last_saved.clone().unwrap();
        assert!(saved.starts_with(dir.path().join("out")));

        let notices = session.take_notices();
        assert!(notices.iter().any(|n| n.message().contains("has been saved")));
        assert_eq!(notices.iter().filter(|n| n.is_error()).count(), 1);
    }

    #[test]
    fn test_export_writes_real_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.handle(EditMsg::Text(TextMsg::SetTitle("TEE".to_string()))).unwrap();
        session.handle(EditMsg::Export).unwrap();
        session.settle(WAIT);
        let saved = session.export_status().last_saved.clone().unwrap();
        assert!(std::fs::read(saved).unwrap().starts_with(b"%PDF"));
    }
}

//! Printable PDF export
//!
//! This module provides:
//! - Page layout math for placing the rendered mockup on the page
//! - A lazily created document backend (printpdf)
//! - A single-flight exporter that runs on a worker thread

pub mod layout;
pub mod pdf;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use tiny_skia::Pixmap;

use crate::config::ExportConfig;
use crate::error::DesignError;

pub use layout::{PageLayout, Placement};
pub use pdf::{BackendHandle, DocumentBackend, DocumentMeta, PrintPdfBackend};

/// Encode the surface as an opaque RGB PNG
///
/// The surface is fully painted by the renderer, so alpha is dropped.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    let rgb: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect();
    let mut bytes = Vec::new();
    write_png(&mut bytes, pixmap.width(), pixmap.height(), &rgb)
        .with_context(|| "failed to encode mockup as png")?;
    Ok(bytes)
}

fn write_png<W: io::Write>(w: W, width: u32, height: u32, rgb: &[u8]) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)
}

/// `<prefix>-<timestamp>.pdf`, suffixed with a counter if the name is taken
pub fn export_path(dir: &Path, prefix: &str, now: DateTime<Local>) -> PathBuf {
    let stamp = now.format("%Y-%m-%dT%H-%M-%S");
    let path = dir.join(format!("{prefix}-{stamp}.pdf"));
    if !path.exists() {
        return path;
    }
    (1..)
        .map(|n| dir.join(format!("{prefix}-{stamp}-{n}.pdf")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

/// Runs at most one export at a time
///
/// `begin` snapshots the surface and hands it to a worker thread; the
/// outcome is collected with `poll` or `wait`. A new export is refused until
/// the previous outcome has been collected. Each export gets its own
/// channel, so a worker that dies without reporting still ends the export.
pub struct Exporter {
    backend: BackendHandle,
    settings: ExportConfig,
    running: Option<Receiver<Result<PathBuf>>>,
}

impl Exporter {
    pub fn new(backend: BackendHandle, settings: ExportConfig) -> Self {
        Self {
            backend,
            settings,
            running: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn begin(&mut self, surface: &Pixmap) -> Result<(), DesignError> {
        if self.is_busy() {
            return Err(DesignError::ExportBusy);
        }
        let snapshot = surface.clone();
        let backend = self.backend.clone();
        let settings = self.settings.clone();
        let (tx, rx) = crossbeam_channel::bounded(1);

        std::thread::Builder::new()
            .name("pdf-export".to_string())
            .spawn(move || {
                let result = write_document(&backend, &settings, &snapshot);
                let _ = tx.send(result);
            })
            .map_err(|err| DesignError::Export(anyhow::Error::new(err).context("failed to start export")))?;

        self.running = Some(rx);
        log::info!("PDF export started");
        Ok(())
    }

    /// Collect the outcome of a finished export without blocking
    pub fn poll(&mut self) -> Option<Result<PathBuf>> {
        let outcome = match self.running.as_ref()?.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(anyhow!("export worker exited without a result")),
        };
        Some(self.finish(outcome))
    }

    /// Block until the running export finishes or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<PathBuf>> {
        let outcome = match self.running.as_ref()?.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(anyhow!("export worker exited without a result")),
        };
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: Result<PathBuf>) -> Result<PathBuf> {
        self.running = None;
        match &outcome {
            Ok(path) => log::info!("PDF saved to {}", path.display()),
            Err(err) => log::error!("PDF export failed: {:?}", err),
        }
        outcome
    }
}

fn write_document(backend: &BackendHandle, settings: &ExportConfig, surface: &Pixmap) -> Result<PathBuf> {
    let png = encode_png(surface)?;
    let page = PageLayout::from_config(settings);
    let placement = page.place(surface.width(), surface.height())?;
    let meta = DocumentMeta::from_config(settings);

    let bytes = backend.get()?.compose(&png, &page, &placement, &meta)?;

    let dir = settings.resolved_output_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = export_path(&dir, &settings.file_prefix, Local::now());
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

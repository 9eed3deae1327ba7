use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::config::{GarmentSwatch, HexColor};

/// Garment currently shown behind the overlays
#[derive(Clone, Debug)]
pub struct MockupState {
    pub key: String,
    pub fill: HexColor,
    /// Decoded mockup; `None` while loading or when the asset failed
    pub image: Option<Arc<Pixmap>>,
    pub loading: bool,
}

impl MockupState {
    pub fn pending(swatch: &GarmentSwatch) -> Self {
        Self {
            key: swatch.key.clone(),
            fill: swatch.fill,
            image: None,
            loading: true,
        }
    }

    pub fn loaded(&mut self, image: Pixmap) {
        self.image = Some(Arc::new(image));
        self.loading = false;
    }

    /// Keep the flat swatch fill
    pub fn failed(&mut self) {
        self.image = None;
        self.loading = false;
    }
}

/// Results of finished exports
#[derive(Clone, Debug, Default)]
pub struct ExportStatus {
    pub last_saved: Option<std::path::PathBuf>,
    pub exports_written: usize,
}

//! PDF document backend
//!
//! The backend is created on first use and then shared by every export in
//! the process. A failed initialization is not cached, so the next export
//! tries again.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};

use super::layout::{PageLayout, Placement};
use crate::config::ExportConfig;

/// Document properties written into the PDF info dictionary
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub keywords: Vec<String>,
}

impl DocumentMeta {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            title: config.title.clone(),
            subject: config.subject.clone(),
            creator: config.creator.clone(),
            keywords: config.keywords.clone(),
        }
    }
}

/// Builds a single-page document around a PNG raster
pub trait DocumentBackend: Send + Sync {
    fn name(&self) -> &str;

    fn compose(
        &self,
        png: &[u8],
        page: &PageLayout,
        placement: &Placement,
        meta: &DocumentMeta,
    ) -> Result<Vec<u8>>;
}

pub struct PrintPdfBackend;

impl DocumentBackend for PrintPdfBackend {
    fn name(&self) -> &str {
        "printpdf"
    }

    fn compose(
        &self,
        png: &[u8],
        page: &PageLayout,
        placement: &Placement,
        meta: &DocumentMeta,
    ) -> Result<Vec<u8>> {
        use printpdf::{Image, ImageTransform, Mm, PdfDocument};

        let image = printpdf::image_crate::load_from_memory(png)
            .with_context(|| "failed to decode rendered mockup")?;

        let (doc, page_index, layer_index) = PdfDocument::new(
            &meta.title,
            Mm(page.width_mm),
            Mm(page.height_mm),
            "Mockup",
        );
        let doc = doc
            .with_subject(meta.subject.clone())
            .with_creator(meta.creator.clone())
            .with_keywords(meta.keywords.clone());

        let layer = doc.get_page(page_index).get_layer(layer_index);
        let transform = ImageTransform {
            translate_x: Some(Mm(placement.x_mm)),
            translate_y: Some(Mm(placement.y_mm)),
            rotate: None,
            scale_x: Some(1.0),
            scale_y: Some(1.0),
            dpi: Some(placement.dpi),
        };
        Image::from_dynamic_image(&image).add_to_layer(layer, transform);

        let mut buffer = Vec::new();
        {
            let mut writer = std::io::BufWriter::new(&mut buffer);
            doc.save(&mut writer).with_context(|| "failed to write pdf")?;
        }
        Ok(buffer)
    }
}

type BackendFactory = dyn Fn() -> Result<Arc<dyn DocumentBackend>> + Send + Sync;

/// Lazily initialized, shared document backend
#[derive(Clone)]
pub struct BackendHandle {
    slot: Arc<Mutex<Option<Arc<dyn DocumentBackend>>>>,
    factory: Arc<BackendFactory>,
}

impl BackendHandle {
    pub fn lazy<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn DocumentBackend>> + Send + Sync + 'static,
    {
        Self {
            slot: Arc::new(Mutex::new(None)),
            factory: Arc::new(factory),
        }
    }

    pub fn printpdf() -> Self {
        Self::lazy(|| {
            let backend: Arc<dyn DocumentBackend> = Arc::new(PrintPdfBackend);
            Ok(backend)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// The shared backend, creating it on first call
    pub fn get(&self) -> Result<Arc<dyn DocumentBackend>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("document backend lock poisoned"))?;
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }
        let backend = (self.factory)().with_context(|| "failed to initialize document backend")?;
        log::debug!("Initialized document backend '{}'", backend.name());
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

//! Page geometry for the printable mockup

use anyhow::{Result, bail};

use crate::config::ExportConfig;

const MM_PER_INCH: f32 = 25.4;

/// Page size and margins in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

/// Where the raster lands on the page
///
/// `y_mm` is measured from the bottom edge, as in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    /// Resolution that makes the raster exactly `width_mm` wide
    pub dpi: f32,
}

impl PageLayout {
    pub const A4: PageLayout = PageLayout {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_mm: 10.0,
    };

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            width_mm: config.page_width_mm,
            height_mm: config.page_height_mm,
            margin_mm: config.margin_mm,
        }
    }

    /// Fit a `width_px` x `height_px` raster between the side margins,
    /// centered vertically
    ///
    /// Rasters too tall for the page are fitted to the printable height.
    pub fn place(&self, width_px: u32, height_px: u32) -> Result<Placement> {
        if width_px == 0 || height_px == 0 {
            bail!("cannot place an empty raster ({}x{})", width_px, height_px);
        }
        let avail_w = self.width_mm - 2.0 * self.margin_mm;
        let avail_h = self.height_mm - 2.0 * self.margin_mm;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            bail!(
                "margins of {}mm leave no room on a {}x{}mm page",
                self.margin_mm,
                self.width_mm,
                self.height_mm
            );
        }

        let aspect = height_px as f32 / width_px as f32;
        let mut width_mm = avail_w;
        let mut height_mm = width_mm * aspect;
        if height_mm > avail_h {
            height_mm = avail_h;
            width_mm = height_mm / aspect;
        }

        Ok(Placement {
            x_mm: (self.width_mm - width_mm) / 2.0,
            y_mm: (self.height_mm - height_mm) / 2.0,
            width_mm,
            height_mm,
            dpi: width_px as f32 * MM_PER_INCH / width_mm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_square_surface_on_a4() {
        let placement = PageLayout::A4.place(1024, 1024).unwrap();
        assert!(close(placement.width_mm, 190.0));
        assert!(close(placement.height_mm, 190.0));
        assert!(close(placement.x_mm, 10.0));
        assert!(close(placement.y_mm, 53.5));
        // 1024 px across 190 mm
        assert!(close(placement.dpi, 1024.0 * 25.4 / 190.0));
    }

    #[test]
    fn test_tall_raster_fits_height() {
        let placement = PageLayout::A4.place(100, 1000).unwrap();
        assert!(close(placement.height_mm, 277.0));
        assert!(close(placement.width_mm, 27.7));
        assert!(close(placement.y_mm, 10.0));
        assert!(close(placement.x_mm, (210.0 - 27.7) / 2.0));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(PageLayout::A4.place(0, 10).is_err());
        let cramped = PageLayout {
            width_mm: 20.0,
            height_mm: 20.0,
            margin_mm: 10.0,
        };
        assert!(cramped.place(10, 10).is_err());
    }

    #[test]
    fn test_from_config_defaults_to_a4() {
        assert_eq!(PageLayout::from_config(&ExportConfig::default()), PageLayout::A4);
    }
}

//! Editor configuration
//!
//! Loaded from a TOML file. Every field has a default so a partial file (or
//! no file at all) still yields a usable configuration.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::domain::{Rect, Size};

/// sRGB color written as `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);
    pub const WHITE: HexColor = HexColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            bail!("color must be #RRGGBB or #RRGGBBAA, got '{value}'");
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid color channel in '{value}'"))
        };
        match hex.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => bail!("color must be #RRGGBB or #RRGGBBAA, got '{value}'"),
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// CSS form used in generated SVG (`#rrggbb`, alpha handled separately)
    pub fn to_css_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

/// One garment swatch: asset key plus the flat color used while the
/// mockup image is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentSwatch {
    pub key: String,
    pub fill: HexColor,
}

impl GarmentSwatch {
    fn new(key: &str, fill: HexColor) -> Self {
        Self {
            key: key.to_string(),
            fill,
        }
    }
}

/// Image overlay placement and zoom limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Longer side of a freshly uploaded image
    pub max_dimension: f32,
    /// Smallest allowed shorter side when zooming out
    pub zoom_min: f32,
    /// Largest allowed longer side when zooming in
    pub zoom_max: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_dimension: 300.0,
            zoom_min: 30.0,
            zoom_max: 600.0,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
        }
    }
}

/// Defaults and limits for the text controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub font_family: String,
    pub color: HexColor,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub title_size_range: (f32, f32),
    pub subtitle_size_range: (f32, f32),
    /// Hint drawn inside the empty placement zone
    pub placeholder_label: String,
    /// Extra font files loaded next to the system fonts
    pub font_files: Vec<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            color: HexColor::BLACK,
            title_size: 32.0,
            subtitle_size: 24.0,
            title_size_range: (20.0, 80.0),
            subtitle_size_range: (16.0, 60.0),
            placeholder_label: "Design area".to_string(),
            font_files: Vec::new(),
        }
    }
}

/// PDF export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub file_prefix: String,
    /// Output directory; the user's documents folder when unset
    pub output_dir: Option<PathBuf>,
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub keywords: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            // A4 portrait
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            file_prefix: "tshirt-design".to_string(),
            output_dir: None,
            title: "Custom T-Shirt Mockup".to_string(),
            subject: "High quality t-shirt design".to_string(),
            creator: "teeforge".to_string(),
            keywords: vec![
                "tshirt".to_string(),
                "design".to_string(),
                "mockup".to_string(),
            ],
        }
    }
}

impl ExportConfig {
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents"))))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Backing resolution of the drawing surface
    pub surface: Size,
    /// Region where overlays may be placed
    pub zone: Rect,
    /// Directory holding `<garment-key>.png` mockups
    pub assets_dir: PathBuf,
    pub garments: Vec<GarmentSwatch>,
    pub default_garment: String,
    /// Area filled with the swatch color when the mockup is unavailable
    pub fallback_body: Rect,
    pub overlay: OverlayConfig,
    pub text: TextConfig,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface: Size::new(1024.0, 1024.0),
            zone: Rect::new(212.0, 212.0, 600.0, 600.0),
            assets_dir: PathBuf::from("tshirts"),
            garments: vec![
                GarmentSwatch::new("white", HexColor::rgb(0xFF, 0xFF, 0xFF)),
                GarmentSwatch::new("black", HexColor::rgb(0x1F, 0x29, 0x37)),
                GarmentSwatch::new("green", HexColor::rgb(0x05, 0x96, 0x69)),
                GarmentSwatch::new("navy", HexColor::rgb(0x1E, 0x40, 0xAF)),
                GarmentSwatch::new("red", HexColor::rgb(0xDC, 0x26, 0x26)),
                GarmentSwatch::new("purple", HexColor::rgb(0x7C, 0x3A, 0xED)),
                GarmentSwatch::new("beige", HexColor::rgb(0xF5, 0xF5, 0xDC)),
                GarmentSwatch::new("brown", HexColor::rgb(0x8B, 0x45, 0x13)),
            ],
            default_garment: "white".to_string(),
            fallback_body: Rect::new(192.0, 128.0, 640.0, 832.0),
            overlay: OverlayConfig::default(),
            text: TextConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Default location: `<config_dir>/teeforge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("teeforge").join("config.toml"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.surface.width < 1.0 || self.surface.height < 1.0 {
            bail!("surface must be at least 1x1");
        }
        if self.zone.width <= 0.0 || self.zone.height <= 0.0 {
            bail!("placement zone must have a positive size");
        }
        if self.zone.x < 0.0
            || self.zone.y < 0.0
            || self.zone.right() > self.surface.width
            || self.zone.bottom() > self.surface.height
        {
            bail!("placement zone must lie inside the surface");
        }
        let overlay = &self.overlay;
        if overlay.max_dimension <= 0.0 {
            bail!("overlay.max_dimension must be positive");
        }
        if overlay.max_dimension > self.zone.width.min(self.zone.height) {
            bail!("overlay.max_dimension must fit inside the placement zone");
        }
        if !(overlay.zoom_min > 0.0 && overlay.zoom_min <= overlay.zoom_max) {
            bail!("overlay zoom limits must satisfy 0 < zoom_min <= zoom_max");
        }
        if !(overlay.zoom_in_factor > 1.0) {
            bail!("overlay.zoom_in_factor must be greater than 1");
        }
        if !(overlay.zoom_out_factor > 0.0 && overlay.zoom_out_factor < 1.0) {
            bail!("overlay.zoom_out_factor must be between 0 and 1");
        }
        for (name, (min, max)) in [
            ("text.title_size_range", self.text.title_size_range),
            ("text.subtitle_size_range", self.text.subtitle_size_range),
        ] {
            if !(min > 0.0 && min <= max) {
                bail!("{} must satisfy 0 < min <= max", name);
            }
        }
        if self.garment(&self.default_garment).is_none() {
            bail!("default garment '{}' is not in the palette", self.default_garment);
        }
        Ok(())
    }

    pub fn garment(&self, key: &str) -> Option<&GarmentSwatch> {
        self.garments.iter().find(|g| g.key == key)
    }

    /// Pixel size of the surface
    pub fn surface_pixels(&self) -> (u32, u32) {
        (
            self.surface.width.round().max(1.0) as u32,
            self.surface.height.round().max(1.0) as u32,
        )
    }
}

//! Pixel image import
//!
//! Turns a small raster into a point cloud: the image is stretched to an
//! N×N square, every second pixel on both axes is sampled, and each opaque
//! enough sample becomes one element centred on the image middle.
//! The import replaces the target layer's elements.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use tracing::debug;

use crate::color::rgb_to_hex;
use crate::error::{FxError, Result};
use crate::scene::{Element, ElementKind, ElementSource, ImportMode, Layer};

/// Default side of the resized square.
pub const DEFAULT_IMAGE_SIZE: u32 = 20;

/// Smallest side used in performance mode.
pub const MIN_PERFORMANCE_SIZE: u32 = 4;

/// Sample every n-th pixel on both axes.
pub const SAMPLE_STEP: usize = 2;

/// Minimum alpha kept in performance mode. Otherwise any alpha above zero.
pub const PERFORMANCE_MIN_ALPHA: u8 = 100;

/// Canvas pixels per scene unit.
const PIXELS_PER_UNIT: f64 = 10.0;

/// Element color when real colors are off.
const FLAT_COLOR: &str = "#000000";

pub struct PixelImport {
    image: RgbaImage,
    size: u32,
    performance: bool,
    real_color: bool,
}

impl PixelImport {
    /// Decode an image file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let image = image::open(path)?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "image decoded"
        );
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
            size: DEFAULT_IMAGE_SIZE,
            performance: false,
            real_color: false,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn with_performance(mut self, performance: bool) -> Self {
        self.performance = performance;
        self
    }

    /// Color elements with their pixel color instead of black.
    pub fn with_real_color(mut self, real_color: bool) -> Self {
        self.real_color = real_color;
        self
    }

    /// Side of the square the image is resized to.
    pub fn target_size(&self) -> u32 {
        if self.performance {
            (self.size / 2).max(MIN_PERFORMANCE_SIZE)
        } else {
            self.size
        }
    }

    fn keeps(&self, alpha: u8) -> bool {
        if self.performance {
            alpha >= PERFORMANCE_MIN_ALPHA
        } else {
            alpha > 0
        }
    }
}

impl ElementSource for PixelImport {
    fn elements(&self, layer: &Layer) -> Result<Vec<Element>> {
        let n = self.target_size();
        let resized = imageops::resize(&self.image, n, n, FilterType::Lanczos3);
        let (width, height) = resized.dimensions();
        let half_w = (width / 2) as f64;
        let half_h = (height / 2) as f64;

        let mut elements = Vec::new();
        for y in (0..height).step_by(SAMPLE_STEP) {
            for x in (0..width).step_by(SAMPLE_STEP) {
                let [r, g, b, a] = resized.get_pixel(x, y).0;
                if !self.keeps(a) {
                    continue;
                }
                let color = if self.real_color {
                    rgb_to_hex(r, g, b)
                } else {
                    FLAT_COLOR.to_string()
                };
                let position = (
                    (x as f64 - half_w) / PIXELS_PER_UNIT,
                    (y as f64 - half_h) / PIXELS_PER_UNIT,
                );
                elements.push(
                    Element::new(ElementKind::Image, position)
                        .with_color(color)
                        .with_ticks(layer.tick_start, layer.tick_end),
                );
            }
        }

        debug!(size = n, count = elements.len(), "pixels sampled");
        Ok(elements)
    }

    fn import_mode(&self) -> ImportMode {
        ImportMode::Replace
    }

    fn describe(&self) -> String {
        "Import image".to_string()
    }
}

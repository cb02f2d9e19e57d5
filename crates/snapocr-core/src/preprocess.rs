use std::io::{BufWriter, Write};
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use snapocr_config::preprocess::PreprocessConfig;
use tempfile::TempPath;

use crate::error::{OcrError, Result};

/// Bounds the resolution handed to the engine and stages it on disk
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    max_width: u32,
    max_height: u32,
}

impl ImagePreprocessor {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    /// Size after normalization, `None` if the image already fits
    pub fn target_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width <= self.max_width && height <= self.max_height {
            return None;
        }

        let scale = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        Some((new_width, new_height))
    }

    /// Downscale with Lanczos3 keeping aspect ratio; in-bound images pass through
    pub fn normalize(&self, image: DynamicImage) -> DynamicImage {
        match self.target_size(image.width(), image.height()) {
            Some((width, height)) => {
                tracing::debug!(
                    "Resizing {}x{} -> {}x{}",
                    image.width(),
                    image.height(),
                    width,
                    height
                );
                image.resize_exact(width, height, FilterType::Lanczos3)
            }
            None => image,
        }
    }

    /// Write a PNG to a private temp file; dropping the guard deletes it
    pub fn persist(&self, image: &DynamicImage) -> Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("snapocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Preprocessing(format!("failed to create temp file: {e}")))?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            image
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(|e| OcrError::Preprocessing(format!("failed to write temp image: {e}")))?;
            writer
                .flush()
                .map_err(|e| OcrError::Preprocessing(format!("failed to flush temp image: {e}")))?;
        }

        let path = file.into_temp_path();
        tracing::debug!("Staged image at {}", path.display());
        Ok(path)
    }
}

impl From<&PreprocessConfig> for ImagePreprocessor {
    fn from(config: &PreprocessConfig) -> Self {
        Self::new(config.max_width, config.max_height)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::from(&PreprocessConfig::default())
    }
}

/// Open a user-selected image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path)
        .map_err(|e| OcrError::Preprocessing(format!("cannot load {}: {e}", path.display())))
}

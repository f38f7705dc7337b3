use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use qrdrop_core::AppError;

/// Rasterizes a string (the play link) into a scannable PNG.
pub trait CodeRenderer: Send + Sync {
    fn render_png(&self, data: &str) -> Result<Vec<u8>, AppError>;
}

/// QR renderer: the smallest version that fits, error-correction level L,
/// black modules on white with a 4-module quiet zone.
#[derive(Debug, Clone)]
pub struct QrCodeRenderer {
    module_px: u32,
}

impl Default for QrCodeRenderer {
    fn default() -> Self {
        Self { module_px: 10 }
    }
}

impl QrCodeRenderer {
    pub fn new(module_px: u32) -> Self {
        Self {
            module_px: module_px.max(1),
        }
    }
}

impl CodeRenderer for QrCodeRenderer {
    fn render_png(&self, data: &str) -> Result<Vec<u8>, AppError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
            .map_err(|e| AppError::Internal(format!("QR encoding failed: {}", e)))?;

        let img = code
            .render::<Luma<u8>>()
            .dark_color(Luma([0u8]))
            .light_color(Luma([255u8]))
            .quiet_zone(true)
            .module_dimensions(self.module_px, self.module_px)
            .build();

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("PNG encoding failed: {}", e)))?;
        Ok(png)
    }
}

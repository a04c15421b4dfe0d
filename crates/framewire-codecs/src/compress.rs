use framewire_core::{error::Result, frame::Frame, traits::SizeBudget};
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, ColorType, DynamicImage, GenericImageView,
};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityLadder {
    pub initial: u8,
    pub step: u8,
    pub floor: u8,
}

impl Default for QualityLadder {
    fn default() -> Self {
        Self {
            initial: 85,
            step: 5,
            floor: 5,
        }
    }
}

impl QualityLadder {
    fn next(&self, quality: u8) -> u8 {
        quality.saturating_sub(self.step.max(1)).max(self.floor)
    }
}

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

/// Resizes the frame so its longest edge fits the budget, then walks the
/// quality ladder down until the JPEG fits `budget.max_bytes` or the floor is hit.
pub fn compress_frame(
    frame: &Frame,
    budget: &SizeBudget,
    ladder: &QualityLadder,
) -> Result<CompressedImage> {
    let image = image::load_from_memory(frame.bytes())?;
    let image = fit_within(normalize_color(image), budget.max_dimension);
    let (width, height) = image.dimensions();

    let mut quality = ladder.initial.max(ladder.floor);

    loop {
        let bytes = encode_jpeg(&image, quality)?;

        debug!(
            "{}: {} bytes at quality {} (budget: {} bytes)",
            frame.filename(),
            bytes.len(),
            quality,
            budget.max_bytes
        );

        if bytes.len() <= budget.max_bytes || quality <= ladder.floor {
            return Ok(CompressedImage {
                bytes,
                quality,
                width,
                height,
            });
        }

        quality = ladder.next(quality);
    }
}

// JPEG carries no alpha or palette: those collapse to RGB, grayscale stays grayscale
fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => image,
        ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let longest_edge = width.max(height);

    if longest_edge <= max_dimension {
        return image;
    }

    let ratio = max_dimension as f64 / longest_edge as f64;
    let scale = |dimension: u32| ((dimension as f64 * ratio) as u32).clamp(1, max_dimension);

    image.resize_exact(scale(width), scale(height), FilterType::Lanczos3)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

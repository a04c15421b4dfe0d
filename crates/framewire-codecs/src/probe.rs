use std::{io::Cursor, time::Instant};

use framewire_core::{error::Result, frame::ImageInfo};
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};

/// Reads dimensions, container format and color type from the image headers
/// without decoding any pixel data.
pub fn probe_image(bytes: &[u8], started: Instant) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();

    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();

    Ok(image_info(
        width,
        height,
        format.map(format_name),
        color,
        started,
    ))
}

pub fn image_info(
    width: u32,
    height: u32,
    format: Option<String>,
    color: ColorType,
    started: Instant,
) -> ImageInfo {
    ImageInfo {
        width,
        height,
        format,
        mode: color_mode(color).to_string(),
        channels: color.channel_count(),
        process_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        fragments_received: None,
        image_id: None,
    }
}

pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

pub fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::L16 => "I;16",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "unknown",
    }
}

//! Image post-processing: platform resize and size-limited JPEG encoding

use ad_poster_domain::{ImageError, PlatformSettings};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

/// Content type for an upload, derived from the file extension
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Decode raw model output, resize to the platform's optimal dimensions, and
/// JPEG-encode it. When the platform declares a byte ceiling the encoding is
/// retried at decreasing quality; the result is never over the limit.
pub fn prepare_jpeg(raw: &[u8], settings: &PlatformSettings) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(raw).map_err(|e| ImageError::Decode(e.to_string()))?;

    let (width, height) = settings.optimal_image_size;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    match settings.max_image_kb {
        Some(limit_kb) => compress_under_limit(&rgb, limit_kb),
        None => encode_jpeg(&rgb, 95),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Re-encode at decreasing quality until the output fits under `limit_kb`.
/// Gives up below quality 15 rather than exceed the limit.
pub fn compress_under_limit(img: &DynamicImage, limit_kb: u64) -> Result<Vec<u8>, ImageError> {
    let mut quality = 95u8;
    while quality > 10 {
        let buf = encode_jpeg(img, quality)?;
        if buf.len() as u64 <= limit_kb * 1024 {
            return Ok(buf);
        }
        quality -= 5;
    }
    Err(ImageError::TooLarge { limit_kb })
}

use crate::error::SealError;
use image::{imageops, imageops::FilterType, Rgb, RgbImage};

const BORDER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Decode any supported raster format into a 3-channel buffer
pub fn decode(bytes: &[u8]) -> Result<RgbImage, SealError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.into_rgb8())
}

/// Downscale to `max_width` when wider, keeping the aspect ratio
pub fn fit_width(image: RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return image;
    }

    let new_height = ((height as f64 * max_width as f64 / width as f64).round() as u32).max(1);
    // Triangle widens its support when shrinking, so it averages like an area filter
    imageops::resize(&image, max_width, new_height, FilterType::Triangle)
}

/// Surround with a white border so blobs touching the edge keep a closed contour
pub fn pad(image: &RgbImage, border: u32) -> Result<RgbImage, SealError> {
    if border == 0 {
        return Ok(image.clone());
    }

    let (width, height) = image.dimensions();
    let grow = |side: u32| {
        border
            .checked_mul(2)
            .and_then(|b| side.checked_add(b))
            .ok_or_else(|| {
                SealError::invalid_config(
                    "border_padding",
                    format!("{} overflows a {}x{} image", border, width, height),
                )
            })
    };
    let mut canvas = RgbImage::from_pixel(grow(width)?, grow(height)?, BORDER_COLOR);
    imageops::replace(&mut canvas, image, border as i64, border as i64);
    Ok(canvas)
}

use crate::model::{BoundingBox, CanonicalCrop};
use image::{imageops, imageops::FilterType, Rgb, RgbImage};

/// Crop, letterbox and resize settings
#[derive(Debug, Clone, Copy)]
pub struct NormalizeParams {
    pub margin: u32,
    pub canonical_size: u32,
    pub fill: Rgb<u8>,
}

/// Pad the shorter side so the image becomes square. Any odd pixel goes to
/// the trailing side.
pub fn letterbox(image: &RgbImage, fill: Rgb<u8>) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image.clone();
    }

    let side = width.max(height);
    let offset_x = (side - width) / 2;
    let offset_y = (side - height) / 2;

    let mut square = RgbImage::from_pixel(side, side, fill);
    imageops::replace(&mut square, image, offset_x as i64, offset_y as i64);
    square
}

/// Scale a square image to `size`, averaging when shrinking and using a cubic
/// kernel when enlarging
pub fn resize_square(image: &RgbImage, size: u32) -> RgbImage {
    let side = image.width();
    if side == size {
        return image.clone();
    }

    let filter = if side > size {
        FilterType::Triangle
    } else {
        FilterType::CatmullRom
    };
    imageops::resize(image, size, size, filter)
}

/// Cut one candidate out of the color working image and normalize it
pub fn apply(working: &RgbImage, bbox: BoundingBox, params: &NormalizeParams) -> CanonicalCrop {
    let region = bbox.expand_within(params.margin, working.width(), working.height());
    let cropped = imageops::crop_imm(working, region.x, region.y, region.width, region.height)
        .to_image();

    let square = letterbox(&cropped, params.fill);
    let image = resize_square(&square, params.canonical_size);

    CanonicalCrop {
        image,
        bbox,
        area: bbox.area(),
    }
}

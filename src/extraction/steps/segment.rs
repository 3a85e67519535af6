use crate::config::{kernel_radius, HueRange};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// HSV pixels packed the same way as RGB: `[hue, saturation, value]`
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Convert one pixel to 8-bit HSV.
///
/// Hue is degrees halved so it fits a byte (`0..180`), saturation and value
/// span `0..=255`. Red sits at both ends of the hue axis.
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = (max - min) as f32;

    let saturation = if max == 0 {
        0
    } else {
        (255.0 * diff / max as f32).round() as u8
    };

    if diff == 0.0 {
        return [0, saturation, max];
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let mut degrees = if max as f32 == r {
        60.0 * (g - b) / diff
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if degrees < 0.0 {
        degrees += 360.0;
    }

    let mut hue = (degrees / 2.0).round() as u32;
    if hue >= 180 {
        hue -= 180;
    }

    [hue as u8, saturation, max]
}

pub fn to_hsv(image: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(image.width(), image.height());
    for (out, px) in hsv.pixels_mut().zip(image.pixels()) {
        *out = Rgb(rgb_to_hsv(*px));
    }
    hsv
}

/// Binary membership mask: 255 where the pixel lies inside `range`
pub fn in_range(hsv: &HsvImage, range: &HueRange) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (out, px) in mask.pixels_mut().zip(hsv.pixels()) {
        *out = Luma([if range.contains(px.0) { 255 } else { 0 }]);
    }
    mask
}

/// Keep the colors of pixels that fall into any range, paint the rest white.
///
/// Each membership mask is grown with a square element of `dilate_size`
/// before it is applied, which absorbs anti-aliased fringe pixels.
pub fn apply(image: &RgbImage, ranges: &[HueRange], dilate_size: u32) -> RgbImage {
    let hsv = to_hsv(image);
    let radius = kernel_radius(dilate_size);
    let mut composite = RgbImage::from_pixel(image.width(), image.height(), BACKGROUND);

    for range in ranges {
        let mut membership = in_range(&hsv, range);
        if radius > 0 {
            membership = dilate(&membership, Norm::LInf, radius);
        }

        for ((out, src), hit) in composite
            .pixels_mut()
            .zip(image.pixels())
            .zip(membership.pixels())
        {
            if hit.0[0] != 0 {
                *out = *src;
            }
        }
    }

    composite
}

use crate::model::{Candidate, CanonicalCrop, ExtractionResult};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

/// Copy of the working image with each contour traced at `thickness` pixels
pub fn annotate(
    working: &RgbImage,
    candidates: &[Candidate],
    color: Rgb<u8>,
    thickness: u32,
) -> RgbImage {
    let mut annotated = working.clone();
    let radius = (thickness / 2) as i32;

    for candidate in candidates {
        for point in &candidate.contour {
            if radius == 0 {
                if point.x >= 0
                    && point.y >= 0
                    && (point.x as u32) < annotated.width()
                    && (point.y as u32) < annotated.height()
                {
                    annotated.put_pixel(point.x as u32, point.y as u32, color);
                }
            } else {
                draw_filled_circle_mut(&mut annotated, (point.x, point.y), radius, color);
            }
        }
    }

    annotated
}

pub fn apply(
    working: &RgbImage,
    candidates: &[Candidate],
    crops: Vec<CanonicalCrop>,
    color: Rgb<u8>,
    thickness: u32,
) -> ExtractionResult {
    ExtractionResult {
        annotated_image: annotate(working, candidates, color, thickness),
        candidates: crops,
    }
}

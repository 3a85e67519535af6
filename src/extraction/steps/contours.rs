use crate::model::{BoundingBox, Candidate};
use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;
use imageproc::point::Point;

/// Edge map of a binary mask. A one-pixel dilation closes the breaks that
/// non-maximum suppression occasionally leaves on diagonals.
pub fn edges(mask: &GrayImage, low: f32, high: f32) -> GrayImage {
    let edges = canny(mask, low, high);
    dilate(&edges, Norm::LInf, 1)
}

/// Smallest inclusive box around the points; `None` for an empty slice
pub fn bounding_box(points: &[Point<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(BoundingBox {
        x: min_x.max(0) as u32,
        y: min_y.max(0) as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}

/// Background margin around the mask while tracing. Blobs cut by the image
/// edge still get a closed border, and edge pixels never sit on the frame.
const FRAME: u32 = 4;

/// Copy of `mask` inside a `FRAME`-pixel background border
fn framed(mask: &GrayImage) -> GrayImage {
    let mut canvas = GrayImage::new(mask.width() + 2 * FRAME, mask.height() + 2 * FRAME);
    imageops::replace(&mut canvas, mask, FRAME as i64, FRAME as i64);
    canvas
}

/// Outer contours of the cleaned mask. Hole borders and contours nested
/// inside another blob are skipped.
pub fn apply(mask: &GrayImage, low: f32, high: f32) -> Vec<Candidate> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let edge_map = edges(&framed(mask), low, high);
    let max_x = mask.width() as i32 - 1;
    let max_y = mask.height() as i32 - 1;
    let offset = FRAME as i32;

    find_contours::<i32>(&edge_map)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let contour: Vec<Point<i32>> = c
                .points
                .iter()
                .map(|p| {
                    Point::new(
                        (p.x - offset).clamp(0, max_x),
                        (p.y - offset).clamp(0, max_y),
                    )
                })
                .collect();
            let bbox = bounding_box(&contour)?;
            Some(Candidate { bbox, contour })
        })
        .collect()
}

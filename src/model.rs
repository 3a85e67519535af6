use image::{imageops, RgbImage};
use imageproc::point::Point;
use serde::Serialize;

/// Axis-aligned box in padded working-image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Grow by `margin` on every side, clamped to a `bounds_width` x `bounds_height` image
    pub fn expand_within(&self, margin: u32, bounds_width: u32, bounds_height: u32) -> Self {
        let x0 = self.x.saturating_sub(margin).min(bounds_width.saturating_sub(1));
        let y0 = self.y.saturating_sub(margin).min(bounds_height.saturating_sub(1));
        let x1 = self
            .x
            .saturating_add(self.width)
            .saturating_add(margin)
            .min(bounds_width);
        let y1 = self
            .y
            .saturating_add(self.height)
            .saturating_add(margin)
            .min(bounds_height);

        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0).max(1),
            height: y1.saturating_sub(y0).max(1),
        }
    }
}

/// One external contour and the box around it
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub contour: Vec<Point<i32>>,
}

impl Candidate {
    pub fn area(&self) -> u64 {
        self.bbox.area()
    }
}

/// Fixed-size square image of one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalCrop {
    pub image: RgbImage,
    /// Box the crop originates from, before margin expansion
    pub bbox: BoundingBox,
    pub area: u64,
}

/// Output of one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Padded working image with accepted contours drawn
    pub annotated_image: RgbImage,
    /// Ordered by originating box area, largest first
    pub candidates: Vec<CanonicalCrop>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// All crops side by side, or `None` when nothing was found
    pub fn strip(&self) -> Option<RgbImage> {
        let first = self.candidates.first()?;
        if self.candidates.len() == 1 {
            return Some(first.image.clone());
        }

        let width = self.candidates.iter().map(|c| c.image.width()).sum();
        let height = self
            .candidates
            .iter()
            .map(|c| c.image.height())
            .max()
            .unwrap_or(0);

        let mut strip = RgbImage::new(width, height);
        let mut offset = 0i64;
        for crop in &self.candidates {
            imageops::replace(&mut strip, &crop.image, offset, 0);
            offset += crop.image.width() as i64;
        }
        Some(strip)
    }
}

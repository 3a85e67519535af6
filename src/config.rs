//! Configuration for the server and the extraction pipeline.
//!
//! [`ExtractionConfig`] holds every tunable the pipeline reads. All fields
//! have defaults, so a JSON file only needs to name what it overrides:
//!
//! ```json
//! { "close_kernel_size": 40, "top_k": 2 }
//! ```

use crate::error::SealError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest structuring-element diameter; radii are stored as `u8`.
pub const MAX_KERNEL_SIZE: u32 = 511;

/// Upper bound of the 8-bit hue axis (degrees halved).
pub const HUE_MAX: u8 = 180;

/// Largest white margin around the working image, per side.
pub const MAX_BORDER_PADDING: u32 = 4096;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub config_path: Option<PathBuf>,
}

/// Inclusive HSV bounds. Hue is in `0..=180`, saturation and value in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HueRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// Second morphological pass applied after the speckle-removing opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOp {
    /// Dilate then erode: fills gaps without growing the blob
    #[default]
    Close,
    /// Dilate only: fills gaps and grows the blob by the kernel radius
    Dilate,
}

/// Pipeline tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Images wider than this are downscaled before segmentation
    pub max_working_width: u32,
    /// Red needs two ranges, one on each side of the hue wraparound
    pub hue_ranges: Vec<HueRange>,
    /// Square dilation applied to each range's membership mask (1 disables).
    /// Like the kernel sizes below, even values round up to the next odd
    /// element (4 gives 5x5).
    pub segment_dilate_size: u32,
    /// Gray level at or below which a composited pixel counts as ink
    pub foreground_threshold: u8,
    /// Diameter of the elliptical opening element
    pub open_kernel_size: u32,
    /// Diameter of the elliptical closing/dilation element
    pub close_kernel_size: u32,
    pub merge_op: MergeOp,
    /// Canny (low, high)
    pub edge_thresholds: (f32, f32),
    /// Boxes smaller than this are discarded before ranking
    pub min_candidate_area: u64,
    pub top_k: usize,
    /// Pixels added around each box before cropping
    pub crop_margin: u32,
    pub canonical_size: u32,
    /// White margin added around the working image before contour search
    pub border_padding: u32,
    /// Letterbox color
    pub fill_color: [u8; 3],
    pub annotation_color: [u8; 3],
    /// Contour pen width. Points are stamped as discs of radius
    /// `thickness / 2`, so even widths draw one pixel wider (2 draws 3).
    pub annotation_thickness: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_working_width: 1024,
            hue_ranges: vec![
                HueRange::new([0, 43, 46], [10, 255, 255]),
                HueRange::new([156, 43, 46], [HUE_MAX, 255, 255]),
            ],
            segment_dilate_size: 3,
            foreground_threshold: 253,
            open_kernel_size: 3,
            close_kernel_size: 100,
            merge_op: MergeOp::Close,
            edge_thresholds: (10.0, 10.0),
            min_candidate_area: 0,
            top_k: 4,
            crop_margin: 10,
            canonical_size: 300,
            border_padding: 50,
            fill_color: [255, 255, 255],
            annotation_color: [0, 255, 0],
            annotation_thickness: 5,
        }
    }
}

impl ExtractionConfig {
    /// Load from a JSON file and validate
    pub fn from_json_file(path: &Path) -> Result<Self, SealError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SealError::invalid_config("config", format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            SealError::invalid_config("config", format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SealError> {
        if self.max_working_width == 0 {
            return Err(SealError::invalid_config("max_working_width", "must be positive"));
        }
        if self.canonical_size == 0 {
            return Err(SealError::invalid_config("canonical_size", "must be positive"));
        }
        if self.top_k == 0 {
            return Err(SealError::invalid_config("top_k", "must be positive"));
        }
        if self.annotation_thickness == 0 {
            return Err(SealError::invalid_config("annotation_thickness", "must be positive"));
        }

        if self.border_padding > MAX_BORDER_PADDING {
            return Err(SealError::invalid_config(
                "border_padding",
                format!("must be at most {}, got {}", MAX_BORDER_PADDING, self.border_padding),
            ));
        }

        check_kernel("segment_dilate_size", self.segment_dilate_size)?;
        check_kernel("open_kernel_size", self.open_kernel_size)?;
        check_kernel("close_kernel_size", self.close_kernel_size)?;

        if self.hue_ranges.is_empty() {
            return Err(SealError::invalid_config("hue_ranges", "must not be empty"));
        }
        for (i, range) in self.hue_ranges.iter().enumerate() {
            if range.lower[0] > HUE_MAX || range.upper[0] > HUE_MAX {
                return Err(SealError::invalid_config(
                    "hue_ranges",
                    format!("range {} has hue above {}", i, HUE_MAX),
                ));
            }
            if (0..3).any(|c| range.lower[c] > range.upper[c]) {
                return Err(SealError::invalid_config(
                    "hue_ranges",
                    format!("range {} has a lower bound above its upper bound", i),
                ));
            }
        }

        let (low, high) = self.edge_thresholds;
        if !(low >= 0.0 && high >= low) {
            return Err(SealError::invalid_config(
                "edge_thresholds",
                format!("expected 0 <= low <= high, got ({}, {})", low, high),
            ));
        }

        Ok(())
    }
}

fn check_kernel(field: &'static str, size: u32) -> Result<(), SealError> {
    if size == 0 {
        return Err(SealError::invalid_config(field, "must be positive"));
    }
    if size > MAX_KERNEL_SIZE {
        return Err(SealError::invalid_config(
            field,
            format!("must be at most {}, got {}", MAX_KERNEL_SIZE, size),
        ));
    }
    Ok(())
}

/// Structuring-element radius for a diameter already checked by `validate`
pub(crate) fn kernel_radius(size: u32) -> u8 {
    (size / 2).min(u8::MAX as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_values() {
        type Mutation = fn(&mut ExtractionConfig);
        let cases: [(&str, Mutation); 13] = [
            ("canonical_size", |c: &mut ExtractionConfig| c.canonical_size = 0),
            ("max_working_width", |c: &mut ExtractionConfig| c.max_working_width = 0),
            ("top_k", |c: &mut ExtractionConfig| c.top_k = 0),
            ("open_kernel_size", |c: &mut ExtractionConfig| c.open_kernel_size = 0),
            ("close_kernel_size", |c: &mut ExtractionConfig| c.close_kernel_size = 600),
            ("segment_dilate_size", |c: &mut ExtractionConfig| c.segment_dilate_size = 0),
            ("hue_ranges", |c: &mut ExtractionConfig| c.hue_ranges.clear()),
            ("hue_ranges", |c: &mut ExtractionConfig| {
                c.hue_ranges = vec![HueRange::new([0, 0, 0], [200, 255, 255])]
            }),
            ("hue_ranges", |c: &mut ExtractionConfig| {
                c.hue_ranges = vec![HueRange::new([20, 0, 0], [10, 255, 255])]
            }),
            ("edge_thresholds", |c: &mut ExtractionConfig| c.edge_thresholds = (20.0, 10.0)),
            ("edge_thresholds", |c: &mut ExtractionConfig| c.edge_thresholds = (-1.0, 10.0)),
            ("annotation_thickness", |c: &mut ExtractionConfig| c.annotation_thickness = 0),
            ("border_padding", |c: &mut ExtractionConfig| c.border_padding = u32::MAX / 2),
        ];

        for (expected, mutate) in cases {
            let mut config = ExtractionConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(SealError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidConfig for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{ "top_k": 2, "merge_op": "dilate" }"#).unwrap();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.merge_op, MergeOp::Dilate);
        assert_eq!(config.canonical_size, 300);
        assert_eq!(config.hue_ranges.len(), 2);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "canonical_size": 128 }"#).unwrap();
        let config = ExtractionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.canonical_size, 128);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut bad, br#"{ "canonical_size": 0 }"#).unwrap();
        assert!(matches!(
            ExtractionConfig::from_json_file(bad.path()),
            Err(SealError::InvalidConfig { field: "canonical_size", .. })
        ));
    }

    #[test]
    fn test_hue_range_contains_is_inclusive() {
        let range = HueRange::new([0, 43, 46], [10, 255, 255]);
        assert!(range.contains([0, 43, 46]));
        assert!(range.contains([10, 255, 255]));
        assert!(!range.contains([11, 255, 255]));
        assert!(!range.contains([5, 42, 255]));
    }

    #[test]
    fn test_kernel_radius() {
        assert_eq!(kernel_radius(1), 0);
        assert_eq!(kernel_radius(3), 1);
        assert_eq!(kernel_radius(100), 50);
        assert_eq!(kernel_radius(MAX_KERNEL_SIZE), 255);
    }
}

//! Classical seal (ink stamp) extraction for scanned documents.
//!
//! Red stamps are found by hue thresholding on both sides of the hue
//! wraparound, cleaned up with morphology, traced as external contours and
//! returned as square crops ordered by size:
//!
//! ```no_run
//! use seal_extract::{extract_seals, ExtractionConfig};
//!
//! let bytes = std::fs::read("contract.jpg")?;
//! let result = extract_seals(&bytes, &ExtractionConfig::default())?;
//! for crop in &result.candidates {
//!     println!("seal at {:?}, {}x{}", crop.bbox, crop.image.width(), crop.image.height());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod server;

pub use config::{ExtractionConfig, HueRange, MergeOp, ServerConfig};
pub use error::SealError;
pub use extraction::{ExtractionReport, Pipeline, StepTiming};
pub use model::{BoundingBox, Candidate, CanonicalCrop, ExtractionResult};

/// Run the whole pipeline once with `config`
pub fn extract_seals(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionResult, SealError> {
    let pipeline = Pipeline::new(config.clone())?;
    Ok(pipeline.process(bytes)?.result)
}

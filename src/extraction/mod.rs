//! Seal extraction pipeline
//!
//! Locates colored ink stamps by hue segmentation, morphological cleanup and
//! contour geometry, and returns each one as a fixed-size square crop.

pub mod pipeline;
pub mod steps;

pub use pipeline::{ExtractionReport, Pipeline, StepTiming};

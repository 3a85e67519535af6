use crate::config::ExtractionConfig;
use crate::error::SealError;
use crate::model::{Candidate, ExtractionResult};
use image::Rgb;
use serde::Serialize;
use std::time::Instant;

use super::steps;
use super::steps::denoise::DenoiseParams;
use super::steps::normalize::NormalizeParams;

/// Timing information for a single pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of one run plus timing stats
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub result: ExtractionResult,
    /// Total processing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Stateless extraction pipeline over a validated configuration.
///
/// `process` never mutates `self`, so one pipeline can serve any number of
/// threads at once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ExtractionConfig,
}

impl Pipeline {
    pub fn new(config: ExtractionConfig) -> Result<Self, SealError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Decode `bytes` and extract every seal candidate.
    ///
    /// Only a decode failure is an error; finding nothing yields an empty
    /// candidate list.
    pub fn process(&self, bytes: &[u8]) -> Result<ExtractionReport, SealError> {
        let start = Instant::now();
        let mut timings = Vec::new();
        let config = &self.config;

        let decoded = self.run_step("decode", bytes, &mut timings, steps::load::decode)?;

        let working = self.run_step("resize", decoded, &mut timings, |img| {
            Ok(steps::load::fit_width(img, config.max_working_width))
        })?;

        let padded = self.run_step("pad", &working, &mut timings, |img| {
            steps::load::pad(img, config.border_padding)
        })?;
        drop(working);

        let composite = self.run_step("segment", &padded, &mut timings, |img| {
            Ok(steps::segment::apply(
                img,
                &config.hue_ranges,
                config.segment_dilate_size,
            ))
        })?;

        let denoise_params = DenoiseParams {
            foreground_threshold: config.foreground_threshold,
            open_kernel_size: config.open_kernel_size,
            close_kernel_size: config.close_kernel_size,
            merge_op: config.merge_op,
        };
        let mask = self.run_step("denoise", &composite, &mut timings, |img| {
            Ok(steps::denoise::apply(img, &denoise_params))
        })?;
        drop(composite);

        let (low, high) = config.edge_thresholds;
        let contours = self.run_step("contours", &mask, &mut timings, |mask| {
            Ok(steps::contours::apply(mask, low, high))
        })?;
        drop(mask);
        let found = contours.len();

        let ranked: Vec<Candidate> = self.run_step("rank", contours, &mut timings, |contours| {
            Ok(steps::rank::apply(
                contours,
                config.top_k,
                config.min_candidate_area,
            ))
        })?;

        let normalize_params = NormalizeParams {
            margin: config.crop_margin,
            canonical_size: config.canonical_size,
            fill: Rgb(config.fill_color),
        };
        let crops = self.run_step("normalize", &ranked, &mut timings, |ranked| {
            Ok(ranked
                .iter()
                .map(|c| steps::normalize::apply(&padded, c.bbox, &normalize_params))
                .collect::<Vec<_>>())
        })?;

        let result = self.run_step("composite", crops, &mut timings, |crops| {
            Ok(steps::composite::apply(
                &padded,
                &ranked,
                crops,
                Rgb(config.annotation_color),
                config.annotation_thickness,
            ))
        })?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Extracted {} of {} contours from {}x{} working image in {}ms",
            result.candidates.len(),
            found,
            padded.width(),
            padded.height(),
            total_time_ms
        );

        Ok(ExtractionReport {
            result,
            total_time_ms,
            steps: timings,
        })
    }

    fn run_step<I, O, F>(
        &self,
        name: &str,
        input: I,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<O, SealError>
    where
        F: FnOnce(I) -> Result<O, SealError>,
    {
        let step_start = Instant::now();
        let result = step_fn(input)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Step {} took {}ms", name, time_ms);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use imageproc::drawing::draw_filled_circle_mut;
    use std::io::Cursor;

    fn encode(image: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ExtractionConfig {
            canonical_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(SealError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_records_every_step() {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        draw_filled_circle_mut(&mut img, (100, 100), 30, Rgb([220, 0, 0]));

        let pipeline = Pipeline::new(ExtractionConfig::default()).unwrap();
        let report = pipeline.process(&encode(img)).unwrap();

        let names: Vec<&str> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "decode",
                "resize",
                "pad",
                "segment",
                "denoise",
                "contours",
                "rank",
                "normalize",
                "composite"
            ]
        );
        assert_eq!(report.result.candidates.len(), 1);
        assert_eq!(report.result.annotated_image.dimensions(), (300, 300));
    }

    #[test]
    fn test_decode_failure_stops_pipeline() {
        let pipeline = Pipeline::new(ExtractionConfig::default()).unwrap();
        assert!(matches!(
            pipeline.process(&[0x00, 0x01, 0x02, 0x03]),
            Err(SealError::Decode(_))
        ));
    }
}

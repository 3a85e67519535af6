use crate::config::{kernel_radius, MergeOp};
use image::{imageops, GrayImage, RgbImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate, open};

/// Morphology settings for one cleanup pass
#[derive(Debug, Clone, Copy)]
pub struct DenoiseParams {
    pub foreground_threshold: u8,
    pub open_kernel_size: u32,
    pub close_kernel_size: u32,
    pub merge_op: MergeOp,
}

/// Turn a white-background composite into a binary ink mask (255 = ink)
pub fn binarize(composite: &RgbImage, foreground_threshold: u8) -> GrayImage {
    let gray = imageops::grayscale(composite);
    threshold(&gray, foreground_threshold, ThresholdType::BinaryInverted)
}

/// Remove speckle with a small opening, then merge a stamp's broken strokes
/// into one blob with a large closing (or dilation)
pub fn apply(composite: &RgbImage, params: &DenoiseParams) -> GrayImage {
    let binary = binarize(composite, params.foreground_threshold);

    let opened = open(&binary, Norm::L2, kernel_radius(params.open_kernel_size));

    let merge_radius = kernel_radius(params.close_kernel_size);
    match params.merge_op {
        MergeOp::Close => close(&opened, Norm::L2, merge_radius),
        MergeOp::Dilate => dilate(&opened, Norm::L2, merge_radius),
    }
}

//! Individual extraction stages, in pipeline order

pub mod load;
pub mod segment;
pub mod denoise;
pub mod contours;
pub mod rank;
pub mod normalize;
pub mod composite;

//! Image preprocessing module
//!
//! Cleans equation photos before recognition: grayscale, smoothing, contrast
//! enhancement or binarization, optional deskew, and resizing to the width
//! the model works best with.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, Preset, StepTiming};

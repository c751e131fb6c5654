use crate::error::LatexError;
use image::DynamicImage;

/// Result of a recognition call
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    pub latex: String,
}

/// Trait that all recognition engines must implement
///
/// The model behind an engine is treated as a black box: a normalized image
/// goes in, a LaTeX string or a recognition failure comes out.
pub trait LatexEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "pix2tex", "fixed")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the equation in a preprocessed image
    fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, LatexError>;
}

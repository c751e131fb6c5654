//! Fixed-output engine
//!
//! Always returns the same LaTeX string. Selecting it with `--engine fixed`
//! lets the upload path and the CLI be exercised end to end without a model
//! endpoint; tests construct it with a custom string.

use crate::engine::{LatexEngine, RecognitionResult};
use crate::error::LatexError;
use image::DynamicImage;

/// Default string returned when no custom one is configured
pub const DEFAULT_LATEX: &str = "x^{2}+y^{2}=z^{2}";

pub struct FixedEngine {
    latex: String,
}

impl FixedEngine {
    pub fn new(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
        }
    }
}

impl Default for FixedEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LATEX)
    }
}

impl LatexEngine for FixedEngine {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "Returns a fixed LaTeX string, for wiring checks without a model"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<RecognitionResult, LatexError> {
        Ok(RecognitionResult {
            latex: self.latex.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_configured_string_unchanged() {
        let engine = FixedEngine::new("\\alpha + \\beta");
        let image = DynamicImage::new_luma8(4, 4);
        let result = engine.recognize(&image).unwrap();
        assert_eq!(result.latex, "\\alpha + \\beta");
    }

    #[test]
    fn default_engine_uses_default_string() {
        let engine = FixedEngine::default();
        let image = DynamicImage::new_luma8(4, 4);
        let result = engine.recognize(&image).unwrap();
        assert_eq!(result.latex, DEFAULT_LATEX);
    }
}

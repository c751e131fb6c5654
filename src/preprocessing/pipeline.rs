use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Defaults for the gentle preset: keep character shapes intact, the model
/// handles grayscale better than hard binarization.
const GENTLE_TARGET_WIDTH: u32 = 800;
const GENTLE_BLUR_SIGMA: f32 = 0.8;
const GENTLE_DESKEW_TOLERANCE: f32 = 1.0;
const CLAHE_CLIP_LIMIT: f32 = 2.0;
const CLAHE_GRID: u32 = 8;

/// Defaults for the aggressive preset: binarize and clean up, for photos with
/// heavy lighting gradients.
const AGGRESSIVE_TARGET_WIDTH: u32 = 1500;
const AGGRESSIVE_BLUR_SIGMA: f32 = 1.1;
const AGGRESSIVE_DESKEW_TOLERANCE: f32 = 0.5;
const THRESHOLD_WINDOW: u32 = 11;
const THRESHOLD_BIAS: i32 = 2;

/// Preprocessing preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Skip all preprocessing
    None,
    /// Grayscale, light blur, CLAHE, deskew, resize to 800px
    #[default]
    Gentle,
    /// Grayscale, blur, adaptive binarization, deskew, morphological
    /// cleanup, resize to 1500px
    Aggressive,
}

impl Preset {
    /// Parse from a flag or query parameter string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "gentle" => Some(Self::Gentle),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    /// Get the preset name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gentle => "gentle",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Preset used
    pub preset: String,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline that applies steps based on preset
///
/// Pure and reentrant: identical input and configuration always produce a
/// bit-identical output image, and independent calls may run concurrently.
pub struct Pipeline {
    preset: Preset,
    target_width: u32,
    blur_sigma: f32,
    deskew_tolerance: f32,
}

impl Pipeline {
    pub fn new(preset: Preset) -> Self {
        let (target_width, blur_sigma, deskew_tolerance) = match preset {
            Preset::None | Preset::Gentle => (
                GENTLE_TARGET_WIDTH,
                GENTLE_BLUR_SIGMA,
                GENTLE_DESKEW_TOLERANCE,
            ),
            Preset::Aggressive => (
                AGGRESSIVE_TARGET_WIDTH,
                AGGRESSIVE_BLUR_SIGMA,
                AGGRESSIVE_DESKEW_TOLERANCE,
            ),
        };

        Self {
            preset,
            target_width,
            blur_sigma,
            deskew_tolerance,
        }
    }

    /// Override the preset's resize target width
    pub fn with_target_width(mut self, target_width: Option<u32>) -> Self {
        if let Some(width) = target_width {
            self.target_width = width.max(1);
        }
        self
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    /// Process an image according to the configured preset
    pub fn process(&self, image: DynamicImage) -> PreprocessingResult {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        if self.preset == Preset::None {
            return PreprocessingResult {
                image,
                total_time_ms: 0,
                preset: "none".to_string(),
                steps: vec![],
            };
        }

        let mut img = image;

        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply);
        img = self.run_step("blur", img, &mut steps_timing, |i| {
            steps::blur::apply(i, self.blur_sigma)
        });

        match self.preset {
            Preset::Gentle => {
                img = self.run_step("clahe", img, &mut steps_timing, |i| {
                    steps::clahe::apply(i, CLAHE_CLIP_LIMIT, CLAHE_GRID)
                });
                img = self.run_step("deskew", img, &mut steps_timing, |i| {
                    steps::deskew::apply(i, self.deskew_tolerance)
                });
            }
            Preset::Aggressive => {
                img = self.run_step("threshold", img, &mut steps_timing, |i| {
                    steps::threshold::apply(i, THRESHOLD_WINDOW, THRESHOLD_BIAS)
                });
                img = self.run_step("deskew", img, &mut steps_timing, |i| {
                    steps::deskew::apply(i, self.deskew_tolerance)
                });
                img = self.run_step("morphology", img, &mut steps_timing, steps::morphology::apply);
            }
            Preset::None => unreachable!("handled above"),
        }

        img = self.run_step("resize", img, &mut steps_timing, |i| {
            steps::resize::apply(i, self.target_width)
        });

        PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            preset: self.preset.as_str().to_string(),
            steps: steps_timing,
        }
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> DynamicImage
    where
        F: FnOnce(DynamicImage) -> DynamicImage,
    {
        let step_start = Instant::now();
        let result = step_fn(img);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        result
    }
}

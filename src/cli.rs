use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::engine::LatexEngine;
use crate::engines::EngineRegistry;
use crate::preprocessing::Pipeline;

/// Recognize a single image file, print the LaTeX and save it
pub fn run(config: &Config, image_path: &Path, output_path: &Path) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(config)?;
    let engine = registry
        .default()
        .context("No recognition engine available")?;

    let image = image::open(image_path)
        .with_context(|| format!("Could not read image from {}", image_path.display()))?;

    tracing::info!("Preprocessing image: {}", image_path.display());
    let pipeline = Pipeline::new(config.preset).with_target_width(config.target_width);
    let preprocessed = pipeline.process(image);
    tracing::info!("Preprocessing finished in {}ms", preprocessed.total_time_ms);

    tracing::info!("Running LaTeX recognition with engine \"{}\"", engine.name());
    let recognition = engine.recognize(&preprocessed.image)?;

    println!("{}", recognition.latex);

    std::fs::write(output_path, &recognition.latex)
        .with_context(|| format!("Could not write {}", output_path.display()))?;
    tracing::info!("LaTeX saved to {}", output_path.display());

    Ok(())
}

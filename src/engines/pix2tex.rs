//! pix2tex engine implementation
//!
//! Delegates recognition to a pix2tex-style inference endpoint over HTTP.
//! The normalized image is posted as PNG bytes; the reply is either a JSON
//! object with a `latex` field or a bare JSON string.

use crate::config::Config;
use crate::engine::{LatexEngine, RecognitionResult};
use crate::error::LatexError;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use std::io::Cursor;

/// The two reply shapes produced by pix2tex servers
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictReply {
    Object { latex: String },
    Text(String),
}

/// Engine backed by an external pix2tex inference endpoint
pub struct Pix2TexEngine {
    endpoint: String,
}

impl Pix2TexEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.model_url.clone(),
        }
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, LatexError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| LatexError::Internal(format!("Failed to encode image: {}", e)))?;
        Ok(buffer)
    }
}

impl LatexEngine for Pix2TexEngine {
    fn name(&self) -> &'static str {
        "pix2tex"
    }

    fn description(&self) -> &'static str {
        "Pretrained image-to-LaTeX model behind an HTTP inference endpoint"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, LatexError> {
        let png = Self::encode_png(image)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            bytes = png.len(),
            "Sending image to recognition model"
        );

        let response = ureq::post(&self.endpoint)
            .header("content-type", "image/png")
            .send(&png[..])
            .map_err(|e| LatexError::RecognitionFailed(format!("Model request failed: {}", e)))?;

        let body = response
            .into_body()
            .read_to_vec()
            .map_err(|e| LatexError::RecognitionFailed(format!("Failed to read reply: {}", e)))?;

        let reply: PredictReply = serde_json::from_slice(&body).map_err(|e| {
            LatexError::RecognitionFailed(format!("Malformed reply from model: {}", e))
        })?;

        let latex = match reply {
            PredictReply::Object { latex } => latex,
            PredictReply::Text(latex) => latex,
        };

        Ok(RecognitionResult {
            latex: latex.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parses_object_shape() {
        let reply: PredictReply = serde_json::from_str(r#"{"latex": "E = mc^2"}"#).unwrap();
        match reply {
            PredictReply::Object { latex } => assert_eq!(latex, "E = mc^2"),
            PredictReply::Text(_) => panic!("expected object shape"),
        }
    }

    #[test]
    fn reply_parses_bare_string() {
        let reply: PredictReply = serde_json::from_str(r#""\\frac{a}{b}""#).unwrap();
        match reply {
            PredictReply::Text(latex) => assert_eq!(latex, "\\frac{a}{b}"),
            PredictReply::Object { .. } => panic!("expected bare string"),
        }
    }

    #[test]
    fn encode_png_produces_png_magic() {
        let image = DynamicImage::new_luma8(8, 8);
        let png = Pix2TexEngine::encode_png(&image).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn recognize_fails_cleanly_when_endpoint_is_down() {
        let config = Config {
            host: String::new(),
            port: 0,
            max_upload: 0,
            engine: "pix2tex".to_string(),
            model_url: "http://127.0.0.1:1/predict".to_string(),
            preset: crate::preprocessing::Preset::Gentle,
            target_width: None,
        };
        let engine = Pix2TexEngine::new(&config);
        let image = DynamicImage::new_luma8(8, 8);

        let result = engine.recognize(&image);
        assert!(matches!(result, Err(LatexError::RecognitionFailed(_))));
    }
}

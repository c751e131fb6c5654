//! Recognition engine implementations
//!
//! This module contains implementations of the LatexEngine trait. The
//! pix2tex engine delegates to an external inference endpoint; the fixed
//! engine returns a constant string and exists to verify pipeline wiring
//! without the real model.

pub mod fixed;
pub mod pix2tex;

use crate::config::Config;
use crate::engine::LatexEngine;
use crate::error::LatexError;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Registry of available recognition engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn LatexEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all engines initialized
    pub fn new(config: &Config) -> Result<Self, LatexError> {
        let engines: Vec<Arc<dyn LatexEngine>> = vec![
            Arc::new(pix2tex::Pix2TexEngine::new(config)),
            Arc::new(fixed::FixedEngine::default()),
        ];

        if !engines.iter().any(|e| e.name() == config.engine) {
            let known: Vec<&str> = engines.iter().map(|e| e.name()).collect();
            return Err(LatexError::InitializationError(format!(
                "Unknown engine \"{}\". Available: {}",
                config.engine,
                known.join(", ")
            )));
        }

        Ok(Self {
            engines,
            default_engine: config.engine.clone(),
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LatexEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default(&self) -> Option<Arc<dyn LatexEngine>> {
        self.get(&self.default_engine)
    }

    /// Get the default engine name
    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
            })
            .collect()
    }
}

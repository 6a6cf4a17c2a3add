// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UmkehrError};
use crate::types::{ImageEncoding, RenderOptions};

/// Highest rasterisation resolution accepted; beyond this a single page
/// easily exceeds several hundred megabytes of samples.
pub const MAX_RENDER_DPI: f32 = 1200.0;

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rasterisation resolution in dots per inch.
    pub render_dpi: f32,
    /// Keep the raster's proportions inside the page box (centred). When
    /// false the raster is stretched to fill the box exactly.
    pub preserve_aspect_ratio: bool,
    /// Render pages with an alpha channel instead of onto an opaque background.
    pub render_alpha: bool,
    /// Leave alpha samples untouched during inversion.
    pub preserve_alpha: bool,
    /// Storage of the inverted raster inside the output document.
    pub encoding: ImageEncoding,
    /// Directory the output name is resolved against. Created if missing.
    pub output_dir: PathBuf,
    /// Scratch directory for temporary documents (system default when unset).
    pub temp_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_dpi: 150.0,
            preserve_aspect_ratio: true,
            render_alpha: false,
            preserve_alpha: false,
            encoding: ImageEncoding::Lossless,
            output_dir: PathBuf::from("."),
            temp_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.render_dpi.is_finite() || self.render_dpi <= 0.0 {
            return Err(UmkehrError::Configuration(format!(
                "render_dpi must be a positive number, got {}",
                self.render_dpi
            )));
        }
        if self.render_dpi > MAX_RENDER_DPI {
            return Err(UmkehrError::Configuration(format!(
                "render_dpi {} exceeds the maximum of {}",
                self.render_dpi, MAX_RENDER_DPI
            )));
        }
        match self.encoding {
            ImageEncoding::Jpeg { quality } if !(1..=100).contains(&quality) => {
                return Err(UmkehrError::Configuration(format!(
                    "JPEG quality must be between 1 and 100, got {}",
                    quality
                )));
            }
            _ => {}
        }
        Ok(())
    }

    /// Render parameters derived from this configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            dpi: self.render_dpi,
            with_alpha: self.render_alpha,
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Umkehr.

use thiserror::Error;

use crate::types::PipelineStage;

/// Top-level error type for all Umkehr operations.
#[derive(Debug, Error)]
pub enum UmkehrError {
    // -- Caller input --
    #[error("invalid page selection: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Document / raster --
    #[error("document operation failed: {0}")]
    Document(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("raster buffer holds {actual} bytes, expected {expected}")]
    RasterSize { expected: usize, actual: usize },

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Orchestration --
    #[error("pipeline failed while {stage}: {source}")]
    Pipeline {
        stage: PipelineStage,
        #[source]
        source: Box<UmkehrError>,
        /// Temporary files that could not be removed after the failure.
        cleanup_failures: Vec<String>,
    },
}

impl UmkehrError {
    /// The originating error, looking through any `Pipeline` wrappers.
    pub fn root_cause(&self) -> &UmkehrError {
        match self {
            Self::Pipeline { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stage that failed, if this error came out of the pipeline.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UmkehrError>;

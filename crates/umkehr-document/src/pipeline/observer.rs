// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline progress events and their observers.

use std::path::PathBuf;

use tracing::{error, info};
use umkehr_core::PipelineStage;

/// Progress reported by `DocumentPipeline::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The input is available on disk. `temporary` is true when it was
    /// written from in-memory bytes.
    InputMaterialized { path: PathBuf, temporary: bool },
    PagesRemoved { removed: usize, remaining: usize },
    PagesInverted {
        inverted: usize,
        skipped: usize,
        page_count: usize,
    },
    OutputFinalized { path: PathBuf },
    StageFailed { stage: PipelineStage, message: String },
}

/// Receives pipeline events as they happen.
pub trait PipelineObserver {
    fn on_event(&self, event: &PipelineEvent);
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::InputMaterialized { path, temporary } => {
                info!(path = %path.display(), temporary, "Input ready");
            }
            PipelineEvent::PagesRemoved { removed, remaining } => {
                info!(removed, remaining, "Pages removed");
            }
            PipelineEvent::PagesInverted {
                inverted,
                skipped,
                page_count,
            } => {
                info!(inverted, skipped, page_count, "Pages inverted");
            }
            PipelineEvent::OutputFinalized { path } => {
                info!(path = %path.display(), "Output written");
            }
            PipelineEvent::StageFailed { stage, message } => {
                error!(%stage, %message, "Pipeline stage failed");
            }
        }
    }
}

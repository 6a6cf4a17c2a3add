// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document pipeline: materialise the input, optionally remove pages,
// invert the selected pages and move the result into place.
//
// Intermediate documents live in scoped temporary files that are released
// whether the run succeeds or fails. Failures are reported with the stage
// they happened in.

mod observer;
mod temp;

pub use observer::{PipelineEvent, PipelineObserver, TracingObserver};
pub use temp::ScopedTempFile;

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{info, instrument, warn};
use umkehr_core::error::{Result, UmkehrError};
use umkehr_core::{PipelineConfig, PipelineStage};

use crate::image::{ImageCodec, RasterCodec};
use crate::pdf::{DocumentProvider, PageDocument};
use crate::remove::PageRemover;
use crate::rewrite::{PageRewriter, RewriteOptions, RewriteOutcome};
use crate::selection::PageSelection;

/// Where the input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Document bytes held in memory; written to a temporary file first.
    Bytes(Vec<u8>),
    /// A document already on disk; used in place and never modified.
    Path(PathBuf),
}

/// One pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub input: InputSource,
    /// Pages to invert, e.g. `"all"` or `"1-3,7"`. Resolved after removal.
    pub page_selection: String,
    /// Pages to delete before inverting. Skipped when absent or blank.
    pub removal_selection: Option<String>,
    /// File name of the result inside the configured output directory.
    pub output_name: String,
}

impl PipelineRequest {
    pub fn new(
        input: InputSource,
        page_selection: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            input,
            page_selection: page_selection.into(),
            removal_selection: None,
            output_name: output_name.into(),
        }
    }

    pub fn with_removal(mut self, expression: impl Into<String>) -> Self {
        self.removal_selection = Some(expression.into());
        self
    }
}

/// Runs requests against documents opened through a `DocumentProvider`.
pub struct DocumentPipeline<P: DocumentProvider, C: RasterCodec = ImageCodec> {
    provider: P,
    codec: C,
    observer: Box<dyn PipelineObserver>,
}

impl<P: DocumentProvider> DocumentPipeline<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            codec: ImageCodec,
            observer: Box::new(TracingObserver),
        }
    }
}

impl<P: DocumentProvider, C: RasterCodec> DocumentPipeline<P, C> {
    pub fn with_codec<C2: RasterCodec>(self, codec: C2) -> DocumentPipeline<P, C2> {
        DocumentPipeline {
            provider: self.provider,
            codec,
            observer: self.observer,
        }
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Execute `request` and return the path of the written document.
    ///
    /// Any failure is wrapped in `UmkehrError::Pipeline` carrying the failed
    /// stage, the underlying error and any temporary files that could not be
    /// removed. No output file exists after a failed run.
    #[instrument(skip_all, fields(output = %request.output_name))]
    pub fn run(&self, request: &PipelineRequest, config: &PipelineConfig) -> Result<PathBuf> {
        let mut scratch = Scratch::default();
        let outcome = self.run_stages(request, config, &mut scratch);

        let cleanup_failures = scratch.release_all();
        for failure in &cleanup_failures {
            warn!(%failure, "Temporary file could not be removed");
        }

        match outcome {
            Ok(path) => {
                info!(path = %path.display(), "Pipeline complete");
                Ok(path)
            }
            Err(StageFailure { stage, error }) => {
                self.observer.on_event(&PipelineEvent::StageFailed {
                    stage,
                    message: error.to_string(),
                });
                Err(UmkehrError::Pipeline {
                    stage,
                    source: Box::new(error),
                    cleanup_failures,
                })
            }
        }
    }

    fn run_stages(
        &self,
        request: &PipelineRequest,
        config: &PipelineConfig,
        scratch: &mut Scratch,
    ) -> std::result::Result<PathBuf, StageFailure> {
        config.validate().at(PipelineStage::InputMaterialized)?;
        let destination = output_path(&config.output_dir, &request.output_name)
            .at(PipelineStage::InputMaterialized)?;
        let scratch_dir = config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

        let input = self
            .materialize_input(&request.input, &scratch_dir, scratch)
            .at(PipelineStage::InputMaterialized)?;

        let removal = request
            .removal_selection
            .as_deref()
            .map(str::trim)
            .filter(|expression| !expression.is_empty());
        let working = match removal {
            Some(expression) => self
                .remove_pages(&input, expression, &scratch_dir, scratch)
                .at(PipelineStage::PagesRemoved)?,
            None => input,
        };

        self.invert_pages(&working, &request.page_selection, config, scratch)
            .at(PipelineStage::PagesInverted)?;

        self.finalize(&destination, scratch)
            .at(PipelineStage::OutputFinalized)
    }

    fn materialize_input(
        &self,
        input: &InputSource,
        scratch_dir: &Path,
        scratch: &mut Scratch,
    ) -> Result<PathBuf> {
        let (path, temporary) = match input {
            InputSource::Path(path) => {
                if !path.is_file() {
                    return Err(UmkehrError::Document(format!(
                        "input {} does not exist",
                        path.display()
                    )));
                }
                (path.clone(), false)
            }
            InputSource::Bytes(bytes) => {
                fs::create_dir_all(scratch_dir)?;
                let mut file = ScopedTempFile::create_in(scratch_dir, "umkehr-input-")?;
                file.write_all(bytes)?;
                let path = file.path().to_path_buf();
                scratch.intermediates.push(file);
                (path, true)
            }
        };

        self.observer.on_event(&PipelineEvent::InputMaterialized {
            path: path.clone(),
            temporary,
        });
        Ok(path)
    }

    fn remove_pages(
        &self,
        input: &Path,
        expression: &str,
        scratch_dir: &Path,
        scratch: &mut Scratch,
    ) -> Result<PathBuf> {
        let mut document = self.provider.open(input)?;
        let summary = PageRemover::remove_pages(&mut document, expression)?;

        fs::create_dir_all(scratch_dir)?;
        let file = ScopedTempFile::create_in(scratch_dir, "umkehr-removed-")?;
        document.save(file.path())?;
        let path = file.path().to_path_buf();
        scratch.intermediates.push(file);

        self.observer.on_event(&PipelineEvent::PagesRemoved {
            removed: summary.removed,
            remaining: summary.remaining,
        });
        Ok(path)
    }

    fn invert_pages(
        &self,
        working: &Path,
        expression: &str,
        config: &PipelineConfig,
        scratch: &mut Scratch,
    ) -> Result<()> {
        let mut document = self.provider.open(working)?;
        let page_count = document.page_count();
        let selection = PageSelection::resolve(expression, Some(page_count))?;

        let rewriter = PageRewriter::new(&self.codec, RewriteOptions::from(config));
        let mut inverted = 0;
        for index in selection.within(page_count) {
            if let RewriteOutcome::Rewritten { .. } = rewriter.rewrite_page(&mut document, index)? {
                inverted += 1;
            }
        }
        let skipped = selection.len() - inverted;
        if skipped > 0 {
            warn!(skipped, page_count, "Selected pages past the end were skipped");
        }

        // Written next to the destination so finalising is a rename.
        fs::create_dir_all(&config.output_dir)?;
        let output = ScopedTempFile::create_in(&config.output_dir, ".umkehr-output-")?;
        document.save(output.path())?;
        scratch.output = Some(output);

        self.observer.on_event(&PipelineEvent::PagesInverted {
            inverted,
            skipped,
            page_count,
        });
        Ok(())
    }

    fn finalize(&self, destination: &Path, scratch: &mut Scratch) -> Result<PathBuf> {
        let output = scratch.output.take().ok_or_else(|| {
            UmkehrError::Document("no output document was produced".to_string())
        })?;
        let path = output.persist(destination)?;

        self.observer
            .on_event(&PipelineEvent::OutputFinalized { path: path.clone() });
        Ok(path)
    }
}

/// Temporary files owned by one run.
#[derive(Default)]
struct Scratch {
    intermediates: Vec<ScopedTempFile>,
    output: Option<ScopedTempFile>,
}

impl Scratch {
    /// Release every remaining file, collecting the ones that could not be
    /// deleted.
    fn release_all(&mut self) -> Vec<String> {
        self.intermediates
            .drain(..)
            .chain(self.output.take())
            .filter_map(|file| file.release().err())
            .collect()
    }
}

struct StageFailure {
    stage: PipelineStage,
    error: UmkehrError,
}

/// Tag an error with the pipeline stage it happened in.
trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> std::result::Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: PipelineStage) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}

/// Join `name` onto `dir`, accepting only a plain file name.
fn output_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file_name)), None) if !name.contains(['/', '\\']) => {
            Ok(dir.join(file_name))
        }
        _ => Err(UmkehrError::Configuration(format!(
            "output name {:?} must be a plain file name",
            name
        ))),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Umkehr document processing: page selection, rasterisation, inversion and
// the document pipeline that ties them together.

pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod remove;
pub mod rewrite;
pub mod selection;

#[cfg(test)]
mod testing;

pub use pdf::{
    DocumentProvider, LopdfDocument, PageDocument, PageRenderer, PdfProvider, PdfiumRenderer,
};
pub use pipeline::{
    DocumentPipeline, InputSource, PipelineEvent, PipelineObserver, PipelineRequest,
    TracingObserver,
};
pub use remove::{PageRemover, RemovalSummary};
pub use rewrite::{PageRewriter, RewriteOptions, RewriteOutcome};
pub use selection::PageSelection;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF access: page document traits, the lopdf editing backend and the
// PDFium renderer.

pub mod document;
pub mod provider;
pub mod render;

pub use document::{LopdfDocument, PdfProvider};
pub use provider::{DocumentProvider, PageDocument, PageRenderer};
pub use render::PdfiumRenderer;

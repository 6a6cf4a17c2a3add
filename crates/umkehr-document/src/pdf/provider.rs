// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits separating the rewrite logic from concrete PDF and
// rendering backends.

use std::path::Path;

use umkehr_core::error::Result;
use umkehr_core::{PageGeometry, Rect, RenderOptions};

use crate::image::{EncodedRaster, Raster};

/// An open, mutable paged document.
///
/// Pages are addressed by 0-based index. Dropping the value closes the
/// document; unsaved changes are discarded.
pub trait PageDocument {
    /// Number of pages currently in the document.
    fn page_count(&self) -> usize;

    /// Bounding box and display rotation of a page.
    fn page_geometry(&self, index: usize) -> Result<PageGeometry>;

    /// Rasterise a page as it is displayed (rotation applied).
    fn render_page(&self, index: usize, options: RenderOptions) -> Result<Raster>;

    /// Remove everything drawn on a page. The page box is left unchanged.
    fn clear_page(&mut self, index: usize) -> Result<()>;

    /// Paint `image` into `placement` (document units, unrotated page space).
    fn embed_image(&mut self, index: usize, image: &EncodedRaster, placement: Rect) -> Result<()>;

    /// Delete a page; later pages move down by one index.
    fn delete_page(&mut self, index: usize) -> Result<()>;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Opens documents from the filesystem.
pub trait DocumentProvider {
    type Document: PageDocument;

    fn open(&self, path: &Path) -> Result<Self::Document>;
}

/// Rasterises pages of a document stored on disk.
pub trait PageRenderer {
    fn render(&self, source: &Path, index: usize, options: RenderOptions) -> Result<Raster>;
}

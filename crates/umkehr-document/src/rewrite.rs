// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rewriting: replace a page's content with an inverted raster of
// itself, keeping the page box intact.

use tracing::{debug, instrument};
use umkehr_core::error::Result;
use umkehr_core::{ImageEncoding, PipelineConfig, RenderOptions};

use crate::image::{PixelInverter, RasterCodec};
use crate::pdf::PageDocument;

/// Knobs for a single page rewrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewriteOptions {
    pub render: RenderOptions,
    pub preserve_aspect_ratio: bool,
    pub preserve_alpha: bool,
    pub encoding: ImageEncoding,
}

impl From<&PipelineConfig> for RewriteOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            render: config.render_options(),
            preserve_aspect_ratio: config.preserve_aspect_ratio,
            preserve_alpha: config.preserve_alpha,
            encoding: config.encoding,
        }
    }
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Result of `PageRewriter::rewrite_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The page now holds an inverted raster of the given pixel size.
    Rewritten { width: u32, height: u32 },
    /// The index was past the last page; nothing changed.
    Skipped,
}

/// Replaces pages with inverted renders of themselves.
pub struct PageRewriter<'c, C: RasterCodec> {
    codec: &'c C,
    inverter: PixelInverter,
    options: RewriteOptions,
}

impl<'c, C: RasterCodec> PageRewriter<'c, C> {
    pub fn new(codec: &'c C, options: RewriteOptions) -> Self {
        Self {
            codec,
            inverter: PixelInverter::new(options.preserve_alpha),
            options,
        }
    }

    /// Rewrite the page at `index`.
    ///
    /// Out-of-range indices are skipped, not errors. Any failure while
    /// rendering, encoding or embedding is returned as is; the page may then
    /// be left cleared.
    #[instrument(skip(self, document))]
    pub fn rewrite_page<D: PageDocument>(
        &self,
        document: &mut D,
        index: usize,
    ) -> Result<RewriteOutcome> {
        let page_count = document.page_count();
        if index >= page_count {
            debug!(page_count, "Index past last page, skipping");
            return Ok(RewriteOutcome::Skipped);
        }

        let geometry = document.page_geometry(index)?;
        let rendered = document.render_page(index, self.options.render)?;
        let inverted = self.inverter.invert(&rendered);

        // The render shows the page as displayed. Turn it back so that, once
        // the viewer applies /Rotate again, it lines up with the original.
        let upright = inverted.rotated((4 - geometry.quarter_turns()) % 4)?;
        let encoded = self.codec.encode(&upright, self.options.encoding)?;

        let placement = if self.options.preserve_aspect_ratio {
            geometry.bbox.fit_centered(upright.aspect_ratio())
        } else {
            geometry.bbox
        };

        document.clear_page(index)?;
        document.embed_image(index, &encoded, placement)?;

        debug!(
            width = upright.width(),
            height = upright.height(),
            "Page rewritten"
        );
        Ok(RewriteOutcome::Rewritten {
            width: upright.width(),
            height: upright.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ChannelLayout, ImageCodec, Raster};
    use crate::testing::FakeDocument;
    use umkehr_core::{PageGeometry, Rect};

    #[test]
    fn rewrites_with_inverted_samples() {
        let mut doc = FakeDocument::with_pages(3);
        let rewriter = PageRewriter::new(&ImageCodec, RewriteOptions::default());

        let outcome = rewriter.rewrite_page(&mut doc, 1).unwrap();
        assert_eq!(outcome, RewriteOutcome::Rewritten { width: 4, height: 2 });
        assert_eq!(doc.calls, vec!["clear 1", "embed 1"]);

        let (image, _) = &doc.pages[1].images[0];
        let decoded = ImageCodec.decode(image).unwrap();
        assert!(decoded.samples().iter().all(|&s| s == 0), "white becomes black");
        assert!(doc.pages[0].images.is_empty());
        assert!(!doc.pages[2].cleared);
    }

    #[test]
    fn index_past_end_is_skipped() {
        let mut doc = FakeDocument::with_pages(2);
        let rewriter = PageRewriter::new(&ImageCodec, RewriteOptions::default());

        assert_eq!(
            rewriter.rewrite_page(&mut doc, 2).unwrap(),
            RewriteOutcome::Skipped
        );
        assert!(doc.calls.is_empty());
    }

    #[test]
    fn aspect_ratio_controls_placement() {
        let mut doc = FakeDocument::with_pages(1);
        // 4x2 raster onto a 612x792 page
        let fitted = PageRewriter::new(&ImageCodec, RewriteOptions::default());
        fitted.rewrite_page(&mut doc, 0).unwrap();
        let (_, placement) = doc.pages[0].images[0].clone();
        assert_eq!(placement.width(), 612.0);
        assert_eq!(placement.height(), 306.0);
        assert_eq!(placement.y0, 243.0);

        let stretched = PageRewriter::new(
            &ImageCodec,
            RewriteOptions {
                preserve_aspect_ratio: false,
                ..RewriteOptions::default()
            },
        );
        stretched.rewrite_page(&mut doc, 0).unwrap();
        let (_, placement) = doc.pages[0].images[0].clone();
        assert_eq!(placement, Rect::LETTER);
    }

    #[test]
    fn rotated_pages_are_counter_rotated() {
        let mut doc = FakeDocument::with_pages(1);
        doc.pages[0].geometry = PageGeometry::new(Rect::LETTER, 90);
        let rewriter = PageRewriter::new(&ImageCodec, RewriteOptions::default());

        let outcome = rewriter.rewrite_page(&mut doc, 0).unwrap();
        assert_eq!(outcome, RewriteOutcome::Rewritten { width: 2, height: 4 });
    }

    #[test]
    fn alpha_preservation_is_forwarded() {
        let mut doc = FakeDocument::with_pages(1);
        doc.raster = Raster::filled(2, 2, ChannelLayout::Rgba, &[0, 0, 0, 255]).unwrap();
        let rewriter = PageRewriter::new(
            &ImageCodec,
            RewriteOptions {
                preserve_alpha: true,
                ..RewriteOptions::default()
            },
        );

        rewriter.rewrite_page(&mut doc, 0).unwrap();
        let (image, _) = &doc.pages[0].images[0];
        assert_eq!(image.soft_mask, Some(vec![255; 4]));
        assert_eq!(image.data, vec![255; 12]);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation using pdfium-render.
//
// PDFium is loaded at runtime from, in order:
// 1. an explicitly configured directory
// 2. the current directory
// 3. system library paths

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};
use umkehr_core::RenderOptions;
use umkehr_core::error::{Result, UmkehrError};

use super::provider::PageRenderer;
use crate::image::Raster;

/// `PageRenderer` backed by the PDFium library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to PDFium, preferring `library_dir` when given.
    pub fn bind(library_dir: Option<&Path>) -> Result<Self> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|err| {
            UmkehrError::Document(format!("failed to bind pdfium library: {}", err))
        })?;

        info!("PDFium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRenderer for PdfiumRenderer {
    #[instrument(skip(self), fields(source = %source.display()))]
    fn render(&self, source: &Path, index: usize, options: RenderOptions) -> Result<Raster> {
        let document = self.pdfium.load_pdf_from_file(source, None).map_err(|err| {
            UmkehrError::Document(format!(
                "renderer could not load {}: {}",
                source.display(),
                err
            ))
        })?;

        let page_index = u16::try_from(index).map_err(|_| {
            UmkehrError::Document(format!("page index {} is beyond the renderer's range", index))
        })?;
        let page = document.pages().get(page_index).map_err(|err| {
            UmkehrError::Document(format!("failed to get page {} for rendering: {}", index, err))
        })?;

        let mut config = PdfRenderConfig::new().scale_page_by_factor(options.scale());
        if options.with_alpha {
            config = config.set_clear_color(PdfColor::new(255, 255, 255, 0));
        }

        let bitmap = page.render_with_config(&config).map_err(|err| {
            UmkehrError::Document(format!("failed to render page {}: {}", index, err))
        })?;

        let rendered: DynamicImage = bitmap.as_image();
        let rendered = if options.with_alpha {
            DynamicImage::ImageRgba8(rendered.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(rendered.to_rgb8())
        };

        debug!(
            index,
            width = rendered.width(),
            height = rendered.height(),
            dpi = options.dpi,
            "Page rendered"
        );
        Ok(Raster::from_dynamic(rendered))
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared between the document backends and the pipeline.

use serde::{Deserialize, Serialize};

/// Stages of a single pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Input bytes persisted (or input path referenced).
    InputMaterialized,
    /// Optional page removal applied and saved.
    PagesRemoved,
    /// Selected pages rasterised, inverted and re-embedded.
    PagesInverted,
    /// Temporary output moved to its final name.
    OutputFinalized,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::InputMaterialized => "materialising input",
            Self::PagesRemoved => "removing pages",
            Self::PagesInverted => "inverting pages",
            Self::OutputFinalized => "finalising output",
        };
        f.write_str(label)
    }
}

/// Axis-aligned rectangle in document units (PDF points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// US Letter, the conventional fallback for pages with no usable box.
    pub const LETTER: Rect = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    /// Build a rectangle from two corners in any order.
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Largest rectangle of the given aspect (width / height) that fits
    /// inside `self`, centred.
    pub fn fit_centered(&self, aspect: f32) -> Rect {
        let (w, h) = (self.width(), self.height());
        if !(aspect.is_finite() && aspect > 0.0) || w <= 0.0 || h <= 0.0 {
            return *self;
        }

        let (fit_w, fit_h) = if w / h > aspect {
            (h * aspect, h)
        } else {
            (w, w / aspect)
        };
        let x0 = self.x0 + (w - fit_w) / 2.0;
        let y0 = self.y0 + (h - fit_h) / 2.0;
        Rect {
            x0,
            y0,
            x1: x0 + fit_w,
            y1: y0 + fit_h,
        }
    }
}

/// Geometry of a page as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Visible page box (CropBox, falling back to MediaBox).
    pub bbox: Rect,
    /// Clockwise display rotation, normalised to 0, 90, 180 or 270.
    pub rotation: u16,
}

impl PageGeometry {
    pub fn new(bbox: Rect, rotation: i64) -> Self {
        // /Rotate must be a multiple of 90; anything else is treated as 0.
        let normalised = rotation.rem_euclid(360);
        let rotation = if normalised % 90 == 0 { normalised as u16 } else { 0 };
        Self { bbox, rotation }
    }

    /// Number of clockwise quarter turns applied when the page is displayed.
    pub fn quarter_turns(&self) -> u8 {
        (self.rotation / 90) as u8
    }
}

/// Parameters for rasterising one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Target resolution in dots per inch (72 = one pixel per point).
    pub dpi: f32,
    /// Keep an alpha channel in the rendered raster.
    pub with_alpha: bool,
}

impl RenderOptions {
    /// Pixels per document unit at this resolution.
    pub fn scale(&self) -> f32 {
        self.dpi / 72.0
    }
}

/// How an inverted raster is stored when embedded back into a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageEncoding {
    /// Raw samples, Flate-compressed when the document is saved.
    #[default]
    Lossless,
    /// Baseline JPEG (DCTDecode) at the given quality (1-100).
    Jpeg { quality: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_centered_letterboxes_wide_image() {
        let page = Rect::from_corners(0.0, 0.0, 100.0, 200.0);
        let placed = page.fit_centered(2.0);

        assert!((placed.width() - 100.0).abs() < 1e-3);
        assert!((placed.height() - 50.0).abs() < 1e-3);
        assert!((placed.y0 - 75.0).abs() < 1e-3, "y0 was {}", placed.y0);
    }

    #[test]
    fn fit_centered_with_matching_aspect_fills_box() {
        let page = Rect::from_corners(10.0, 20.0, 622.0, 812.0);
        let placed = page.fit_centered(page.width() / page.height());
        assert!((placed.x0 - 10.0).abs() < 1e-3);
        assert!((placed.y1 - 812.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_is_normalised() {
        let bbox = Rect::LETTER;
        assert_eq!(PageGeometry::new(bbox, -90).rotation, 270);
        assert_eq!(PageGeometry::new(bbox, 450).rotation, 90);
        assert_eq!(PageGeometry::new(bbox, 45).rotation, 0);
        assert_eq!(PageGeometry::new(bbox, 180).quarter_turns(), 2);
    }

    #[test]
    fn stage_display_reads_as_activity() {
        assert_eq!(PipelineStage::PagesRemoved.to_string(), "removing pages");
    }
}
